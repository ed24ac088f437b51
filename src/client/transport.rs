use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Body the join form posts to the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// What came back from the endpoint: the status plus the `error` string, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub error: Option<String>,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<TransportReply, TransportError>;
}

/// Posts registrations to `{base_url}/api/register` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/register", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RegistrationTransport for HttpTransport {
    async fn register(&self, request: &RegisterRequest) -> Result<TransportReply, TransportError> {
        let res = self.client.post(&self.endpoint).json(request).send().await?;
        let status = res.status().as_u16();

        // Error bodies are best effort; a proxy may answer with HTML.
        let body: Option<serde_json::Value> = res.json().await.ok();
        let error = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string);

        Ok(TransportReply { status, error })
    }
}
