use serde::{Deserialize, Serialize};

/// Body of every non-2xx API response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub store: String,
}

impl HealthBody {
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            store: "ok".to_string(),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
            store: "error".to_string(),
        }
    }
}
