mod support;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::time::{Duration, sleep};

use support::config;
use waitlist_api::client::{
    FormField, FormMessage, FormPhase, HttpTransport, JoinForm, MSG_EMAIL_IN_USE, MSG_PHONE_IN_USE,
    MSG_SERVER_ERROR, MessageKind,
};
use waitlist_api::create_app;
use waitlist_api::store::MemoryStore;

async fn spawn_server(unique_phone: bool) -> (String, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = create_app(&config(unique_phone), store.clone());

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());
    tokio::spawn(async move {
        server.await.unwrap();
    });

    // Give the server a moment to start
    sleep(Duration::from_millis(100)).await;
    (format!("http://{addr}"), store)
}

fn fill(form: &mut JoinForm, email: &str, phone: &str) {
    form.set_field(FormField::FirstName, "Ann");
    form.set_field(FormField::LastName, "Lee");
    form.set_field(FormField::Email, email);
    form.set_field(FormField::Phone, phone);
}

#[tokio::test]
async fn form_registers_then_sees_duplicate() {
    let (base, store) = spawn_server(false).await;
    let transport = HttpTransport::new(&base);

    let mut form = JoinForm::new();
    fill(&mut form, "Ann.Lee@gmail.com", "5551234567");
    assert_eq!(form.submit(&transport).await, FormPhase::Succeeded);
    assert_eq!(form.message().map(|m| m.kind), Some(MessageKind::Success));
    assert_eq!(store.all().await[0].email, "ann.lee@gmail.com");

    let mut again = JoinForm::new();
    fill(&mut again, "ann.lee@gmail.com", "5550000000");
    assert_eq!(again.submit(&transport).await, FormPhase::Failed);
    assert_eq!(again.message().map(|m| m.text), Some(MSG_EMAIL_IN_USE));
    assert_eq!(again.message().map(|m| m.kind), Some(MessageKind::Warning));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn form_reports_phone_conflict_when_enabled() {
    let (base, _) = spawn_server(true).await;
    let transport = HttpTransport::new(&base);

    let mut first = JoinForm::new();
    fill(&mut first, "ann@gmail.com", "5551234567");
    first.submit(&transport).await;

    let mut second = JoinForm::new();
    fill(&mut second, "bob@gmail.com", "5551234567");
    second.submit(&transport).await;
    assert_eq!(second.message().map(|m| m.text), Some(MSG_PHONE_IN_USE));
}

#[tokio::test]
async fn unreachable_server_is_generic_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = HttpTransport::new(&format!("http://{addr}"));
    let mut form = JoinForm::new();
    fill(&mut form, "ann@gmail.com", "5551234567");
    assert_eq!(form.submit(&transport).await, FormPhase::Failed);
    assert_eq!(
        form.message(),
        Some(FormMessage {
            kind: MessageKind::Error,
            text: MSG_SERVER_ERROR
        })
    );
    // inputs are usable again for a retry
    assert!(!form.is_input_disabled());
}
