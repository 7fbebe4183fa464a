//! HTTP behavior of the Twilio sender against a mock Messages API

use drivewatch_core::config::TwilioConfig;
use drivewatch_core::error::SendError;
use drivewatch_core::traits::MessageSender;
use drivewatch_notify_twilio::TwilioSender;
use pretty_assertions::assert_eq;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MESSAGES_PATH: &str = "/2010-04-01/Accounts/AC123/Messages.json";

fn config() -> TwilioConfig {
    TwilioConfig {
        account_sid: "AC123".to_string(),
        auth_token: "token456".to_string(),
        whatsapp_number: "+14155238886".to_string(),
        target_number: "+15551234567".to_string(),
    }
}

fn sender_for(server: &MockServer) -> TwilioSender {
    TwilioSender::from_config(&config(), false).with_base_url(server.uri())
}

#[tokio::test]
async fn posts_whatsapp_message_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .and(basic_auth("AC123", "token456"))
        .and(body_string_contains("From=whatsapp%3A%2B14155238886"))
        .and(body_string_contains("To=whatsapp%3A%2B15551234567"))
        .and(body_string_contains("Body=x"))
        .respond_with(
            ResponseTemplate::new(201).set_body_string(r#"{"sid":"SM42","status":"queued"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let receipt = sender_for(&server).send("x").await.unwrap();

    assert_eq!(receipt.message_id.as_deref(), Some("SM42"));
}

#[tokio::test]
async fn error_status_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"code":20003,"message":"Authenticate"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = sender_for(&server).send("x").await.unwrap_err();

    assert_eq!(
        err,
        SendError::Rejected {
            backend: "twilio",
            status: 401,
            body: r#"{"code":20003,"message":"Authenticate"}"#.to_string(),
        }
    );
}

#[tokio::test]
async fn unparseable_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = sender_for(&server).send("x").await.unwrap_err();

    assert!(matches!(err, SendError::InvalidResponse { backend: "twilio", .. }));
}

#[tokio::test]
async fn incomplete_config_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let incomplete = TwilioConfig {
        whatsapp_number: String::new(),
        ..config()
    };
    let sender = TwilioSender::from_config(&incomplete, false).with_base_url(server.uri());

    let err = sender.send("x").await.unwrap_err();
    assert!(err.is_config());
}
