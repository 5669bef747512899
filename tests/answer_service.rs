//! HTTP client behaviour against a local stand-in service

mod common;

use askchat::answer::{AnswerService, HttpAnswerClient};
use askchat::error::{AnswerError, SERVER_FALLBACK_MESSAGE};
use common::{refused_url, MockServer};

#[tokio::test]
async fn posts_question_as_json() {
    let server = MockServer::fixed(200, r#"{"answer": "4"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    let answer = client.ask("What is 2+2?").await.unwrap();
    assert_eq!(answer, "4");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.body, serde_json::json!({ "question": "What is 2+2?" }));
}

#[tokio::test]
async fn answer_text_is_returned_verbatim() {
    let server = MockServer::fixed(200, r#"{"answer": "<b>4</b>\n  indented"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    assert_eq!(client.ask("q").await.unwrap(), "<b>4</b>\n  indented");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let server = MockServer::fixed(500, r#"{"error": "overloaded"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert!(matches!(err, AnswerError::Service(ref m) if m == "overloaded"));
}

#[tokio::test]
async fn client_error_status_is_a_failure_too() {
    let server = MockServer::fixed(400, r#"{"error": "No question provided"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert_eq!(err.to_string(), "No question provided");
}

#[tokio::test]
async fn empty_error_body_uses_fallback() {
    let server = MockServer::fixed(500, "").await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert_eq!(err.to_string(), SERVER_FALLBACK_MESSAGE);
}

#[tokio::test]
async fn malformed_error_body_uses_fallback() {
    let server = MockServer::fixed(500, "<html>oops</html>").await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert_eq!(err.to_string(), SERVER_FALLBACK_MESSAGE);
}

#[tokio::test]
async fn error_body_without_error_field_uses_fallback() {
    let server = MockServer::fixed(503, r#"{"detail": "busy"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert_eq!(err.to_string(), SERVER_FALLBACK_MESSAGE);
}

#[tokio::test]
async fn success_without_answer_is_malformed() {
    let server = MockServer::fixed(200, r#"{"reply": "4"}"#).await;
    let client = HttpAnswerClient::new(&server.url());

    let err = client.ask("q").await.unwrap_err();
    assert!(matches!(err, AnswerError::Malformed(_)));
    assert!(err.to_string().contains("answer"));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let client = HttpAnswerClient::new(&refused_url().await);

    let err = client.ask("q").await.unwrap_err();
    assert!(matches!(err, AnswerError::Transport(_)));
    assert!(err.to_string().contains("error sending request"));
}
