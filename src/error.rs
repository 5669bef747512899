//! Error types for talking to the answer service
//!
//! Every variant ends up as text in a bot message; nothing here is ever
//! propagated past a chat turn.

use thiserror::Error;

/// Shown when the service fails without saying why
pub const SERVER_FALLBACK_MESSAGE: &str = "Something went wrong on the server.";

/// Prefix of every bot message produced by a failed turn
pub const APOLOGY_PREFIX: &str = "Sorry, I couldn't get a response. Error: ";

#[derive(Error, Debug)]
pub enum AnswerError {
    /// Non-success status. Holds the service's `error` field or the fallback.
    #[error("{0}")]
    Service(String),

    /// Success status, but the body was not an answer payload
    #[error("Malformed answer payload: {0}")]
    Malformed(String),

    /// No response was received, or its body could not be read
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl AnswerError {
    /// Build a service error from an optional message, falling back to the
    /// generic server message when none was given.
    pub fn service(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.trim().is_empty() => AnswerError::Service(message),
            _ => AnswerError::Service(SERVER_FALLBACK_MESSAGE.to_string()),
        }
    }

    /// Text shown to the user in place of an answer
    pub fn user_message(&self) -> String {
        format!("{}{}", APOLOGY_PREFIX, self)
    }
}
