//! Terminal chat widget for a question/answer HTTP service.
//!
//! The [`session::ChatSession`] drives each turn; [`app`], [`ui`] and
//! [`handler`] put it on screen with ratatui, and [`plain`] offers a simple
//! line-by-line alternative.

pub mod answer;
pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod message;
pub mod plain;
pub mod session;
pub mod tui;
pub mod ui;

pub use answer::{AnswerService, HttpAnswerClient};
pub use error::AnswerError;
pub use message::{Message, Sender, Transcript};
pub use session::{ChatSession, SessionView};
