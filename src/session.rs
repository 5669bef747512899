//! Chat session controller
//!
//! A [`ChatSession`] owns the transcript and the input state for one chat
//! and notifies a [`SessionView`] whenever something visible changes. A turn
//! is split in two halves so a UI loop can keep handling events while the
//! request is outstanding:
//!
//! 1. [`ChatSession::begin_turn`] records the user message, clears and
//!    disables the input, and hands back a [`Turn`].
//! 2. [`Turn::run`] talks to the answer service. It owns everything it
//!    needs, so it can be moved into a spawned task.
//! 3. [`ChatSession::settle`] records the answer (or the error), then
//!    re-enables and refocuses the input.
//!
//! Callers that are happy to wait use [`ChatSession::submit`] instead.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::answer::AnswerService;
use crate::error::AnswerError;
use crate::message::{Message, Transcript};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Render target notified by a [`ChatSession`]
pub trait SessionView {
    /// Show a newly appended message and scroll it into view
    fn render(&mut self, message: &Message);

    /// The input field and send control became enabled or disabled
    fn input_enabled_changed(&mut self, _enabled: bool) {}

    /// Give keyboard focus back to the input field
    fn focus_input(&mut self) {}
}

/// Text being composed plus whether it can currently be edited.
///
/// Edits are ignored while the input is disabled.
#[derive(Debug, Clone)]
pub struct InputState {
    text: String,
    cursor: usize, // in chars, not bytes
    enabled: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            enabled: true,
        }
    }
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_text(&mut self, text: &str) {
        if !self.enabled {
            return;
        }
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.enabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if !self.enabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if !self.enabled {
            return;
        }
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        if self.enabled {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn move_right(&mut self) {
        if self.enabled {
            self.cursor = (self.cursor + 1).min(self.text.chars().count());
        }
    }

    pub fn move_home(&mut self) {
        if self.enabled {
            self.cursor = 0;
        }
    }

    pub fn move_end(&mut self) {
        if self.enabled {
            self.cursor = self.text.chars().count();
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// The request half of a chat turn
#[must_use = "a turn does nothing until it is run and settled"]
pub struct Turn {
    question: String,
    service: Arc<dyn AnswerService>,
}

impl Turn {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub async fn run(self) -> Result<String, AnswerError> {
        self.service.ask(&self.question).await
    }
}

pub struct ChatSession<V: SessionView> {
    transcript: Transcript,
    input: InputState,
    service: Arc<dyn AnswerService>,
    view: V,
}

impl<V: SessionView> ChatSession<V> {
    pub fn new(service: Arc<dyn AnswerService>, view: V) -> Self {
        Self {
            transcript: Transcript::new(),
            input: InputState::default(),
            service,
            view,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// True between accepting a submission and settling its answer
    pub fn is_awaiting_answer(&self) -> bool {
        !self.input.enabled
    }

    /// Start a turn from whatever is in the input field
    pub fn begin_turn(&mut self) -> Option<Turn> {
        let raw = self.input.text.clone();
        self.begin_turn_with(&raw)
    }

    /// Start a turn for `raw`.
    ///
    /// Returns `None` without touching any state when the trimmed text is
    /// empty or a turn is already in flight.
    pub fn begin_turn_with(&mut self, raw: &str) -> Option<Turn> {
        if self.is_awaiting_answer() {
            debug!("submission ignored while awaiting an answer");
            return None;
        }

        let question = raw.trim();
        if question.is_empty() {
            debug!("empty submission ignored");
            return None;
        }

        info!(chars = question.chars().count(), "turn started");
        self.append(Message::user(question));
        self.input.clear();
        self.set_input_enabled(false);

        Some(Turn {
            question: question.to_string(),
            service: Arc::clone(&self.service),
        })
    }

    /// Finish the in-flight turn with its outcome.
    ///
    /// Failures become bot messages; the input is re-enabled either way.
    pub fn settle(&mut self, outcome: Result<String, AnswerError>) {
        if !self.is_awaiting_answer() {
            warn!("answer arrived with no turn in flight, dropping it");
            return;
        }

        let message = match outcome {
            Ok(answer) => {
                info!(chars = answer.chars().count(), "turn answered");
                Message::bot(answer)
            }
            Err(e) => {
                warn!(error = %e, "turn failed");
                Message::bot(e.user_message())
            }
        };

        self.append(message);
        self.set_input_enabled(true);
        self.view.focus_input();
    }

    /// Submit the current input and wait for the turn to settle.
    ///
    /// Returns whether a turn actually happened.
    pub async fn submit_input(&mut self) -> bool {
        let raw = self.input.text.clone();
        self.submit(&raw).await
    }

    /// Submit `question` and wait for the turn to settle
    pub async fn submit(&mut self, question: &str) -> bool {
        let Some(turn) = self.begin_turn_with(question) else {
            return false;
        };
        let outcome = turn.run().await;
        self.settle(outcome);
        true
    }

    fn append(&mut self, message: Message) {
        let stored = self.transcript.push(message);
        self.view.render(stored);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input.enabled = enabled;
        self.view.input_enabled_changed(enabled);
    }
}
