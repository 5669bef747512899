//! Line-oriented front end (`--plain`)
//!
//! Reads one question per line and prints each answer as it settles. Useful
//! over dumb terminals and for piping questions in.

use std::io::Write;

use anyhow::Result;
use crossterm::style::Stylize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::message::{Message, Sender};
use crate::session::{ChatSession, SessionView};

/// Prints bot messages; user text is already on screen from the terminal echo
pub struct PlainView<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> PlainView<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn label(&self, text: &str, sender: Sender) -> String {
        if !self.color {
            return text.to_string();
        }
        match sender {
            Sender::User => text.cyan().bold().to_string(),
            Sender::Bot => text.yellow().bold().to_string(),
        }
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        let label = self.label("You:", Sender::User);
        write!(self.out, "{} ", label)?;
        self.out.flush()
    }
}

impl<W: Write> SessionView for PlainView<W> {
    fn render(&mut self, message: &Message) {
        if message.sender() != Sender::Bot {
            return;
        }
        let label = self.label("Bot:", Sender::Bot);
        // Nothing useful to do if stdout is gone
        let _ = writeln!(self.out, "{} {}", label, message.text());
        let _ = self.out.flush();
    }
}

/// Run the REPL until `exit` or end of input
pub async fn run<R, W>(session: &mut ChatSession<PlainView<W>>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(session.view_mut().out, "Chat is ready. Type 'exit' to quit.")?;

    let mut lines = input.lines();
    loop {
        session.view_mut().prompt()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(session.view_mut().out)?;
            break;
        };
        if line.trim().eq_ignore_ascii_case("exit") {
            break;
        }
        session.submit(&line).await;
    }

    info!(messages = session.transcript().len(), "plain session finished");
    Ok(())
}
