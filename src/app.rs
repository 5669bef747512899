use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::answer::AnswerService;
use crate::error::AnswerError;
use crate::message::Message;
use crate::session::{ChatSession, SessionView};
use crate::tui::AppEvent;
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Send,
    Transcript,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Input => FocusPane::Send,
            FocusPane::Send => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::Input,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusPane::Input => FocusPane::Transcript,
            FocusPane::Send => FocusPane::Input,
            FocusPane::Transcript => FocusPane::Send,
        }
    }
}

/// Terminal render target for a chat session.
///
/// Holds everything about *how* the transcript is shown: focus, scroll
/// position, and the panel areas from the last draw (for mouse hit-testing).
#[derive(Debug)]
pub struct ChatView {
    pub focus: FocusPane,
    pub send_enabled: bool,

    // Transcript scrolling
    pub scroll: u16,
    pub pinned_to_bottom: bool,
    pub chat_height: u16, // inner height of the transcript pane
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            focus: FocusPane::Input,
            send_enabled: true,
            scroll: 0,
            pinned_to_bottom: true,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            chat_area: None,
            input_area: None,
            send_area: None,
        }
    }
}

impl SessionView for ChatView {
    fn render(&mut self, message: &Message) {
        debug!(sender = ?message.sender(), "rendering message");
        // Actual offset is worked out on the next draw, once sizes are known
        self.pinned_to_bottom = true;
    }

    fn input_enabled_changed(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        if !enabled {
            self.animation_frame = 0;
        }
    }

    fn focus_input(&mut self) {
        self.focus = FocusPane::Input;
    }
}

pub struct App {
    pub should_quit: bool,
    pub endpoint: String,
    pub session: ChatSession<ChatView>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        service: Arc<dyn AnswerService>,
        endpoint: &str,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            endpoint: endpoint.to_string(),
            session: ChatSession::new(service, ChatView::default()),
            events,
        }
    }

    pub fn view(&self) -> &ChatView {
        self.session.view()
    }

    pub fn view_mut(&mut self) -> &mut ChatView {
        self.session.view_mut()
    }

    /// Submit whatever is in the input box.
    ///
    /// The request runs on its own task and reports back through the event
    /// channel as [`AppEvent::Answer`].
    pub fn submit(&mut self) -> bool {
        let Some(turn) = self.session.begin_turn() else {
            return false;
        };

        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = turn.run().await;
            // Receiver only goes away when the app is shutting down
            let _ = tx.send(AppEvent::Answer(outcome));
        });
        true
    }

    pub fn on_answer(&mut self, outcome: Result<String, AnswerError>) {
        self.session.settle(outcome);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_awaiting_answer() {
            let view = self.view_mut();
            view.animation_frame = (view.animation_frame + 1) % 3;
        }
    }

    pub fn focus_next(&mut self) {
        let view = self.view_mut();
        view.focus = view.focus.next();
    }

    pub fn focus_prev(&mut self) {
        let view = self.view_mut();
        view.focus = view.focus.prev();
    }

    fn max_scroll(&self) -> u16 {
        let view = self.view();
        let total = ui::transcript_height(
            self.session.transcript(),
            view.chat_width,
            self.session.is_awaiting_answer(),
            view.animation_frame,
        );
        // Default to 20 visible rows if not drawn yet
        let visible = if view.chat_height > 0 { view.chat_height } else { 20 };
        total.saturating_sub(visible)
    }

    /// Re-apply the bottom pin after the pane size or content changed
    pub fn sync_scroll(&mut self) {
        if self.view().pinned_to_bottom {
            let max = self.max_scroll();
            self.view_mut().scroll = max;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.view_mut().pinned_to_bottom = true;
        self.sync_scroll();
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let max = self.max_scroll();
        let view = self.view_mut();
        view.scroll = view.scroll.saturating_add(rows).min(max);
        view.pinned_to_bottom = view.scroll >= max;
    }

    pub fn scroll_up(&mut self, rows: u16) {
        let view = self.view_mut();
        view.scroll = view.scroll.saturating_sub(rows);
        view.pinned_to_bottom = false;
        // Nothing to scroll: stay pinned so new messages show up
        if self.max_scroll() == 0 {
            self.view_mut().pinned_to_bottom = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.view_mut().scroll = 0;
        self.view_mut().pinned_to_bottom = self.max_scroll() == 0;
    }

    pub fn half_page(&self) -> u16 {
        (self.view().chat_height / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FixedAnswer(&'static str);

    #[async_trait]
    impl AnswerService for FixedAnswer {
        async fn ask(&self, _question: &str) -> Result<String, AnswerError> {
            Ok(self.0.to_string())
        }
    }

    fn app(answer: &'static str) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(FixedAnswer(answer)), "http://test/ask", tx), rx)
    }

    #[test]
    fn focus_cycles_both_ways() {
        assert_eq!(FocusPane::Input.next(), FocusPane::Send);
        assert_eq!(FocusPane::Transcript.next(), FocusPane::Input);
        assert_eq!(FocusPane::Input.prev(), FocusPane::Transcript);
    }

    #[tokio::test]
    async fn submit_posts_answer_event() {
        let (mut app, mut rx) = app("4");
        app.session.input_mut().set_text("What is 2+2?");

        assert!(app.submit());
        assert!(!app.view().send_enabled);
        assert!(!app.submit(), "second submit while in flight must be refused");

        match rx.recv().await {
            Some(AppEvent::Answer(outcome)) => app.on_answer(outcome),
            other => panic!("expected answer event, got {:?}", other),
        }

        assert!(app.view().send_enabled);
        assert_eq!(app.view().focus, FocusPane::Input);
        assert_eq!(app.session.transcript().last().map(Message::text), Some("4"));
    }

    #[tokio::test]
    async fn scrolling_up_unpins_and_new_message_repins() {
        let (mut app, mut rx) = app("line\nline\nline\nline\nline\nline");
        {
            let view = app.view_mut();
            view.chat_height = 4;
            view.chat_width = 40;
        }
        app.session.input_mut().set_text("tell me a lot");
        app.submit();
        if let Some(AppEvent::Answer(outcome)) = rx.recv().await {
            app.on_answer(outcome);
        }
        app.sync_scroll();
        let bottom = app.view().scroll;
        assert!(bottom > 0);

        app.scroll_up(2);
        assert!(!app.view().pinned_to_bottom);
        assert_eq!(app.view().scroll, bottom - 2);

        app.scroll_down(100);
        assert!(app.view().pinned_to_bottom);
        assert_eq!(app.view().scroll, bottom);

        app.scroll_to_top();
        assert_eq!(app.view().scroll, 0);
        app.session.input_mut().set_text("again");
        app.submit();
        assert!(app.view().pinned_to_bottom);
    }
}
