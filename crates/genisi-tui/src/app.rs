use std::sync::Arc;

use genisi_core::{dispatch, strings, ChatSession, CompletionService, DeliveryError};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::info;

use crate::tui::AppEvent;
use crate::ui::chat_lines;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    /// Suggestion cards on the welcome panel
    Suggestions,
}

/// Suggestion cards are laid out two per row.
pub const SUGGESTION_COLUMNS: usize = 2;

pub struct App {
    pub should_quit: bool,
    pub focus: FocusState,

    // Chat state
    pub session: ChatSession,
    pub composer_cursor: usize, // cursor position in the draft, in chars (not columns)
    pub reply_task: Option<JoinHandle<()>>,

    // Transcript viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of chat area for scroll calculations
    pub chat_width: u16,  // Inner width of chat area for wrap calculations
    pub follow_tail: bool, // Keep the newest entry in view on every draw

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator

    pub show_sidebar: bool,

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub suggestion_areas: Vec<Rect>,
    pub new_chat_area: Option<Rect>,
    pub send_area: Option<Rect>,

    service: Arc<dyn CompletionService>,
    events: UnboundedSender<AppEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    pub target: Focus,
    pub suggestion: usize,
}

impl App {
    pub fn new(service: Arc<dyn CompletionService>, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            focus: FocusState {
                target: Focus::Composer,
                suggestion: 0,
            },

            session: ChatSession::new(),
            composer_cursor: 0,
            reply_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,

            animation_frame: 0,

            show_sidebar: false,

            chat_area: None,
            suggestion_areas: Vec::new(),
            new_chat_area: None,
            send_area: None,

            service,
            events,
        }
    }

    /// Send the draft. Ignored while blank or while a reply is awaited.
    pub fn submit(&mut self) {
        let Some(pending) = self.session.begin_submit() else {
            return;
        };
        self.composer_cursor = 0;
        self.focus.target = Focus::Composer;

        // Scroll to bottom so the typing indicator is visible
        self.scroll_to_bottom();

        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        self.reply_task = Some(tokio::spawn(async move {
            let outcome = dispatch(service.as_ref(), &pending.request).await;
            // A closed channel means the UI is gone; nothing left to update
            let _ = events.send(AppEvent::Reply {
                generation: pending.generation,
                outcome,
            });
        }));
    }

    /// Fold a finished call back into the session.
    pub fn apply_reply(&mut self, generation: u64, outcome: Result<String, DeliveryError>) {
        if self.session.finish(generation, outcome) {
            self.reply_task = None;
            self.animation_frame = 0;
            self.scroll_to_bottom();
        }
    }

    /// Start over with an empty transcript, abandoning any call in flight.
    pub fn new_chat(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.abort();
        }
        self.session.reset();
        self.chat_scroll = 0;
        self.follow_tail = true;
        self.animation_frame = 0;
        info!("started a new chat");
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    /// Copy a suggestion into the composer, leaving the cursor at its end.
    pub fn choose_suggestion(&mut self, index: usize) {
        if genisi_core::apply_suggestion(&mut self.session, index) {
            self.composer_cursor = self.session.draft().chars().count();
            self.focus = FocusState {
                target: Focus::Composer,
                suggestion: index,
            };
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus.target = match self.focus.target {
            Focus::Composer if self.session.transcript().is_empty() => Focus::Suggestions,
            _ => Focus::Composer,
        };
    }

    /// Move the highlighted suggestion card by a grid offset.
    pub fn move_suggestion(&mut self, rows: isize, cols: isize) {
        let count = strings::SUGGESTIONS.len() as isize;
        let columns = SUGGESTION_COLUMNS as isize;
        let current = self.focus.suggestion as isize;

        let row = current / columns + rows;
        let col = current % columns + cols;
        if (0..columns).contains(&col) {
            let next = row * columns + col;
            if (0..count).contains(&next) {
                self.focus.suggestion = next as usize;
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_scroll(&self) -> u16 {
        let rows = chat_lines(
            self.session.transcript().messages(),
            self.session.is_pending(),
            self.animation_frame,
            self.wrap_width(),
        )
        .len();
        u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .saturating_sub(self.visible_height())
    }

    fn wrap_width(&self) -> u16 {
        if self.chat_width > 0 {
            self.chat_width
        } else {
            50
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Scroll the transcript so the newest entry is in view, and keep it
    /// there on later draws until the user scrolls up.
    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max);
        self.follow_tail = self.chat_scroll == max;
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
        self.follow_tail = self.chat_scroll == self.max_scroll();
    }

    pub fn page_rows(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use genisi_core::{ChatMessage, CompletionRequest};
    use tokio::sync::mpsc;

    /// Always answers with the same text
    pub(crate) struct EchoService(pub &'static str);

    #[async_trait]
    impl CompletionService for EchoService {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, DeliveryError> {
            Ok(self.0.to_string())
        }
    }

    pub(crate) fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(EchoService("pong")), tx), rx)
    }

    #[tokio::test]
    async fn test_submit_round_trip_through_event_channel() {
        let (mut app, mut rx) = test_app();
        app.session.set_draft("  ping ");
        app.composer_cursor = 7;

        app.submit();
        assert!(app.session.is_pending());
        assert_eq!(app.session.transcript().len(), 1);
        assert_eq!(app.session.draft(), "");
        assert_eq!(app.composer_cursor, 0);

        match rx.recv().await {
            Some(AppEvent::Reply { generation, outcome }) => app.apply_reply(generation, outcome),
            other => panic!("expected reply, got {other:?}"),
        }
        assert!(!app.session.is_pending());
        assert!(app.reply_task.is_none());
        assert_eq!(
            app.session.transcript().last(),
            Some(&ChatMessage::assistant("pong"))
        );
    }

    #[tokio::test]
    async fn test_new_chat_discards_late_reply() {
        let (mut app, mut rx) = test_app();
        app.session.set_draft("ping");
        app.submit();
        let stale = app.session.transcript().generation();

        app.new_chat();
        assert!(app.session.transcript().is_empty());
        assert!(!app.session.is_pending());
        assert!(app.reply_task.is_none());

        app.apply_reply(stale, Ok("late".to_string()));
        assert!(app.session.transcript().is_empty());

        // The aborted task may or may not have reported; nothing else is queued
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, AppEvent::Reply { .. }));
        }
    }

    #[test]
    fn test_move_suggestion_stays_on_grid() {
        let (mut app, _rx) = test_app();
        app.move_suggestion(0, 1);
        assert_eq!(app.focus.suggestion, 1);
        app.move_suggestion(0, 1); // off the right edge
        assert_eq!(app.focus.suggestion, 1);
        app.move_suggestion(1, 0);
        assert_eq!(app.focus.suggestion, 3);
        app.move_suggestion(1, 0); // below the last row
        assert_eq!(app.focus.suggestion, 3);
        app.move_suggestion(-1, -1);
        assert_eq!(app.focus.suggestion, 0);
    }

    #[test]
    fn test_choose_suggestion_fills_composer() {
        let (mut app, _rx) = test_app();
        app.focus.target = Focus::Suggestions;
        app.choose_suggestion(2);

        assert_eq!(app.session.draft(), strings::SUGGESTIONS[2]);
        assert_eq!(app.composer_cursor, strings::SUGGESTIONS[2].chars().count());
        assert_eq!(app.focus.target, Focus::Composer);
        assert!(app.session.transcript().is_empty());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 20;
        app.scroll_down(10);
        assert_eq!(app.chat_scroll, 0);

        app.session.set_draft("one");
        let t = app.session.begin_submit().unwrap();
        app.session.finish(t.generation, Ok("two\nthree\nfour".into()));
        // 3 rows for the user turn, 5 for the reply
        app.scroll_to_bottom();
        assert_eq!(app.chat_scroll, 4);
        app.scroll_down(10);
        assert_eq!(app.chat_scroll, 4);
        app.scroll_up(10);
        assert_eq!(app.chat_scroll, 0);
        assert!(!app.follow_tail);

        app.scroll_down(10);
        assert!(app.follow_tail);
    }

    #[test]
    fn test_bottom_offset_counts_word_wrapped_rows() {
        let (mut app, _rx) = test_app();
        app.chat_height = 5;
        app.chat_width = 12;

        app.session.set_draft("q");
        let t = app.session.begin_submit().unwrap();
        // Each word is 9 columns, so only one fits per 12-column row
        app.apply_reply(t.generation, Ok("wordwordA wordwordB wordwordC wordwordD".into()));

        // user turn: 3 rows; reply: label + 4 wrapped rows + blank
        assert_eq!(app.chat_scroll, 9 - 5);
    }
}
