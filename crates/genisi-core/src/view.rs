//! What the chat area should show for a given session state

use crate::session::ChatSession;
use crate::state::ChatMessage;
use crate::strings;

#[derive(Debug, PartialEq, Eq)]
pub enum ChatView<'a> {
    /// Nothing said yet: greet and offer starting points
    Welcome { suggestions: &'a [&'static str] },
    /// The transcript, with a typing indicator while a reply is awaited
    Conversation {
        messages: &'a [ChatMessage],
        typing: bool,
    },
}

pub fn chat_view(session: &ChatSession) -> ChatView<'_> {
    let transcript = session.transcript();
    if transcript.is_empty() {
        ChatView::Welcome {
            suggestions: &strings::SUGGESTIONS,
        }
    } else {
        ChatView::Conversation {
            messages: transcript.messages(),
            typing: session.is_pending(),
        }
    }
}

/// Copy a suggestion into the composer. Out-of-range indices are ignored.
pub fn apply_suggestion(session: &mut ChatSession, index: usize) -> bool {
    match strings::SUGGESTIONS.get(index) {
        Some(text) => {
            session.set_draft(*text);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session_shows_welcome() {
        let s = ChatSession::new();
        assert_eq!(
            chat_view(&s),
            ChatView::Welcome {
                suggestions: &strings::SUGGESTIONS
            }
        );
    }

    #[test]
    fn test_pending_session_shows_typing() {
        let mut s = ChatSession::new();
        s.set_draft("hello");
        s.begin_submit().unwrap();

        match chat_view(&s) {
            ChatView::Conversation { messages, typing } => {
                assert_eq!(messages.len(), 1);
                assert!(typing);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_suggestion_fills_draft_without_submitting() {
        let mut s = ChatSession::new();
        assert!(apply_suggestion(&mut s, 1));
        assert_eq!(s.draft(), strings::SUGGESTIONS[1]);
        assert!(s.transcript().is_empty());
        assert!(!s.is_pending());

        assert!(!apply_suggestion(&mut s, strings::SUGGESTIONS.len()));
        assert_eq!(s.draft(), strings::SUGGESTIONS[1]);
    }
}
