//! Chat session state machine
//!
//! A session owns the three pieces of mutable chat state (transcript,
//! pending flag and composer draft) and only changes them through the
//! transitions below. Each transition runs to completion before the
//! caller sees the state again, so no half-applied submission is ever
//! observable.
//!
//! A submission is split in two so the network call can run elsewhere:
//!
//! 1. [`ChatSession::begin_submit`] records the user turn, clears the
//!    draft, raises `pending` and hands back a [`PendingRequest`].
//! 2. [`dispatch`] performs the call.
//! 3. [`ChatSession::finish`] appends the reply (or fallback text) and
//!    lowers `pending`.
//!
//! [`ChatSession::submit`] chains all three for callers that just await.

use tracing::{debug, info, warn};

use crate::ai::{CompletionRequest, CompletionService};
use crate::error::DeliveryError;
use crate::state::ChatMessage;
use crate::strings;
use crate::transcript::Transcript;

/// Ticket for a request that has left the session but not come back.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Transcript generation the request was built from
    pub generation: u64,
    pub request: CompletionRequest,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    pending: bool,
    draft: String,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// True when a submission would be accepted right now.
    pub fn can_submit(&self) -> bool {
        !self.pending && !self.draft.trim().is_empty()
    }

    /// Record the user's turn and build the outbound request.
    ///
    /// Returns `None` without touching any state when the draft is blank
    /// or a request is already outstanding.
    pub fn begin_submit(&mut self) -> Option<PendingRequest> {
        if !self.can_submit() {
            return None;
        }

        let message = ChatMessage::user(self.draft.trim());
        let role = message.role.as_str();
        self.transcript.push(message);
        self.draft.clear();
        self.pending = true;

        let request = CompletionRequest::from_history(self.transcript.messages());
        info!(
            generation = self.transcript.generation(),
            role,
            messages = request.messages.len(),
            "submitting chat turn"
        );

        Some(PendingRequest {
            generation: self.transcript.generation(),
            request,
        })
    }

    /// Apply the outcome of a request started by [`begin_submit`].
    ///
    /// Replies from a conversation that has since been reset are dropped
    /// and `false` is returned; the current state is left alone.
    ///
    /// [`begin_submit`]: ChatSession::begin_submit
    pub fn finish(&mut self, generation: u64, outcome: Result<String, DeliveryError>) -> bool {
        if generation != self.transcript.generation() {
            debug!(
                stale = generation,
                current = self.transcript.generation(),
                "discarding reply for a reset conversation"
            );
            return false;
        }

        let message = ChatMessage::assistant(reply_content(outcome));
        debug!(
            generation,
            role = message.role.as_str(),
            chars = message.content.chars().count(),
            "reply appended"
        );
        self.transcript.push(message);
        self.pending = false;
        true
    }

    /// Start a new chat. Leaves the draft as it is.
    ///
    /// An outstanding request is abandoned: `pending` drops and its reply
    /// will be ignored by [`finish`](ChatSession::finish).
    pub fn reset(&mut self) {
        if self.pending {
            info!(
                generation = self.transcript.generation(),
                "new chat while a request is outstanding; its reply will be discarded"
            );
        }
        self.transcript.reset();
        self.pending = false;
    }

    /// Submit the draft and wait for the reply.
    ///
    /// Returns `false` when the submission was refused.
    pub async fn submit(&mut self, service: &dyn CompletionService) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let outcome = dispatch(service, &pending.request).await;
        self.finish(pending.generation, outcome);
        true
    }
}

/// Perform the one outbound call for a submission.
pub async fn dispatch(
    service: &dyn CompletionService,
    request: &CompletionRequest,
) -> Result<String, DeliveryError> {
    let start = std::time::Instant::now();
    let outcome = service.complete(request).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        Ok(text) => info!(elapsed_ms, chars = text.chars().count(), "completion received"),
        Err(e) => warn!(elapsed_ms, kind = e.kind(), error = %e, "completion failed"),
    }
    outcome
}

/// Text to append for a request outcome. Never empty.
pub fn reply_content(outcome: Result<String, DeliveryError>) -> String {
    match outcome {
        Ok(text) if text.is_empty() => strings::CONNECTION_ERROR.to_string(),
        Ok(text) => text,
        Err(_) => strings::SERVICE_UNREACHABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes and remembers what it was asked.
    #[derive(Default)]
    struct ScriptedService {
        replies: Mutex<VecDeque<Result<String, DeliveryError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedService {
        fn replying(outcomes: Vec<Result<String, DeliveryError>>) -> Self {
            Self {
                replies: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, DeliveryError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DeliveryError::Network("no scripted reply".into())))
        }
    }

    fn session_with_draft(draft: &str) -> ChatSession {
        let mut s = ChatSession::new();
        s.set_draft(draft);
        s
    }

    #[test]
    fn test_blank_draft_is_ignored() {
        for draft in ["", "   ", "\n\t "] {
            let mut s = session_with_draft(draft);
            assert!(!s.can_submit());
            assert!(s.begin_submit().is_none());
            assert!(s.transcript().is_empty());
            assert!(!s.is_pending());
            assert_eq!(s.draft(), draft);
        }
    }

    #[test]
    fn test_submit_while_pending_is_dropped() {
        let mut s = session_with_draft("first");
        let ticket = s.begin_submit().unwrap();

        s.set_draft("second");
        assert!(s.begin_submit().is_none());
        assert_eq!(s.transcript().len(), 1);
        assert!(s.is_pending());
        assert_eq!(s.draft(), "second");

        s.finish(ticket.generation, Ok("reply".into()));
        assert_eq!(s.transcript().len(), 2);
        assert!(!s.is_pending());
    }

    #[test]
    fn test_begin_submit_trims_and_clears_draft() {
        let mut s = session_with_draft("  hello  ");
        let ticket = s.begin_submit().unwrap();

        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.transcript().messages()[0], ChatMessage::user("hello"));
        assert_eq!(s.draft(), "");
        assert!(s.is_pending());
        assert_eq!(ticket.request.messages, vec![ChatMessage::user("hello")]);
    }

    #[test]
    fn test_request_includes_prior_turns_in_order() {
        let mut s = session_with_draft("one");
        let t = s.begin_submit().unwrap();
        s.finish(t.generation, Ok("two".into()));

        s.set_draft("three");
        let t = s.begin_submit().unwrap();

        let roles: Vec<ChatRole> = t.request.messages.iter().map(|m| m.role).collect();
        let contents: Vec<&str> = t.request.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_successful_reply_joins_text() {
        let service = ScriptedService::replying(vec![Ok("Hi\nthere".into())]);
        let mut s = session_with_draft("hello");

        assert!(s.submit(&service).await);
        assert_eq!(s.transcript().len(), 2);
        assert_eq!(s.transcript().last(), Some(&ChatMessage::assistant("Hi\nthere")));
        assert!(!s.is_pending());
        assert_eq!(s.draft(), "");
        assert_eq!(service.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_becomes_connection_error() {
        let service = ScriptedService::replying(vec![Ok(String::new())]);
        let mut s = session_with_draft("hello");

        s.submit(&service).await;
        assert_eq!(
            s.transcript().last().map(|m| m.content.as_str()),
            Some(strings::CONNECTION_ERROR)
        );
        assert!(!s.is_pending());
    }

    #[tokio::test]
    async fn test_every_failure_becomes_unreachable_message() {
        let failures = vec![
            DeliveryError::Network("refused".into()),
            DeliveryError::Status { status: 500, body: String::new() },
            DeliveryError::Malformed("bad json".into()),
        ];

        for failure in failures {
            let service = ScriptedService::replying(vec![Err(failure)]);
            let mut s = session_with_draft("hello");

            assert!(s.submit(&service).await);
            let last = s.transcript().last().unwrap();
            assert_eq!(last.role, ChatRole::Assistant);
            assert_eq!(last.content, strings::SERVICE_UNREACHABLE);
            assert!(!s.is_pending());
            assert_eq!(s.draft(), "");
        }
    }

    #[tokio::test]
    async fn test_each_cycle_adds_two_messages() {
        let service = ScriptedService::replying(vec![
            Ok("a".into()),
            Err(DeliveryError::Network("down".into())),
            Ok("c".into()),
        ]);
        let mut s = ChatSession::new();

        for (i, text) in ["x", "y", "z"].iter().enumerate() {
            s.set_draft(*text);
            assert!(s.submit(&service).await);
            assert_eq!(s.transcript().len(), (i + 1) * 2);
        }
        assert_eq!(service.requests()[2].messages.len(), 5);
    }

    #[tokio::test]
    async fn test_refused_submit_does_not_call_service() {
        let service = ScriptedService::default();
        let mut s = session_with_draft("   ");

        assert!(!s.submit(&service).await);
        assert!(service.requests().is_empty());
    }

    #[test]
    fn test_reset_empties_transcript_and_keeps_draft() {
        let mut s = session_with_draft("q");
        let t = s.begin_submit().unwrap();
        s.finish(t.generation, Ok("a".into()));
        s.set_draft("unsent");

        s.reset();
        assert!(s.transcript().is_empty());
        assert_eq!(s.draft(), "unsent");
        assert!(!s.is_pending());
    }

    #[test]
    fn test_reply_after_reset_is_discarded() {
        let mut s = session_with_draft("q");
        let stale = s.begin_submit().unwrap();

        s.reset();
        assert!(!s.is_pending());

        // A new request goes out before the old reply lands
        s.set_draft("fresh");
        let fresh = s.begin_submit().unwrap();

        assert!(!s.finish(stale.generation, Ok("old answer".into())));
        assert_eq!(s.transcript().len(), 1);
        assert!(s.is_pending());

        assert!(s.finish(fresh.generation, Ok("new answer".into())));
        assert_eq!(s.transcript().last(), Some(&ChatMessage::assistant("new answer")));
        assert!(!s.is_pending());
    }

    #[test]
    fn test_reply_content_never_empty() {
        assert_eq!(reply_content(Ok("x".into())), "x");
        assert_eq!(reply_content(Ok(String::new())), strings::CONNECTION_ERROR);
        assert_eq!(
            reply_content(Err(DeliveryError::Malformed("x".into()))),
            strings::SERVICE_UNREACHABLE
        );
    }
}
