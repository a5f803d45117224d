//! Conversation state for the "Ask Orbital" panel.
//!
//! Requests run on a worker thread and the reply comes back over a channel
//! that the UI polls once per frame.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::ChatError;

pub const WELCOME_MESSAGE: &str = "Orbital link established. I am ready to provide planetary analysis.";
pub const EMPTY_REPLY_FALLBACK: &str = "Signal interference. Please repeat.";
pub const FAULT_FALLBACK: &str = "Communication link unstable. Unable to retrieve data from the archives.";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "USER INPUT",
            ChatRole::Model => "AI ANALYSIS",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Something that can answer a user message given the prior conversation.
pub trait ChatBackend: Send + Sync {
    fn send(&self, history: &[ChatMessage], message: &str) -> Result<String, ChatError>;
}

/// Runs one exchange and folds every failure into a displayable reply.
pub fn exchange(backend: &dyn ChatBackend, history: &[ChatMessage], message: &str) -> String {
    match backend.send(history, message) {
        Ok(text) if !text.is_empty() => text,
        Ok(_) | Err(ChatError::EmptyResponse) => {
            warn!(error = %ChatError::EmptyResponse, "chat reply had no text");
            EMPTY_REPLY_FALLBACK.to_string()
        }
        Err(e) => {
            error!(error = %e, "chat request failed");
            FAULT_FALLBACK.to_string()
        }
    }
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pub input: String,
    pub open: bool,
    pending: Option<Receiver<String>>,
    backend: Arc<dyn ChatBackend>,
    next_id: u64,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            input: String::new(),
            open: false,
            pending: None,
            backend,
            next_id: 0,
        };
        session.push(ChatRole::Model, WELCOME_MESSAGE.to_string());
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn push(&mut self, role: ChatRole, text: String) {
        self.messages.push(ChatMessage { id: self.next_id, role, text, timestamp: Utc::now() });
        self.next_id += 1;
    }

    /// Sends the current input. Returns false when the input is blank or a
    /// reply is still outstanding.
    pub fn submit(&mut self) -> bool {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.is_pending() {
            return false;
        }
        self.input.clear();

        let history = self.messages.clone();
        self.push(ChatRole::User, text.clone());

        let (tx, rx) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let spawned = std::thread::Builder::new()
            .name("chat-request".into())
            .spawn(move || {
                let reply = exchange(backend.as_ref(), &history, &text);
                let _ = tx.send(reply);
            });
        match spawned {
            Ok(_) => {
                debug!("chat request dispatched");
                self.pending = Some(rx);
            }
            Err(e) => {
                error!(error = %ChatError::Worker(e.to_string()), "could not start chat worker");
                self.push(ChatRole::Model, FAULT_FALLBACK.to_string());
            }
        }
        true
    }

    /// Collects a finished reply, if any. Returns true when a message was
    /// appended.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let reply = match rx.try_recv() {
            Ok(reply) => reply,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                warn!("chat worker exited without a reply");
                FAULT_FALLBACK.to_string()
            }
        };
        self.pending = None;
        self.push(ChatRole::Model, reply);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct Echo;

    impl ChatBackend for Echo {
        fn send(&self, _history: &[ChatMessage], message: &str) -> Result<String, ChatError> {
            Ok(format!("echo: {message}"))
        }
    }

    struct Failing;

    impl ChatBackend for Failing {
        fn send(&self, _history: &[ChatMessage], _message: &str) -> Result<String, ChatError> {
            Err(ChatError::Network("unreachable".into()))
        }
    }

    struct Silent;

    impl ChatBackend for Silent {
        fn send(&self, _history: &[ChatMessage], _message: &str) -> Result<String, ChatError> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<usize>>,
    }

    impl ChatBackend for Recording {
        fn send(&self, history: &[ChatMessage], _message: &str) -> Result<String, ChatError> {
            self.seen.lock().unwrap().push(history.len());
            Ok("ok".into())
        }
    }

    fn wait_for_reply(session: &mut ChatSession) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !session.poll() {
            assert!(Instant::now() < deadline, "reply never arrived");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_session_starts_with_welcome() {
        let session = ChatSession::new(Arc::new(Echo));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, ChatRole::Model);
        assert_eq!(session.messages()[0].text, WELCOME_MESSAGE);
        assert!(!session.open);
    }

    #[test]
    fn test_round_trip_through_worker() {
        let mut session = ChatSession::new(Arc::new(Echo));
        session.input = "  hello  ".into();
        assert!(session.submit());
        assert!(session.input.is_empty());
        assert!(session.is_pending());
        wait_for_reply(&mut session);

        let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![WELCOME_MESSAGE, "hello", "echo: hello"]);
        assert!(!session.is_pending());
        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut session = ChatSession::new(Arc::new(Echo));
        session.input = "   ".into();
        assert!(!session.submit());
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_second_submit_while_pending_is_rejected() {
        let mut session = ChatSession::new(Arc::new(Echo));
        session.input = "first".into();
        assert!(session.submit());
        session.input = "second".into();
        assert!(!session.submit());
        assert_eq!(session.input, "second");
        wait_for_reply(&mut session);
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_failure_becomes_fault_reply() {
        let mut session = ChatSession::new(Arc::new(Failing));
        session.input = "status?".into();
        session.submit();
        wait_for_reply(&mut session);
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].text, WELCOME_MESSAGE);
        assert_eq!(messages[1].text, "status?");
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[2].text, FAULT_FALLBACK);
        assert_eq!(messages[2].role, ChatRole::Model);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_empty_reply_becomes_interference() {
        assert_eq!(exchange(&Silent, &[], "hi"), EMPTY_REPLY_FALLBACK);
        struct Empty;
        impl ChatBackend for Empty {
            fn send(&self, _h: &[ChatMessage], _m: &str) -> Result<String, ChatError> {
                Err(ChatError::EmptyResponse)
            }
        }
        assert_eq!(exchange(&Empty, &[], "hi"), EMPTY_REPLY_FALLBACK);
    }

    #[test]
    fn test_history_excludes_current_message() {
        let backend = Arc::new(Recording::default());
        let mut session = ChatSession::new(backend.clone());
        session.input = "one".into();
        session.submit();
        wait_for_reply(&mut session);
        session.input = "two".into();
        session.submit();
        wait_for_reply(&mut session);
        assert_eq!(*backend.seen.lock().unwrap(), vec![1, 3]);
        assert_eq!(session.messages()[1].text, "one");
    }
}
