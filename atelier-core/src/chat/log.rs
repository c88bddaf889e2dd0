//! Append-only conversation log

use serde::{Deserialize, Serialize};

use super::Message;

/// An ordered, append-only sequence of messages
///
/// Messages are never mutated or removed once appended. The log assigns
/// monotonically increasing sequence indices on append, so readers always
/// observe a prefix-consistent history. Each orchestration run owns its
/// own log instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from an ordered message sequence
    ///
    /// Sequence indices are reassigned by position to restore the
    /// monotonicity invariant regardless of what the input carried.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut log = Self::new();
        for message in messages {
            log.append(message);
        }
        log
    }

    /// Append a message, assigning the next sequence index
    ///
    /// Returns a reference to the appended message.
    pub fn append(&mut self, mut message: Message) -> &Message {
        message.seq = self.messages.len() as u64;
        self.messages.push(message);
        // Just pushed, so last() is always present
        self.messages.last().unwrap()
    }

    /// Get the full ordered message history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages in the log
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_append_assigns_sequence() {
        let mut log = ConversationLog::new();
        let first = log.append(Message::user("build a counter app")).seq;
        let second = log
            .append(Message::new(Role::BusinessAnalyst, "here is the plan"))
            .seq;

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_from_messages_reassigns_sequence() {
        let mut out_of_order = Message::user("request");
        out_of_order.seq = 42;

        let log = ConversationLog::from_messages(vec![
            out_of_order,
            Message::new(Role::BusinessAnalyst, "plan"),
        ]);

        assert_eq!(log.messages()[0].seq, 0);
        assert_eq!(log.messages()[1].seq, 1);
    }

    #[test]
    fn test_last() {
        let mut log = ConversationLog::new();
        assert!(log.last().is_none());

        log.append(Message::user("hello"));
        log.append(Message::new(Role::ProductOwner, "looks good"));
        assert_eq!(log.last().unwrap().role, Role::ProductOwner);
    }

    #[test]
    fn test_empty_log() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.messages().is_empty());
    }
}
