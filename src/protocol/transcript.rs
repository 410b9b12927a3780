use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat bubble as the user sees it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only message history. Only the protocol machine writes to it.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub(crate) fn append(&mut self, role: Role, content: &str) -> &Message {
        self.messages.push(Message::new(role, content));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent interviewer question.
    pub fn last_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut transcript = Transcript::default();
        transcript.append(Role::Assistant, "q1");
        transcript.append(Role::User, "a1");
        transcript.append(Role::Assistant, "q2");

        let contents: Vec<&str> = transcript.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2"]);
        assert_eq!(transcript.last_question(), Some("q2"));
        assert_ne!(transcript.messages()[0].id(), transcript.messages()[1].id());
    }

    #[test]
    fn test_last_question_skips_user_messages() {
        let mut transcript = Transcript::default();
        assert_eq!(transcript.last_question(), None);
        transcript.append(Role::Assistant, "q1");
        transcript.append(Role::User, "a1");
        assert_eq!(transcript.last_question(), Some("q1"));
    }
}
