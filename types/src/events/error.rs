/// `error` event: the server rejected the session.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl ErrorEvent {
    pub fn new(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            content: None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().or(self.content.as_deref())
    }
}
