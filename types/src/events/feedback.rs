use crate::InterviewId;

/// `feedback` event
///
/// Outbound it is a request for feedback; inbound it carries the feedback text
/// in `content` (older servers used `feedback`).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    feedback: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    interview_id: Option<InterviewId>,
}

impl FeedbackEvent {
    pub fn request(interview_id: &InterviewId) -> Self {
        Self {
            interview_id: Some(interview_id.clone()),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    /// The feedback text, preferring `content` over `feedback`.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().or(self.feedback.as_deref())
    }

    pub fn interview_id(&self) -> Option<&InterviewId> {
        self.interview_id.as_ref()
    }
}
