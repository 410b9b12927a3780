use crate::InterviewId;

/// `message` event
///
/// Inbound it carries the next interviewer question; outbound it carries the
/// candidate's answer together with the question it answers.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    /// The question being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    question: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    interview_id: Option<InterviewId>,
}

impl MessageEvent {
    pub fn new(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    pub fn with_question(mut self, question: &str) -> Self {
        self.question = Some(question.to_string());
        self
    }

    pub fn with_interview_id(mut self, interview_id: &InterviewId) -> Self {
        self.interview_id = Some(interview_id.clone());
        self
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    pub fn interview_id(&self) -> Option<&InterviewId> {
        self.interview_id.as_ref()
    }
}

/// `answer` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnswerEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    question: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    interview_id: Option<InterviewId>,
}

impl AnswerEvent {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }
}
