use crate::InterviewId;

/// `start_interview` event, sent once right after the socket opens.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StartInterviewEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interview_id: Option<InterviewId>,
}

impl StartInterviewEvent {
    pub fn new(interview_id: &InterviewId) -> Self {
        Self {
            interview_id: Some(interview_id.clone()),
        }
    }

    pub fn interview_id(&self) -> Option<&InterviewId> {
        self.interview_id.as_ref()
    }
}

/// `end_interview` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EndInterviewEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interview_id: Option<InterviewId>,

    /// Human readable note the server attaches when it ends the interview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl EndInterviewEvent {
    pub fn new(interview_id: &InterviewId) -> Self {
        Self {
            interview_id: Some(interview_id.clone()),
            message: None,
        }
    }

    pub fn interview_id(&self) -> Option<&InterviewId> {
        self.interview_id.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// `connection` event
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl ConnectionEvent {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
