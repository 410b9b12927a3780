use std::fmt;

/// Opaque identifier of one interview session, handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InterviewId(String);

impl InterviewId {
    /// Returns `None` for an empty or whitespace-only id.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an interview as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterviewStatus {
    Todo,
    ResumeUploaded,
    ChatbotInterviewDone,
    Other(String),
}

impl From<String> for InterviewStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TODO" => Self::Todo,
            "RESUME_UPLOADED" => Self::ResumeUploaded,
            "CHATBOT_INTERVIEW_DONE" => Self::ChatbotInterviewDone,
            _ => Self::Other(value),
        }
    }
}

impl From<InterviewStatus> for String {
    fn from(value: InterviewStatus) -> Self {
        match value {
            InterviewStatus::Todo => "TODO".to_string(),
            InterviewStatus::ResumeUploaded => "RESUME_UPLOADED".to_string(),
            InterviewStatus::ChatbotInterviewDone => "CHATBOT_INTERVIEW_DONE".to_string(),
            InterviewStatus::Other(other) => other,
        }
    }
}

/// Body of `GET /interview/{id}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterviewRecord {
    id: InterviewId,
    status: InterviewStatus,
}

impl InterviewRecord {
    pub fn new(id: InterviewId, status: InterviewStatus) -> Self {
        Self { id, status }
    }

    pub fn id(&self) -> &InterviewId {
        &self.id
    }

    pub fn status(&self) -> &InterviewStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize() {
        let record: InterviewRecord =
            serde_json::from_str(r#"{"id":"abc","status":"RESUME_UPLOADED"}"#).unwrap();
        assert_eq!(record.id().as_str(), "abc");
        assert_eq!(record.status(), &InterviewStatus::ResumeUploaded);

        let record: InterviewRecord =
            serde_json::from_str(r#"{"id":"abc","status":"ARCHIVED"}"#).unwrap();
        assert_eq!(record.status(), &InterviewStatus::Other("ARCHIVED".to_string()));

        let record: Option<InterviewRecord> = serde_json::from_str("null").unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn test_parse() {
        assert_eq!(InterviewId::parse("  abc ").unwrap().as_str(), "abc");
        assert!(InterviewId::parse("").is_none());
        assert!(InterviewId::parse("   ").is_none());
    }
}
