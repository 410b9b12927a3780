//! Which interview statuses may enter which view.

use std::fmt;

use interview_session_types::{InterviewId, InterviewRecord, InterviewStatus};
use interview_session_utils::{StatusClient, StatusError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ResumeUpload,
    Chat,
}

impl View {
    /// Explicit allow-list; anything else is turned away.
    pub fn allows(&self, status: &InterviewStatus) -> bool {
        matches!(
            (self, status),
            (View::ResumeUpload, InterviewStatus::Todo)
                | (View::Chat, InterviewStatus::ResumeUploaded)
        )
    }

    pub fn path(&self, id: &InterviewId) -> String {
        match self {
            View::ResumeUpload => format!("/interview/{id}"),
            View::Chat => format!("/chatbot/{id}"),
        }
    }

    /// Where a rejected user is sent.
    pub fn fallback_path() -> &'static str {
        "/"
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::ResumeUpload => f.write_str("resume upload"),
            View::Chat => f.write_str("chat"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("interview {0} not found")]
    NotFound(InterviewId),
    #[error("{view} is not available for an interview in status {status:?}")]
    EntryDenied { view: View, status: InterviewStatus },
    #[error(transparent)]
    Lookup(#[from] StatusError),
}

/// Decide entry from an already fetched record.
pub fn check_entry(
    view: View,
    id: &InterviewId,
    record: Option<&InterviewRecord>,
) -> Result<(), GateError> {
    let Some(record) = record else {
        return Err(GateError::NotFound(id.clone()));
    };
    if view.allows(record.status()) {
        Ok(())
    } else {
        Err(GateError::EntryDenied {
            view,
            status: record.status().clone(),
        })
    }
}

/// Fetch the interview status and decide entry.
pub async fn authorize(
    client: &StatusClient,
    view: View,
    id: &InterviewId,
) -> Result<InterviewRecord, GateError> {
    let record = client.fetch(id).await?;
    check_entry(view, id, record.as_ref())?;
    tracing::info!("entering {} for interview {}", view, id);
    record.ok_or_else(|| GateError::NotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: InterviewStatus) -> InterviewRecord {
        InterviewRecord::new(InterviewId::parse("abc").unwrap(), status)
    }

    #[test]
    fn test_allow_list() {
        assert!(View::ResumeUpload.allows(&InterviewStatus::Todo));
        assert!(!View::ResumeUpload.allows(&InterviewStatus::ResumeUploaded));
        assert!(View::Chat.allows(&InterviewStatus::ResumeUploaded));
        assert!(!View::Chat.allows(&InterviewStatus::Todo));
        assert!(!View::Chat.allows(&InterviewStatus::ChatbotInterviewDone));
        assert!(!View::Chat.allows(&InterviewStatus::Other("ARCHIVED".to_string())));
    }

    #[test]
    fn test_check_entry() {
        let id = InterviewId::parse("abc").unwrap();
        let uploaded = record(InterviewStatus::ResumeUploaded);
        assert!(check_entry(View::Chat, &id, Some(&uploaded)).is_ok());
        assert!(matches!(
            check_entry(View::Chat, &id, None),
            Err(GateError::NotFound(_))
        ));
        assert!(matches!(
            check_entry(View::Chat, &id, Some(&record(InterviewStatus::ChatbotInterviewDone))),
            Err(GateError::EntryDenied { view: View::Chat, .. })
        ));
    }

    #[test]
    fn test_paths() {
        let id = InterviewId::parse("abc").unwrap();
        assert_eq!(View::ResumeUpload.path(&id), "/interview/abc");
        assert_eq!(View::Chat.path(&id), "/chatbot/abc");
    }

    #[tokio::test]
    async fn test_authorize_surfaces_lookup_failure() {
        let client = StatusClient::new("http://127.0.0.1:9");
        let id = InterviewId::parse("abc").unwrap();
        let result = authorize(&client, View::Chat, &id).await;
        assert!(matches!(result, Err(GateError::Lookup(_))));
    }
}
