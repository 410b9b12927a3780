//! Interview records on the backend: status lookup and allocation.

use interview_session_types::{InterviewId, InterviewRecord};

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("status request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status lookup returned HTTP {0}")]
    UnexpectedStatus(u16),
    #[error("failed to decode status body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct StatusClient {
    base_url: String,
    http: reqwest::Client,
}

impl StatusClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn status_url(&self, id: &InterviewId) -> String {
        format!("{}/interview/{}", self.base_url, id)
    }

    /// Fetches the interview record. The backend answers `null` for unknown
    /// ids, which maps to `Ok(None)`.
    pub async fn fetch(&self, id: &InterviewId) -> Result<Option<InterviewRecord>, StatusError> {
        let url = self.status_url(id);
        tracing::debug!("fetching interview status: {}", url);

        let response = self.http.get(&url).send().await?;
        let code = response.status();
        if code == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !code.is_success() {
            return Err(StatusError::UnexpectedStatus(code.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str::<Option<InterviewRecord>>(&body)?)
    }

    /// Allocates a new interview (`POST /interview`).
    pub async fn create(&self) -> Result<Option<InterviewRecord>, StatusError> {
        let url = format!("{}/interview", self.base_url);
        tracing::debug!("creating interview: {}", url);

        let response = self.http.post(&url).send().await?;
        let code = response.status();
        if !code.is_success() {
            return Err(StatusError::UnexpectedStatus(code.as_u16()));
        }

        let body = response.text().await?;
        let record = serde_json::from_str::<Option<InterviewRecord>>(&body)?;
        if let Some(record) = record.as_ref() {
            tracing::info!("created interview {}", record.id());
        }
        Ok(record)
    }
}
