/// Everything that can go wrong inside an interview session.
///
/// None of these are panics: malformed input, lost connections and server
/// rejections all surface as values the caller can show to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no interview id was supplied")]
    MissingInterviewId,
    #[error("not connected to the interview server")]
    NotConnected,
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("could not reconnect after {0} attempts")]
    ReconnectExhausted(u32),
    #[error("server rejected the session: {0}")]
    ProtocolError(String),
    #[error("transport error: {0}")]
    TransportError(String),
    #[error("the interview has already ended")]
    InterviewEnded,
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("still waiting for the interviewer to reply")]
    AwaitingReply,
    #[error("speech recognition is not available")]
    SpeechUnavailable,
    #[error("speech recognition failed: {0}")]
    Speech(String),
    #[error("the session has shut down")]
    SessionClosed,
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}
