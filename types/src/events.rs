mod chat;
mod error;
mod feedback;
mod lifecycle;

pub use chat::{AnswerEvent, MessageEvent};
pub use error::ErrorEvent;
pub use feedback::FeedbackEvent;
pub use lifecycle::{ConnectionEvent, EndInterviewEvent, StartInterviewEvent};

/// A single JSON text frame exchanged over the session socket.
///
/// The same envelope is used in both directions; which tags a peer actually
/// sends is a matter of convention, not of type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum ProtocolMessage {
    #[serde(rename = "message")]
    Message(MessageEvent),
    #[serde(rename = "end_interview")]
    EndInterview(EndInterviewEvent),
    #[serde(rename = "feedback")]
    Feedback(FeedbackEvent),
    #[serde(rename = "connection")]
    Connection(ConnectionEvent),
    #[serde(rename = "error")]
    Error(ErrorEvent),
    #[serde(rename = "answer")]
    Answer(AnswerEvent),
    #[serde(rename = "start_interview")]
    StartInterview(StartInterviewEvent),
    /// Any tag this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ProtocolMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The wire tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::EndInterview(_) => "end_interview",
            Self::Feedback(_) => "feedback",
            Self::Connection(_) => "connection",
            Self::Error(_) => "error",
            Self::Answer(_) => "answer",
            Self::StartInterview(_) => "start_interview",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InterviewId;

    #[test]
    fn test_serialize_outbound() {
        let id = InterviewId::parse("42").unwrap();

        let json = ProtocolMessage::StartInterview(StartInterviewEvent::new(&id))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"type":"start_interview","interview_id":"42"}"#);

        let json = ProtocolMessage::Message(
            MessageEvent::new("I am a backend engineer")
                .with_question("Tell me about yourself")
                .with_interview_id(&id),
        )
        .to_json()
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"message","content":"I am a backend engineer","question":"Tell me about yourself","interview_id":"42"}"#
        );

        let json = ProtocolMessage::Message(MessageEvent::new("hi").with_interview_id(&id))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"type":"message","content":"hi","interview_id":"42"}"#);

        let json = ProtocolMessage::Feedback(FeedbackEvent::request(&id))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"type":"feedback","interview_id":"42"}"#);

        let json = ProtocolMessage::EndInterview(EndInterviewEvent::new(&id))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"type":"end_interview","interview_id":"42"}"#);
    }

    #[test]
    fn test_deserialize_inbound() {
        let msg = ProtocolMessage::parse(r#"{"type":"message","content":"Tell me about yourself"}"#)
            .unwrap();
        match msg {
            ProtocolMessage::Message(event) => {
                assert_eq!(event.content(), Some("Tell me about yourself"))
            }
            other => panic!("unexpected {other:?}"),
        }

        let msg =
            ProtocolMessage::parse(r#"{"type":"end_interview","message":"Interview is completed"}"#)
                .unwrap();
        assert!(matches!(msg, ProtocolMessage::EndInterview(_)));

        let msg = ProtocolMessage::parse(r#"{"type":"feedback","content":"Good job"}"#).unwrap();
        match msg {
            ProtocolMessage::Feedback(event) => assert_eq!(event.text(), Some("Good job")),
            other => panic!("unexpected {other:?}"),
        }

        let msg = ProtocolMessage::parse(r#"{"type":"error","message":"Resume not uploaded yet"}"#)
            .unwrap();
        match msg {
            ProtocolMessage::Error(event) => {
                assert_eq!(event.message(), Some("Resume not uploaded yet"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag_is_not_malformed() {
        let msg = ProtocolMessage::parse(r#"{"type":"typing","content":"..."}"#).unwrap();
        assert_eq!(msg, ProtocolMessage::Unknown);
        assert_eq!(msg.tag(), "unknown");
    }

    #[test]
    fn test_malformed() {
        assert!(ProtocolMessage::parse("not json").is_err());
        assert!(ProtocolMessage::parse(r#"{"content":"no tag"}"#).is_err());
        assert!(ProtocolMessage::parse(r#"{"type":"message","content":12}"#).is_err());
    }

    #[test]
    fn test_deserialize_answer_and_connection() {
        let msg = ProtocolMessage::parse(
            r#"{"type":"answer","content":"Ownership rules","question":"What is borrowing?"}"#,
        )
        .unwrap();
        match msg {
            ProtocolMessage::Answer(event) => {
                assert_eq!(event.content(), Some("Ownership rules"));
                assert_eq!(event.question(), Some("What is borrowing?"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let msg = ProtocolMessage::parse(r#"{"type":"connection","content":"connected"}"#).unwrap();
        match msg {
            ProtocolMessage::Connection(event) => assert_eq!(event.content(), Some("connected")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_server_side_frames() {
        let json = ProtocolMessage::Error(ErrorEvent::new("Invalid interview"))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"Invalid interview"}"#);

        let id = InterviewId::parse("42").unwrap();
        let feedback = FeedbackEvent::request(&id).with_content("Clear answers");
        let json = ProtocolMessage::Feedback(feedback).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"feedback","content":"Clear answers","interview_id":"42"}"#
        );
        match ProtocolMessage::parse(&json).unwrap() {
            ProtocolMessage::Feedback(event) => {
                assert_eq!(event.text(), Some("Clear answers"));
                assert_eq!(event.interview_id(), Some(&id));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
