//! Interprets inbound frames and turns user intent into outbound frames.

use interview_session_types::events::{EndInterviewEvent, FeedbackEvent, MessageEvent};
use interview_session_types::{InterviewId, ProtocolMessage};

use crate::client::consts::{
    CONNECTION_ERROR_STATUS, FEEDBACK_PREAMBLE, NOT_CONNECTED_STATUS, SPEECH_UNSUPPORTED_STATUS,
};
use crate::error::SessionError;
use crate::progress::InterviewProgress;
use crate::speech::{SpeechInput, SpeechInputEvent, SpeechOutput};

mod transcript;

pub use transcript::{Message, Role, Transcript};

/// Where outbound protocol messages go. Implemented by the connection manager.
pub trait Outbox {
    fn is_connected(&self) -> bool;

    fn send(&mut self, message: &ProtocolMessage) -> Result<(), SessionError>;
}

/// The one-line status banner shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Clear,
    Error(String),
}

/// What handling one inbound frame did.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Appended(Message),
    /// The server ended the interview; feedback was requested.
    EndRequested,
    Feedback(String),
    /// The server rejected the session. Terminal.
    Rejected(Option<String>),
    Ignored(&'static str),
    Malformed(String),
}

pub struct SessionProtocol {
    interview_id: Option<InterviewId>,
    transcript: Transcript,
    progress: InterviewProgress,
    awaiting_reply: bool,
    status: Status,
    speaker: Box<dyn SpeechOutput>,
    listener: Option<Box<dyn SpeechInput>>,
    listening: bool,
    draft: String,
}

impl SessionProtocol {
    pub fn new(
        interview_id: Option<InterviewId>,
        speaker: Box<dyn SpeechOutput>,
        listener: Option<Box<dyn SpeechInput>>,
    ) -> Self {
        Self {
            interview_id,
            transcript: Transcript::default(),
            progress: InterviewProgress::new(),
            awaiting_reply: false,
            status: Status::Clear,
            speaker,
            listener,
            listening: false,
            draft: String::new(),
        }
    }

    pub fn interview_id(&self) -> Option<&InterviewId> {
        self.interview_id.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn progress(&self) -> &InterviewProgress {
        &self.progress
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: &str) {
        self.draft = draft.to_string();
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Called when a socket opens: a stale error banner no longer applies.
    pub(crate) fn on_connected(&mut self) {
        self.status = Status::Clear;
    }

    pub(crate) fn on_transport_error(&mut self) {
        self.status = Status::Error(CONNECTION_ERROR_STATUS.to_string());
    }

    pub(crate) fn attach_speech_sink(&mut self, sink: crate::speech::TranscriptSink) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_transcript(sink);
        }
    }

    fn say(&mut self, text: &str) {
        // At most one utterance at a time.
        if self.speaker.is_speaking() {
            self.speaker.cancel();
        }
        self.speaker.speak(text);
    }

    fn not_connected(&mut self) -> SessionError {
        self.awaiting_reply = false;
        self.status = Status::Error(NOT_CONNECTED_STATUS.to_string());
        SessionError::NotConnected
    }

    /// Handle one inbound text frame. Never panics on bad input.
    pub fn handle_frame(&mut self, text: &str, outbox: &mut dyn Outbox) -> Reaction {
        let message = match ProtocolMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("failed to deserialize frame: {}, text=> {:?}", e, text);
                self.awaiting_reply = false;
                return Reaction::Malformed(e.to_string());
            }
        };
        tracing::debug!("received {}", message.tag());

        match message {
            ProtocolMessage::Message(event) => {
                self.awaiting_reply = false;
                match event.content() {
                    Some(content) => {
                        let appended = self.transcript.append(Role::Assistant, content).clone();
                        self.say(content);
                        Reaction::Appended(appended)
                    }
                    None => {
                        tracing::warn!("message without content, ignoring");
                        Reaction::Ignored("message")
                    }
                }
            }
            ProtocolMessage::EndInterview(event) => {
                tracing::info!(
                    "server ended the interview: {}",
                    event.message().unwrap_or("no reason given")
                );
                if let Err(e) = self.request_feedback_only(outbox) {
                    tracing::error!("failed to request feedback: {}", e);
                }
                Reaction::EndRequested
            }
            ProtocolMessage::Feedback(event) => {
                self.awaiting_reply = false;
                match event.text() {
                    Some(feedback) => {
                        let feedback = feedback.to_string();
                        self.progress.record_feedback(&feedback);
                        self.say(&format!("{FEEDBACK_PREAMBLE}{feedback}"));
                        Reaction::Feedback(feedback)
                    }
                    None => {
                        tracing::warn!("feedback without content, ignoring");
                        Reaction::Ignored("feedback")
                    }
                }
            }
            ProtocolMessage::Error(event) => {
                let reason = event.message().map(str::to_string);
                tracing::error!("server rejected the session: {:?}", reason);
                Reaction::Rejected(reason)
            }
            other => {
                tracing::warn!("ignoring unexpected message: {}", other.tag());
                self.awaiting_reply = false;
                Reaction::Ignored(other.tag())
            }
        }
    }

    fn attach_id(&self, event: MessageEvent) -> MessageEvent {
        match self.interview_id.as_ref() {
            Some(id) => event.with_interview_id(id),
            None => event,
        }
    }

    fn require_id(&self) -> Result<InterviewId, SessionError> {
        self.interview_id
            .clone()
            .ok_or(SessionError::MissingInterviewId)
    }

    /// Send the candidate's answer and append it to the transcript.
    pub fn submit_answer(
        &mut self,
        text: &str,
        outbox: &mut dyn Outbox,
    ) -> Result<Message, SessionError> {
        if !self.progress.accepts_answers() {
            return Err(SessionError::InterviewEnded);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        if self.awaiting_reply {
            return Err(SessionError::AwaitingReply);
        }
        if !outbox.is_connected() {
            return Err(self.not_connected());
        }

        let mut event = MessageEvent::new(text);
        if let Some(question) = self.transcript.last_question() {
            event = event.with_question(question);
        }
        let event = self.attach_id(event);

        if let Err(e) = outbox.send(&ProtocolMessage::Message(event)) {
            tracing::error!("failed to send answer: {}", e);
            self.not_connected();
            return Err(e);
        }
        let appended = self.transcript.append(Role::User, text).clone();
        self.awaiting_reply = true;
        Ok(appended)
    }

    /// Submit whatever speech capture or typing has collected so far.
    pub fn submit_draft(&mut self, outbox: &mut dyn Outbox) -> Result<Message, SessionError> {
        let draft = self.draft.clone();
        let message = self.submit_answer(&draft, outbox)?;
        self.draft.clear();
        Ok(message)
    }

    /// User-initiated end: `end_interview` then `feedback`, and the interview
    /// is ended locally without waiting for the server. Refused while the
    /// interviewer still owes a reply.
    pub fn request_end_interview(&mut self, outbox: &mut dyn Outbox) -> Result<(), SessionError> {
        if !self.progress.accepts_answers() {
            return Err(SessionError::InterviewEnded);
        }
        if self.awaiting_reply {
            return Err(SessionError::AwaitingReply);
        }
        if !outbox.is_connected() {
            return Err(self.not_connected());
        }
        let id = self.require_id()?;

        self.awaiting_reply = true;
        if let Err(e) = outbox.send(&ProtocolMessage::EndInterview(EndInterviewEvent::new(&id))) {
            tracing::error!("failed to send end_interview: {}", e);
            self.not_connected();
            return Err(e);
        }
        self.progress.end();
        if let Err(e) = outbox.send(&ProtocolMessage::Feedback(FeedbackEvent::request(&id))) {
            tracing::error!("failed to request feedback: {}", e);
            self.not_connected();
            return Err(e);
        }
        Ok(())
    }

    /// Request feedback without announcing the end first (the server already
    /// did). Safe to repeat.
    pub fn request_feedback_only(&mut self, outbox: &mut dyn Outbox) -> Result<(), SessionError> {
        if !outbox.is_connected() {
            return Err(self.not_connected());
        }
        let id = self.require_id()?;

        self.awaiting_reply = true;
        if let Err(e) = outbox.send(&ProtocolMessage::Feedback(FeedbackEvent::request(&id))) {
            tracing::error!("failed to request feedback: {}", e);
            self.not_connected();
            return Err(e);
        }
        self.progress.end();
        Ok(())
    }

    /// Flip voice capture on or off. Returns the new listening state.
    pub fn toggle_listening(&mut self) -> Result<bool, SessionError> {
        let Some(listener) = self.listener.as_mut() else {
            self.status = Status::Error(SPEECH_UNSUPPORTED_STATUS.to_string());
            return Err(SessionError::SpeechUnavailable);
        };

        if self.listening {
            listener.stop();
            self.listening = false;
        } else {
            if let Err(e) = listener.start() {
                tracing::error!("failed to start speech recognition: {}", e);
                self.status = Status::Error(e.to_string());
                return Err(e);
            }
            self.listening = true;
        }
        Ok(self.listening)
    }

    pub fn on_speech_event(&mut self, event: SpeechInputEvent) {
        match event {
            SpeechInputEvent::Transcript(fragment) => {
                let fragment = fragment.trim();
                if fragment.is_empty() {
                    return;
                }
                if !self.draft.is_empty() {
                    self.draft.push(' ');
                }
                self.draft.push_str(fragment);
            }
            SpeechInputEvent::Error(e) => {
                tracing::error!("speech recognition error: {}", e);
                self.listening = false;
            }
        }
    }

    /// Release speech resources. Part of session teardown.
    pub fn teardown(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.abort();
        }
        self.listening = false;
        if self.speaker.is_speaking() {
            self.speaker.cancel();
        }
    }
}
