//! Narrow capability interfaces over the platform speech engines.
//!
//! The session never talks to a speech engine directly; it is handed boxed
//! implementations of these traits so it can run (and be tested) without one.

use crate::error::SessionError;
#[cfg(test)]
use mockall::automock;

/// Text-to-speech.
#[cfg_attr(test, automock)]
pub trait SpeechOutput: Send {
    /// Start speaking `text`.
    fn speak(&mut self, text: &str);

    /// Stop the utterance in progress, if any.
    fn cancel(&mut self);

    fn is_speaking(&self) -> bool;
}

/// What a speech-to-text engine reports back while capturing.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechInputEvent {
    Transcript(String),
    Error(String),
}

pub type TranscriptSink = Box<dyn Fn(SpeechInputEvent) + Send + Sync>;

/// Speech-to-text. Capture is a plain on/off toggle.
#[cfg_attr(test, automock)]
pub trait SpeechInput: Send {
    fn start(&mut self) -> Result<(), SessionError>;

    fn stop(&mut self);

    /// Stop immediately and discard anything not yet delivered.
    fn abort(&mut self);

    /// Register where transcript fragments and errors are delivered.
    fn on_transcript(&mut self, sink: TranscriptSink);
}

/// Speech output that says nothing. Used for text-only sessions.
#[derive(Debug, Default)]
pub struct Silent;

impl SpeechOutput for Silent {
    fn speak(&mut self, text: &str) {
        tracing::trace!("speech muted, dropping {} chars", text.len());
    }

    fn cancel(&mut self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
