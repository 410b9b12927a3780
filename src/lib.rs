mod client;
pub mod connection;
mod error;
pub mod gate;
pub mod progress;
pub mod protocol;
pub mod speech;

pub use interview_session_types as types;

pub use client::{
    Config, ConfigBuilder, ConfigError, InterviewSession, SessionBuilder, SessionCommand,
    SessionEvent, SessionHandle, SessionUpdate, UpdateRx,
};
pub use error::SessionError;
