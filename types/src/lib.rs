pub mod events;
mod interview;

pub use events::ProtocolMessage;
pub use interview::{InterviewId, InterviewRecord, InterviewStatus};
