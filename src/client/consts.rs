pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws/chat";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_BASE_MS: u64 = 2000;
pub const DEFAULT_CAPACITY: usize = 1024;

pub const WS_URL_VAR: &str = "INTERVIEW_WS_URL";
pub const API_URL_VAR: &str = "INTERVIEW_API_URL";
pub const MAX_ATTEMPTS_VAR: &str = "INTERVIEW_MAX_RECONNECT_ATTEMPTS";
pub const RECONNECT_BASE_VAR: &str = "INTERVIEW_RECONNECT_BASE_MS";

pub const FEEDBACK_PREAMBLE: &str =
    "Thank you for completing the interview. Here's your feedback: ";

pub const MISSING_ID_STATUS: &str =
    "No interview session found. Please upload your resume first.";
pub const NOT_CONNECTED_STATUS: &str =
    "Not connected to the server. Please wait for reconnection or refresh the page.";
pub const CONNECTION_ERROR_STATUS: &str = "There was an error with the WebSocket connection.";
pub const RECONNECT_EXHAUSTED_STATUS: &str =
    "Could not reconnect to the server. Please refresh the page.";
pub const SPEECH_UNSUPPORTED_STATUS: &str = "Speech recognition is not supported on this device.";
