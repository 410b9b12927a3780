pub mod status;

pub use status::{StatusClient, StatusError};
