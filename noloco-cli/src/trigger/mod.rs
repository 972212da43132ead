//! Change detection by polling

pub mod poll;

pub use poll::{PollCheckpoint, PollMode, PollOutcome, PollRequest, TriggerEvent, poll};
