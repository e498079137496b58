//! Microphone stream acquisition
//!
//! Requests a live audio input from the platform with a fixed-delay,
//! bounded retry policy.

mod acquirer;
mod config;

pub use acquirer::StreamAcquirer;
pub use config::StreamConfig;
