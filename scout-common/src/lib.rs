//! # Scout Common Library
//!
//! Shared code for the Scout crates:
//! - Error types
//! - TOML configuration loading and config path resolution
//! - Injectable clock for time-dependent components

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, ManualClock, SystemClock};
