//! Core types and configuration for the island ecosystem simulator.

pub mod types;
pub mod config;
pub mod error;
pub mod fitness;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
