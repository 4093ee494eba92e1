//! Core types and configuration for the Eco-Grid ecosystem automaton.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
