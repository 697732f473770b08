//! # WoW Marketplace Common Library
//!
//! Shared code for the marketplace operator tools:
//! - Error type
//! - TOML configuration loading and layered resolution
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
