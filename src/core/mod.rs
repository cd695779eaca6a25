//! # Core Module
//!
//! Configuration and error types shared by every feature of the bot.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add error module with the platform `ApiError`
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;

pub use config::Config;
pub use error::ApiError;
