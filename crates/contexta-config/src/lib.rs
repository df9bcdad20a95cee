//! # Contexta Config
//!
//! Configuration management for the contexta query pipeline.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, Issue, ValidationResult};
