//! # songlib Common Library
//!
//! Shared code for the songlib service crates:
//! - Configuration loading (environment file + process environment)
//! - Database pool bootstrap and schema management
//! - Group/Song data models
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{Config, DbConfig};
pub use error::{Error, Result};
