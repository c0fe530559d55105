#![forbid(unsafe_code)]

//! Error type shared by the core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to parse site config JSON: {0}")]
    Config(#[from] serde_json::Error),
    #[error("site config validation failed: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SiteError>;
