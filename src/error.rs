//! Error type shared by every module of the crate.
//!
//! Library code never terminates the process. Failures travel up as
//! [`Error`] until `main` reports them and exits.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No cached token at {0}")]
    TokenNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cached token is malformed: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Unable to serialize oauth token: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Spotify API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Spotify API returned {status}: {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("State mismatch: {received} != {expected}")]
    StateMismatch { expected: String, received: String },

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Callback listener unavailable on port {port}: {reason}")]
    Listener { port: u16, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication ended without delivering a client")]
    Handoff,
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::Config(err.to_string())
    }
}
