//! Spotify Playlist Statistics CLI Library
//!
//! This library authenticates against the Spotify Web API, walks the playlists
//! of the current user and counts how often every artist is credited across
//! their tracks. The counts are ranked and printed as a short report.
//!
//! # Modules
//!
//! - `analyzer` - Playlist pagination and artist counting
//! - `api` - HTTP endpoints of the local callback server
//! - `cli` - Command-line workflow
//! - `config` - Configuration management and environment variables
//! - `error` - The crate wide error type
//! - `management` - Token cache on disk
//! - `report` - Ranking and printing of the artist counts
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and authorization flow (PKCE)
//! - `types` - Data structures and type definitions

pub mod analyzer;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod report;
pub mod server;
pub mod spotify;
pub mod types;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation of the library reports an [`Error`], which keeps
/// the decision about terminating the process in `main`.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// This macro will cause the program to exit immediately after printing
/// the error message. Only the binary uses it; library code returns
/// [`Error`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
