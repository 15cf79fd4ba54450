//! # API Module
//!
//! HTTP endpoints of the local server that completes the OAuth 2.0
//! authorization code flow.
//!
//! - [`prompt`] - `GET /` tells the user which URL to visit.
//! - [`callback`] - `GET /callback` receives the redirect from Spotify's
//!   authorization server, checks the state nonce and exchanges the code.
//! - [`health`] - `GET /health` reports status and version.
//!
//! Every handler reads the [`crate::spotify::auth::AuthShared`] state that
//! the router injects as an [`axum::Extension`].

mod callback;
mod health;
mod prompt;

pub use callback::callback;
pub use health::health;
pub use prompt::prompt;
