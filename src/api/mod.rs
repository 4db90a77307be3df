//! # API Module
//!
//! HTTP handlers of the web server.
//!
//! ## Endpoints
//!
//! - [`login`] - `GET /login`: stores a random `state` in the
//!   `spotify_auth_state` cookie and redirects to Spotify's authorize page.
//! - [`callback`] - `GET /callback?code&state`: checks `state` against the
//!   cookie, exchanges the code and redirects to
//!   `/#access_token=...&refresh_token=...` or `/#error=...`.
//! - [`data`] - `GET /data?access_token&refresh_token[&time_range]`: runs the
//!   aggregation pipeline and answers with its JSON.
//! - [`refresh_token`] - `GET /refresh_token?refresh_token`: answers
//!   `{"access_token": ...}`.
//! - [`health`] - `GET /health`: status and crate version.
//!
//! Failures of `/data` and `/refresh_token` are answered with the JSON body
//! produced by [`Error`](crate::error::Error); the authorization flow reports
//! its failures in the redirect fragment instead.

mod callback;
mod data;
mod health;
mod login;
mod refresh;

pub use callback::{CallbackParams, callback};
pub use data::{DataParams, data};
pub use health::health;
pub use login::{STATE_COOKIE, login};
pub use refresh::{RefreshParams, refresh_token};
