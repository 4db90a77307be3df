//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API the service needs: the
//! authorization-code token endpoint and the read-only resource endpoints
//! feeding the `/data` aggregation.
//!
//! ## Layout
//!
//! ```text
//! SpotifyClient (client.rs)   shared reqwest client, base URLs, credentials,
//!                             retry policy for resource calls
//!     ├── auth.rs             authorize URL, code exchange, token refresh
//!     ├── artists.rs          top artists, several artists, related artists
//!     └── tracks.rs           recently played, audio features
//! ```
//!
//! ## Retry Policy
//!
//! Every resource call goes through [`SpotifyClient::get_json`]:
//!
//! - **429 Too Many Requests**: the identical request is sent again after the
//!   number of seconds in `Retry-After`, with no cap on attempts, no growth
//!   and no jitter.
//! - **Transport errors**: the identical request is sent again immediately.
//!   This includes a 200 whose body breaks off mid-transfer. A complete body
//!   that is not valid JSON is returned as `Error::Json`.
//! - **401 Unauthorized**: returned as [`Error::Unauthorized`](crate::error::Error)
//!   so the caller can decide whether a token refresh applies.
//! - **Anything else but 200**: returned as
//!   [`Error::UnexpectedStatus`](crate::error::Error).
//!
//! Token endpoint calls are not retried; the authorization flow reports
//! their failure to the browser instead.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - code exchange and refresh (HTTP Basic client auth)
//! - `GET /me/top/artists`
//! - `GET /me/player/recently-played`
//! - `GET /artists?ids=...`
//! - `GET /audio-features?ids=...`
//! - `GET /artists/{id}/related-artists`

pub mod artists;
pub mod auth;
mod client;
pub mod tracks;

pub use client::SpotifyClient;
