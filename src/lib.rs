//! Spotify listening graph service library
//!
//! This library implements a small web service that signs a user in to the
//! Spotify Web API with the OAuth 2.0 authorization code flow and then
//! aggregates their top artists, recently played tracks, audio features and
//! related artists into a single artist graph for a front-end visualization.
//!
//! # Modules
//!
//! - `aggregation` - The four-phase `/data` pipeline and its accumulators
//! - `api` - HTTP handlers for the web server
//! - `cli` - Command-line command implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type and its HTTP mapping
//! - `management` - Per-request access and refresh token handling
//! - `server` - Router construction and the listening loop
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Wire types and the aggregated response
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use tastegraph::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> tastegraph::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env(None).await?;
//!     server::start_api_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias for start-up plumbing that mixes error sources.
///
/// Request-level code returns [`error::Error`] instead, which maps onto an
/// HTTP response.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line prefixed with a blue `o`.
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

/// Prints a success line prefixed with a green check mark.
///
/// ```
/// success!("Aggregated {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line prefixed with a red `!` and exits with code 1.
///
/// Only for start-up failures the server cannot recover from. Request
/// handling never calls this; it returns [`error::Error`] instead.
///
/// ```
/// error!("Cannot bind {}: {}", addr, err);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line prefixed with a yellow `!`.
///
/// Used for recoverable conditions such as rate-limit waits and retried
/// transport failures.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
