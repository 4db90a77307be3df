//! # CLI Module
//!
//! Implementations of the `tastegraph` subcommands. Each function owns its
//! user-facing output and terminates the process through the `error!` macro
//! when it cannot continue.
//!
//! - [`serve`] - resolve the configuration, apply command-line overrides and
//!   run the web server until it stops.

mod serve;

pub use serve::serve;
