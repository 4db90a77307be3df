mod auth;

pub use auth::TokenManager;
