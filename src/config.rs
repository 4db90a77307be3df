//! Configuration management for the tastegraph service.
//!
//! Configuration is read once at start-up into a [`Config`] value which is
//! then handed to the server; no handler reads the environment directly.
//!
//! Values are resolved in this order:
//! 1. Command-line flags of the `serve` subcommand
//! 2. Environment variables
//! 3. The `.env` file in the local data directory
//! 4. Built-in defaults
//!
//! Client credentials come from `SPOTIFY_API_AUTH_CLIENT_ID` and
//! `SPOTIFY_API_AUTH_CLIENT_SECRET` when both are set, otherwise from a
//! secrets file holding the client id on the first line and the client
//! secret on the second.

use std::{
    env, fmt,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::Error;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const DEFAULT_SCOPE: &str =
    "user-read-private user-read-email user-top-read user-read-recently-played";
pub const DEFAULT_STATIC_DIR: &str = "public";
pub const DEFAULT_SECRETS_FILE: &str = "secret_keys.txt";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at `tastegraph/.env` under the platform data directory:
/// - Linux: `~/.local/share/tastegraph/.env`
/// - macOS: `~/Library/Application Support/tastegraph/.env`
/// - Windows: `%LOCALAPPDATA%/tastegraph/.env`
///
/// The directory is created if needed. A missing file is fine since every
/// setting has a default or can come from the process environment; a file
/// that exists but cannot be parsed is reported as an error.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("tastegraph/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Spotify application credentials used for the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Parses the secrets file format: client id on the first non-empty line,
    /// client secret on the second. Anything after that is ignored.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());
        match (lines.next(), lines.next()) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(Error::Config(
                "secrets file must contain the client id and the client secret on separate lines"
                    .to_string(),
            )),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = async_fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read secrets file {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Value of the `Authorization` header for the token endpoint.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Base URL of the Web API, e.g. `https://api.spotify.com/v1`.
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
    pub static_dir: PathBuf,
    pub credentials: Credentials,
}

impl Config {
    /// Builds the configuration from the environment.
    ///
    /// `secrets_path` overrides `SPOTIFY_SECRETS_FILE`; it is only read when
    /// the credentials are not present in the environment.
    pub async fn from_env(secrets_path: Option<PathBuf>) -> Result<Self, Error> {
        let server_addr = env_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS);
        let server_addr = SocketAddr::from_str(&server_addr)
            .map_err(|e| Error::Config(format!("invalid SERVER_ADDRESS {}: {}", server_addr, e)))?;

        let credentials = match (
            env::var("SPOTIFY_API_AUTH_CLIENT_ID"),
            env::var("SPOTIFY_API_AUTH_CLIENT_SECRET"),
        ) {
            (Ok(id), Ok(secret)) if !id.is_empty() && !secret.is_empty() => {
                Credentials::new(id, secret)
            }
            _ => {
                let path = secrets_path.unwrap_or_else(|| {
                    PathBuf::from(env_or("SPOTIFY_SECRETS_FILE", DEFAULT_SECRETS_FILE))
                });
                Credentials::load(&path).await?
            }
        };

        Ok(Self {
            server_addr,
            api_url: trim_slash(env_or("SPOTIFY_API_URL", DEFAULT_API_URL)),
            auth_url: env_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: env_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            redirect_uri: env_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: env_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            static_dir: PathBuf::from(env_or("STATIC_DIR", DEFAULT_STATIC_DIR)),
            credentials,
        })
    }

    /// Configuration with every default and the given credentials.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            credentials,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
