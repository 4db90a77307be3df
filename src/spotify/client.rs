use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config::{Config, Credentials},
    error::Error,
    utils, warning,
};

/// Waits above this many seconds are still honored but flagged.
const ABNORMAL_RETRY_AFTER_SECS: u64 = 120;

/// Handle on the Spotify Web API and accounts service.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    pub(crate) http: Client,
    pub(crate) api_url: String,
    pub(crate) auth_url: String,
    pub(crate) token_url: String,
    pub(crate) redirect_uri: String,
    pub(crate) scope: String,
    pub(crate) credentials: Credentials,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            credentials: config.credentials.clone(),
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Issues an authenticated GET and decodes a 200 body as `T`.
    ///
    /// Loops until the response is something other than 429 or a transport
    /// failure; see the module docs for the policy.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T, Error> {
        loop {
            let response = self
                .http
                .get(url)
                .query(query)
                .bearer_auth(token)
                .send()
                .await;

            let response = match response {
                Ok(resp) => resp,
                Err(err) => {
                    warning!("Request to {} failed, retrying: {}", url, err);
                    continue;
                }
            };

            match response.status() {
                StatusCode::OK => match response.bytes().await {
                    Ok(body) => return Ok(serde_json::from_slice(&body)?),
                    Err(err) => {
                        warning!("Reading response from {} failed, retrying: {}", url, err);
                    }
                },
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = utils::retry_after_secs(response.headers());
                    if retry_after > ABNORMAL_RETRY_AFTER_SECS {
                        warning!(
                            "Retry-After has reached an abnormal high of {} seconds for {}",
                            retry_after,
                            url
                        );
                    } else {
                        warning!("Rate limited on {}, retrying in {}s", url, retry_after);
                    }
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::UNAUTHORIZED => return Err(Error::Unauthorized),
                status => {
                    warning!("Unexpected status {} from {}", status, url);
                    return Err(Error::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
            }
        }
    }
}
