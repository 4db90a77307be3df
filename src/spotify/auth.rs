use reqwest::{StatusCode, Url, header::AUTHORIZATION};

use crate::{error::Error, spotify::SpotifyClient, types::TokenResponse};

impl SpotifyClient {
    /// Builds the accounts-service URL the browser is sent to by `/login`.
    ///
    /// # Arguments
    ///
    /// * `state` - Anti-forgery value that Spotify echoes back to `/callback`
    ///
    /// # Example
    ///
    /// ```
    /// let url = client.authorize_url("aZ3k9QpL0mN2xY7w")?;
    /// // https://accounts.spotify.com/authorize?response_type=code&client_id=...&state=aZ3k9QpL0mN2xY7w
    /// ```
    pub fn authorize_url(&self, state: &str) -> Result<String, Error> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.credentials.client_id.as_str()),
                ("scope", self.scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorize URL {}: {}", self.auth_url, e)))?;
        Ok(url.to_string())
    }

    /// Exchanges an authorization code for an access/refresh token pair.
    ///
    /// The request is authenticated with HTTP Basic credentials built from
    /// the client id and secret. Any status other than 200 yields
    /// [`Error::TokenExchange`]; transport failures yield [`Error::Http`].
    /// Neither is retried.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        self.post_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Obtains a fresh access token for a refresh token.
    ///
    /// Same failure semantics as [`SpotifyClient::exchange_code`]. Spotify may
    /// or may not rotate the refresh token; the returned value carries one
    /// only when it did.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        self.post_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, Error> {
        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::TokenExchange {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
