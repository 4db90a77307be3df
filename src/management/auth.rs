use crate::{error::Error, info, spotify::SpotifyClient};

/// Access and refresh token pair for the duration of one `/data` request.
///
/// Tokens live only as long as the request; nothing is persisted.
pub struct TokenManager {
    access_token: String,
    refresh_token: Option<String>,
    refreshes: u32,
}

impl TokenManager {
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        TokenManager {
            access_token,
            refresh_token,
            refreshes: 0,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Number of successful refreshes performed so far.
    pub fn refresh_count(&self) -> u32 {
        self.refreshes
    }

    /// Replaces the access token using the refresh token.
    ///
    /// Without a refresh token the current access token cannot be renewed and
    /// [`Error::Unauthorized`] is returned. A rotated refresh token returned
    /// by Spotify replaces the old one.
    pub async fn refresh(&mut self, client: &SpotifyClient) -> Result<(), Error> {
        let Some(refresh_token) = self.refresh_token.as_deref() else {
            return Err(Error::Unauthorized);
        };

        let token = client.refresh_access_token(refresh_token).await?;
        self.access_token = token.access_token;
        if let Some(rotated) = token.refresh_token {
            self.refresh_token = Some(rotated);
        }
        self.refreshes += 1;

        info!("Access token refreshed ({} so far)", self.refreshes);
        Ok(())
    }
}
