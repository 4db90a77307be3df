use crate::{
    error::Error,
    spotify::SpotifyClient,
    types::{Artist, Paging, RelatedArtistsResponse, SeveralArtistsResponse, TimeRange},
};

/// Upper bound of ids accepted by `GET /artists`.
pub const SEVERAL_ARTISTS_MAX_IDS: usize = 50;

impl SpotifyClient {
    /// Retrieves one page of the user's top artists.
    ///
    /// # Arguments
    ///
    /// * `token` - Access token with the `user-top-read` scope
    /// * `limit` - Page size (1-50)
    /// * `offset` - Index of the first artist to return
    /// * `time_range` - Affinity window; Spotify's default when `None`
    pub async fn get_top_artists(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
        time_range: Option<TimeRange>,
    ) -> Result<Vec<Artist>, Error> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(range) = time_range {
            query.push(("time_range", range.to_string()));
        }

        let page: Paging<Artist> = self
            .get_json(&self.endpoint("me/top/artists"), &query, token)
            .await?;
        Ok(page.items)
    }

    /// Fetches full artist objects (including genres) for a list of ids.
    ///
    /// Ids are sent comma-joined, in batches of at most
    /// [`SEVERAL_ARTISTS_MAX_IDS`]. Ids Spotify does not know are dropped
    /// from the result.
    pub async fn get_several_artists(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<Artist>, Error> {
        let mut artists = Vec::with_capacity(ids.len());
        for batch in ids.chunks(SEVERAL_ARTISTS_MAX_IDS) {
            let query = [("ids", batch.join(","))];
            let res: SeveralArtistsResponse = self
                .get_json(&self.endpoint("artists"), &query, token)
                .await?;
            artists.extend(res.artists.into_iter().flatten());
        }
        Ok(artists)
    }

    pub async fn get_related_artists(
        &self,
        token: &str,
        artist_id: &str,
    ) -> Result<Vec<Artist>, Error> {
        let url = self.endpoint(&format!(
            "artists/{}/related-artists",
            urlencoding::encode(artist_id)
        ));
        let res: RelatedArtistsResponse = self.get_json(&url, &[], token).await?;
        Ok(res.artists)
    }
}
