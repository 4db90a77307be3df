use crate::{
    error::Error,
    spotify::SpotifyClient,
    types::{AudioFeatures, AudioFeaturesResponse, RecentlyPlayedResponse},
};

/// Upper bound of ids accepted by `GET /audio-features`.
pub const AUDIO_FEATURES_MAX_IDS: usize = 100;

impl SpotifyClient {
    /// Retrieves one page of recently played tracks, most recent first.
    ///
    /// Pagination runs backwards in time: pass the `cursors.before` value of
    /// the previous page as `before` to get the page preceding it.
    pub async fn get_recently_played(
        &self,
        token: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<RecentlyPlayedResponse, Error> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        self.get_json(&self.endpoint("me/player/recently-played"), &query, token)
            .await
    }

    /// Fetches audio features for the given track ids.
    ///
    /// Tracks without analysis come back as `null` and are dropped.
    pub async fn get_audio_features(
        &self,
        token: &str,
        ids: &[String],
    ) -> Result<Vec<AudioFeatures>, Error> {
        let mut features = Vec::with_capacity(ids.len());
        for batch in ids.chunks(AUDIO_FEATURES_MAX_IDS) {
            let query = [("ids", batch.join(","))];
            let res: AudioFeaturesResponse = self
                .get_json(&self.endpoint("audio-features"), &query, token)
                .await?;
            features.extend(res.audio_features.into_iter().flatten());
        }
        Ok(features)
    }
}
