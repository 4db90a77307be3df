use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::{
    aggregation::Aggregation,
    error::Error,
    info,
    management::TokenManager,
    spotify::SpotifyClient,
    success,
    types::{AggregateResponse, Artist, PlayHistory, TimeRange},
    warning,
};

pub const TOP_ARTISTS_PAGE_SIZE: u32 = 50;
pub const TOP_ARTISTS_PAGES: u32 = 2;
pub const RECENTS_PAGE_SIZE: u32 = 50;
pub const RECENTS_MAX_PAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    TopArtists,
    RecentPlays,
    RelatedArtists,
    Respond,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::TopArtists => "top artists",
            Phase::RecentPlays => "recent plays",
            Phase::RelatedArtists => "related artists",
            Phase::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// One run of the `/data` aggregation.
///
/// Phases run strictly one after another and every external call is awaited
/// before the next is issued:
///
/// 1. **Top artists** - two pages of 50 from `/me/top/artists`.
/// 2. **Recent plays** - up to 10 pages of 50 from
///    `/me/player/recently-played`, walking backwards with the `before`
///    cursor. Each page triggers one batched artist lookup (genres) and one
///    batched audio-features lookup (valence).
/// 3. **Related artists** - one related-artists call per top or recent
///    artist, in ascending id order. A 401 here refreshes the access token
///    once and repeats the same lookup.
/// 4. **Respond** - the accumulated [`AggregateResponse`].
///
/// Rate limiting and transport failures are absorbed by
/// [`SpotifyClient`]; any other failure ends the run with an error.
///
/// # Example
///
/// ```
/// let tokens = TokenManager::new(access_token, Some(refresh_token));
/// let response = Pipeline::new(&client, tokens)
///     .with_time_range(Some(TimeRange::LongTerm))
///     .run()
///     .await?;
/// ```
pub struct Pipeline<'a> {
    client: &'a SpotifyClient,
    tokens: TokenManager,
    time_range: Option<TimeRange>,
    acc: Aggregation,
}

impl<'a> Pipeline<'a> {
    pub fn new(client: &'a SpotifyClient, tokens: TokenManager) -> Self {
        Self {
            client,
            tokens,
            time_range: None,
            acc: Aggregation::new(),
        }
    }

    pub fn with_time_range(mut self, time_range: Option<TimeRange>) -> Self {
        self.time_range = time_range;
        self
    }

    pub async fn run(mut self) -> Result<AggregateResponse, Error> {
        self.top_artists().await?;
        self.recent_plays().await?;
        self.related_artists().await?;

        self.enter(Phase::Respond);
        success!(
            "Aggregated {} plays, {} artists and {} links ({} token refreshes)",
            self.acc.recents().len(),
            self.acc.graph().nodes().len(),
            self.acc.graph().links().len(),
            self.tokens.refresh_count()
        );
        Ok(self.acc.into_response())
    }

    fn enter(&self, phase: Phase) {
        info!("Aggregation phase: {}", phase);
    }

    async fn top_artists(&mut self) -> Result<(), Error> {
        self.enter(Phase::TopArtists);

        for page in 0..TOP_ARTISTS_PAGES {
            let artists = self
                .client
                .get_top_artists(
                    self.tokens.access_token(),
                    TOP_ARTISTS_PAGE_SIZE,
                    page * TOP_ARTISTS_PAGE_SIZE,
                    self.time_range,
                )
                .await?;

            for artist in &artists {
                self.acc.add_top_artist(artist);
            }
        }

        Ok(())
    }

    async fn recent_plays(&mut self) -> Result<(), Error> {
        self.enter(Phase::RecentPlays);

        let mut before: Option<String> = None;
        for _ in 0..RECENTS_MAX_PAGES {
            let page = self
                .client
                .get_recently_played(
                    self.tokens.access_token(),
                    RECENTS_PAGE_SIZE,
                    before.as_deref(),
                )
                .await?;

            if page.items.is_empty() {
                break;
            }

            // local files carry no ids and are skipped, the cursor still applies
            let plays: Vec<&PlayHistory> = page
                .items
                .iter()
                .filter(|p| p.track.id.is_some() && primary_artist_id(p).is_some())
                .collect();
            if !plays.is_empty() {
                self.add_plays(&plays).await?;
            }

            match page.cursors.and_then(|c| c.before) {
                Some(cursor) => before = Some(cursor),
                None => break,
            }
        }

        Ok(())
    }

    /// Looks up genres and valence for one page of plays and records them.
    async fn add_plays(&mut self, plays: &[&PlayHistory]) -> Result<(), Error> {
        let artist_ids = unique(plays.iter().filter_map(|p| primary_artist_id(p)));
        let track_ids = unique(plays.iter().filter_map(|p| p.track.id.as_deref()));

        let artists = self
            .client
            .get_several_artists(self.tokens.access_token(), &artist_ids)
            .await?;
        let features = self
            .client
            .get_audio_features(self.tokens.access_token(), &track_ids)
            .await?;

        let artists_by_id: HashMap<&str, &Artist> =
            artists.iter().map(|a| (a.id.as_str(), a)).collect();
        let valence_by_id: HashMap<&str, Option<f64>> = features
            .iter()
            .map(|f| (f.id.as_str(), f.valence))
            .collect();

        for play in plays {
            let details = primary_artist_id(play).and_then(|id| artists_by_id.get(id).copied());
            let valence = play
                .track
                .id
                .as_deref()
                .and_then(|id| valence_by_id.get(id).copied())
                .flatten();
            self.acc.add_recent_play(play, details, valence);
        }

        Ok(())
    }

    async fn related_artists(&mut self) -> Result<(), Error> {
        self.enter(Phase::RelatedArtists);

        let seeds = self.acc.seed_artist_ids();
        for artist_id in &seeds {
            let related = self.lookup_related(artist_id).await?;
            for artist in &related {
                self.acc.add_related_artist(artist_id, artist);
            }
        }

        Ok(())
    }

    async fn lookup_related(&mut self, artist_id: &str) -> Result<Vec<Artist>, Error> {
        let mut refreshed = false;
        loop {
            let result = self
                .client
                .get_related_artists(self.tokens.access_token(), artist_id)
                .await;

            match result {
                Err(Error::Unauthorized) if !refreshed => {
                    warning!(
                        "Access token rejected while fetching artists related to {}, refreshing",
                        artist_id
                    );
                    self.tokens.refresh(self.client).await?;
                    refreshed = true;
                }
                other => return other,
            }
        }
    }
}

fn primary_artist_id(play: &PlayHistory) -> Option<&str> {
    play.track.artists.first().and_then(|a| a.id.as_deref())
}

fn unique<'s>(ids: impl Iterator<Item = &'s str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
