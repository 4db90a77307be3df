//! # Aggregation
//!
//! Builds the `/data` response from Spotify listening data.
//!
//! [`Pipeline`] drives the external calls in four strictly sequential phases
//! and feeds their results into an [`Aggregation`], the per-request
//! accumulator. The accumulator owns the classification rules:
//!
//! - an artist is *top* if it came from the top-artists endpoint,
//! - *recent* if it was the primary artist of a recently played track and is
//!   not top,
//! - *related* if a top or recent artist lists it as related and it is
//!   neither top nor recent.
//!
//! The three artist maps therefore never share a key, and every artist in any
//! of them, in a play event or at either end of a link has exactly one node
//! in the [`ArtistGraph`].

mod graph;
mod pipeline;

use std::collections::{BTreeMap, BTreeSet};

pub use graph::{ArtistGraph, GraphLink, GraphNode};
pub use pipeline::{
    Phase, Pipeline, RECENTS_MAX_PAGES, RECENTS_PAGE_SIZE, TOP_ARTISTS_PAGE_SIZE,
    TOP_ARTISTS_PAGES,
};

use crate::types::{
    AggregateResponse, Artist, ArtistRecord, PlayHistory, RecentPlay, TrackRecord,
};

#[derive(Debug, Default)]
pub struct Aggregation {
    recents: Vec<RecentPlay>,
    graph: ArtistGraph,
    tracks: BTreeMap<String, TrackRecord>,
    top_artists: BTreeMap<String, ArtistRecord>,
    recent_artists: BTreeMap<String, ArtistRecord>,
    related_artists: BTreeMap<String, ArtistRecord>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_top_artist(&mut self, artist: &Artist) {
        self.graph.add_node(&artist.id, &artist.name);
        self.recent_artists.remove(&artist.id);
        self.related_artists.remove(&artist.id);
        self.top_artists
            .insert(artist.id.clone(), ArtistRecord::from(artist));
    }

    /// Records one recently played item.
    ///
    /// `details` is the full artist object of the track's primary artist and
    /// supplies the genres; `valence` comes from the track's audio features.
    /// Items lacking a track id or a primary artist id are ignored and
    /// `false` is returned.
    pub fn add_recent_play(
        &mut self,
        play: &PlayHistory,
        details: Option<&Artist>,
        valence: Option<f64>,
    ) -> bool {
        let Some(track_id) = play.track.id.as_deref() else {
            return false;
        };
        let Some(primary) = play.track.artists.first() else {
            return false;
        };
        let Some(artist_id) = primary.id.as_deref() else {
            return false;
        };

        self.recents.push(RecentPlay {
            time: play.played_at.clone(),
            artist: artist_id.to_string(),
            track: track_id.to_string(),
        });

        if !self.top_artists.contains_key(artist_id) {
            self.related_artists.remove(artist_id);
            self.recent_artists
                .entry(artist_id.to_string())
                .or_insert_with(|| ArtistRecord {
                    name: primary.name.clone(),
                    genres: details.map(|a| a.genres.clone()).unwrap_or_default(),
                });
        }
        self.graph.add_node(artist_id, &primary.name);

        self.tracks.insert(
            track_id.to_string(),
            TrackRecord {
                name: play.track.name.clone(),
                valence,
            },
        );
        true
    }

    /// Records that `related` is listed as related to `source_id`.
    pub fn add_related_artist(&mut self, source_id: &str, related: &Artist) {
        if !self.is_seed(&related.id) {
            self.related_artists
                .entry(related.id.clone())
                .or_insert_with(|| ArtistRecord::from(related));
        }
        self.graph.add_node(&related.id, &related.name);
        self.graph.add_link(source_id, &related.id);
    }

    /// Whether the artist is classified as top or recent.
    pub fn is_seed(&self, artist_id: &str) -> bool {
        self.top_artists.contains_key(artist_id) || self.recent_artists.contains_key(artist_id)
    }

    /// Union of top and recent artist ids, in ascending order.
    pub fn seed_artist_ids(&self) -> Vec<String> {
        self.top_artists
            .keys()
            .chain(self.recent_artists.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn graph(&self) -> &ArtistGraph {
        &self.graph
    }

    pub fn recents(&self) -> &[RecentPlay] {
        &self.recents
    }

    pub fn tracks(&self) -> &BTreeMap<String, TrackRecord> {
        &self.tracks
    }

    pub fn top_artists(&self) -> &BTreeMap<String, ArtistRecord> {
        &self.top_artists
    }

    pub fn recent_artists(&self) -> &BTreeMap<String, ArtistRecord> {
        &self.recent_artists
    }

    pub fn related_artists(&self) -> &BTreeMap<String, ArtistRecord> {
        &self.related_artists
    }

    pub fn into_response(self) -> AggregateResponse {
        AggregateResponse {
            recents: self.recents,
            artists_graph: self.graph,
            tracks: self.tracks,
            top_artists: self.top_artists,
            recent_artists: self.recent_artists,
            related_artists: self.related_artists,
        }
    }
}
