use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, SyncError};
use crate::models::{Artist, ArtistGenre, Batch, ChartPosition, Track};

/// The distinct entities of one batch, ready to merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub artists: Vec<Artist>,
    pub tracks: Vec<Track>,
    pub chart_positions: Vec<ChartPosition>,
    pub genres: Vec<String>,
    pub artist_genres: Vec<ArtistGenre>,
}

/// Splits a batch into artists, tracks, positions, genres and links.
///
/// The first artist of each record is its primary artist. Output order
/// follows first appearance in the batch.
pub fn normalize(batch: &Batch) -> Result<NormalizedBatch> {
    let details: HashMap<&str, _> = batch
        .artists
        .iter()
        .rev()
        .map(|detail| (detail.id.as_str(), detail))
        .collect();

    let mut seen_artists = HashSet::new();
    let mut seen_tracks = HashSet::new();
    let mut seen_genres = HashSet::new();
    let mut seen_links = HashSet::new();
    let mut out = NormalizedBatch::default();

    for (index, record) in batch.records.iter().enumerate() {
        let primary_artist_id = record.artist_ids.first().ok_or_else(|| {
            SyncError::SourceData(format!(
                "track {} at position {} has no artists",
                record.id,
                index + 1
            ))
        })?;

        if !(record.duration_sec > 0.0) {
            return Err(SyncError::SourceData(format!(
                "track {} has non-positive duration {}",
                record.id, record.duration_sec
            )));
        }

        out.chart_positions.push(ChartPosition {
            date: batch.date,
            position: (index + 1) as u32,
            track_id: record.id.clone(),
        });

        if seen_tracks.insert(record.id.as_str()) {
            out.tracks.push(Track {
                id: record.id.clone(),
                name: record.name.clone(),
                explicit: record.explicit,
                primary_artist_id: primary_artist_id.clone(),
                image: record.image.clone(),
                duration_sec: record.duration_sec,
            });
        }

        if !seen_artists.insert(primary_artist_id.as_str()) {
            continue;
        }

        let detail = details.get(primary_artist_id.as_str()).ok_or_else(|| {
            SyncError::SourceData(format!(
                "no detail record for primary artist {} of track {}",
                primary_artist_id, record.id
            ))
        })?;

        if detail.followers < 0 {
            return Err(SyncError::SourceData(format!(
                "artist {} has negative follower count {}",
                detail.id, detail.followers
            )));
        }
        if !(0..=100).contains(&detail.popularity) {
            return Err(SyncError::SourceData(format!(
                "artist {} has popularity {} outside 0..=100",
                detail.id, detail.popularity
            )));
        }

        out.artists.push(Artist {
            id: detail.id.clone(),
            name: detail.name.clone(),
            followers: detail.followers,
            popularity: detail.popularity,
        });

        for genre in detail.genres.iter().filter(|g| !g.trim().is_empty()) {
            if seen_genres.insert(genre.as_str()) {
                out.genres.push(genre.clone());
            }
            if seen_links.insert((detail.id.as_str(), genre.as_str())) {
                out.artist_genres.push(ArtistGenre {
                    artist_id: detail.id.clone(),
                    genre_name: genre.clone(),
                });
            }
        }
    }

    let unused = batch
        .artists
        .iter()
        .filter(|detail| !seen_artists.contains(detail.id.as_str()))
        .count();
    if unused > 0 {
        debug!("Ignoring {} artist details that are not a primary artist", unused);
    }

    Ok(out)
}
