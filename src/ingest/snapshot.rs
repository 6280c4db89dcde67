use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SyncError};
use crate::models::{ArtistDetail, Batch, ChartRecord};

/// Produces the batch for one run. Authentication, paging and retries
/// belong to the implementor.
pub trait BatchSource {
    fn fetch(&self, date: NaiveDate) -> Result<Batch>;
}

#[derive(Debug, Deserialize)]
struct PlaylistSnapshot {
    tracks: Vec<SnapshotTrack>,
    #[serde(default)]
    artists: Vec<ArtistDetail>,
}

#[derive(Debug, Deserialize)]
struct SnapshotTrack {
    id: String,
    name: String,
    #[serde(default)]
    explicit: bool,
    duration_ms: u64,
    image: Option<String>,
    #[serde(default)]
    album_title: String,
    #[serde(default)]
    release_date: String,
    artists: Vec<String>,
}

impl From<SnapshotTrack> for ChartRecord {
    fn from(track: SnapshotTrack) -> Self {
        ChartRecord {
            id: track.id,
            name: track.name,
            explicit: track.explicit,
            duration_sec: track.duration_ms as f64 / 1000.0,
            image: track.image,
            album_title: track.album_title,
            release_date: track.release_date,
            artist_ids: track.artists,
        }
    }
}

/// Reads a playlist snapshot previously dumped to a JSON file.
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSource for SnapshotSource {
    fn fetch(&self, date: NaiveDate) -> Result<Batch> {
        let file = File::open(&self.path)
            .map_err(|e| SyncError::Fetch(format!("{:?}: {}", self.path, e)))?;
        let snapshot: PlaylistSnapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SyncError::Fetch(format!("{:?}: {}", self.path, e)))?;

        info!(
            "Fetched {} tracks and {} artists from {:?}",
            snapshot.tracks.len(),
            snapshot.artists.len(),
            self.path
        );

        Ok(Batch {
            date,
            records: snapshot.tracks.into_iter().map(ChartRecord::from).collect(),
            artists: snapshot.artists,
        })
    }
}
