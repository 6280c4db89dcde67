//! Relational store capability used by the ledger and the merge engine.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};

use crate::database::schema::LEDGER_SCHEMA;
use crate::error::{Result, SyncError};
use crate::models::{Artist, ArtistGenre, ChartPosition, RunFingerprint, Track};

/// Entities whose identity is checked before appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Track,
    Genre,
}

impl EntityKind {
    fn key_query(self) -> &'static str {
        match self {
            EntityKind::Artist => "SELECT id FROM artists",
            EntityKind::Track => "SELECT id FROM tracks",
            EntityKind::Genre => "SELECT name FROM genres",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub artists: usize,
    pub tracks: usize,
    pub chart_positions: usize,
    pub genres: usize,
    pub artist_genres: usize,
    pub runs: usize,
}

pub trait Store {
    /// Identities already stored for `kind`.
    fn existing_keys(&self, kind: EntityKind) -> Result<HashSet<String>>;

    fn append_artists(&self, artists: &[Artist]) -> Result<usize>;

    fn append_tracks(&self, tracks: &[Track]) -> Result<usize>;

    fn append_chart_positions(&self, positions: &[ChartPosition]) -> Result<usize>;

    fn append_genres(&self, genres: &[String]) -> Result<usize>;

    /// Inserts the links, silently skipping pairs that already exist.
    /// Returns the number of rows actually written.
    fn insert_or_ignore_artist_genres(&self, links: &[ArtistGenre]) -> Result<usize>;

    fn ensure_ledger(&self) -> Result<()>;

    /// Most recent fingerprint by date; later rows win on the same date.
    fn latest_fingerprint(&self) -> Result<Option<RunFingerprint>>;

    fn append_fingerprint(&self, fingerprint: &RunFingerprint) -> Result<()>;

    fn stats(&self) -> Result<StoreStats>;
}

impl Store for Connection {
    fn existing_keys(&self, kind: EntityKind) -> Result<HashSet<String>> {
        let mut stmt = self.prepare_cached(kind.key_query())?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(keys)
    }

    fn append_artists(&self, artists: &[Artist]) -> Result<usize> {
        let mut stmt = self.prepare_cached(
            "INSERT INTO artists (id, name, followers, popularity) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for artist in artists {
            stmt.execute(params![
                artist.id,
                artist.name,
                artist.followers,
                artist.popularity
            ])
            .map_err(|e| SyncError::from_write("artists", e))?;
        }
        Ok(artists.len())
    }

    fn append_tracks(&self, tracks: &[Track]) -> Result<usize> {
        let mut stmt = self.prepare_cached(
            "INSERT INTO tracks (id, name, explicit, primary_artist_id, image, duration_sec)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for track in tracks {
            stmt.execute(params![
                track.id,
                track.name,
                track.explicit,
                track.primary_artist_id,
                track.image,
                track.duration_sec
            ])
            .map_err(|e| SyncError::from_write("tracks", e))?;
        }
        Ok(tracks.len())
    }

    fn append_chart_positions(&self, positions: &[ChartPosition]) -> Result<usize> {
        let mut stmt = self.prepare_cached(
            "INSERT INTO chart_positions (date, position, track_id) VALUES (?1, ?2, ?3)",
        )?;
        for position in positions {
            stmt.execute(params![position.date, position.position, position.track_id])
                .map_err(|e| SyncError::from_write("chart_positions", e))?;
        }
        Ok(positions.len())
    }

    fn append_genres(&self, genres: &[String]) -> Result<usize> {
        let mut stmt = self.prepare_cached("INSERT INTO genres (name) VALUES (?1)")?;
        for genre in genres {
            stmt.execute(params![genre])
                .map_err(|e| SyncError::from_write("genres", e))?;
        }
        Ok(genres.len())
    }

    fn insert_or_ignore_artist_genres(&self, links: &[ArtistGenre]) -> Result<usize> {
        let mut stmt = self.prepare_cached(
            "INSERT OR IGNORE INTO artist_genres (artist_id, genre_name) VALUES (?1, ?2)",
        )?;
        let mut written = 0;
        for link in links {
            written += stmt.execute(params![link.artist_id, link.genre_name])?;
        }
        Ok(written)
    }

    fn ensure_ledger(&self) -> Result<()> {
        self.execute_batch(LEDGER_SCHEMA)?;
        Ok(())
    }

    fn latest_fingerprint(&self) -> Result<Option<RunFingerprint>> {
        let latest = self
            .query_row(
                "SELECT date, fingerprint FROM run_fingerprints
                 ORDER BY date DESC, id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunFingerprint {
                        date: row.get(0)?,
                        fingerprint: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(latest)
    }

    fn append_fingerprint(&self, fingerprint: &RunFingerprint) -> Result<()> {
        self.execute(
            "INSERT INTO run_fingerprints (date, fingerprint) VALUES (?1, ?2)",
            params![fingerprint.date, fingerprint.fingerprint],
        )
        .map_err(|e| SyncError::from_write("run_fingerprints", e))?;
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                self.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreStats {
            artists: count("artists")?,
            tracks: count("tracks")?,
            chart_positions: count("chart_positions")?,
            genres: count("genres")?,
            artist_genres: count("artist_genres")?,
            runs: count("run_fingerprints")?,
        })
    }
}
