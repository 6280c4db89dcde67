use tracing::{debug, info};

use crate::database::store::{EntityKind, Store};
use crate::error::Result;
use crate::sync::normalizer::NormalizedBatch;

/// Rows written per table by one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub artists: usize,
    pub tracks: usize,
    pub chart_positions: usize,
    pub genres: usize,
    pub artist_genres: usize,
}

impl MergeCounts {
    pub fn total(&self) -> usize {
        self.artists + self.tracks + self.chart_positions + self.genres + self.artist_genres
    }
}

/// Appends the entities of `batch` that the store does not hold yet.
///
/// Tables are written in foreign-key order: artists, tracks, chart
/// positions, genres, artist-genre links. Chart positions are always
/// appended. Links rely on the store's unique pair constraint and are
/// inserted with conflicts ignored.
pub fn merge<S: Store + ?Sized>(store: &S, batch: &NormalizedBatch) -> Result<MergeCounts> {
    let existing = store.existing_keys(EntityKind::Artist)?;
    let artists: Vec<_> = batch
        .artists
        .iter()
        .filter(|a| !existing.contains(&a.id))
        .cloned()
        .collect();
    debug!("{} artists already stored", batch.artists.len() - artists.len());
    let artists = store.append_artists(&artists)?;

    let existing = store.existing_keys(EntityKind::Track)?;
    let tracks: Vec<_> = batch
        .tracks
        .iter()
        .filter(|t| !existing.contains(&t.id))
        .cloned()
        .collect();
    debug!("{} tracks already stored", batch.tracks.len() - tracks.len());
    let tracks = store.append_tracks(&tracks)?;

    let chart_positions = store.append_chart_positions(&batch.chart_positions)?;

    let existing = store.existing_keys(EntityKind::Genre)?;
    let genres: Vec<_> = batch
        .genres
        .iter()
        .filter(|g| !existing.contains(*g))
        .cloned()
        .collect();
    debug!("{} genres already stored", batch.genres.len() - genres.len());
    let genres = store.append_genres(&genres)?;

    let artist_genres = store.insert_or_ignore_artist_genres(&batch.artist_genres)?;

    let counts = MergeCounts {
        artists,
        tracks,
        chart_positions,
        genres,
        artist_genres,
    };
    info!(
        "Merged {} artists, {} tracks, {} chart positions, {} genres, {} artist genres",
        counts.artists, counts.tracks, counts.chart_positions, counts.genres, counts.artist_genres
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::error::SyncError;
    use crate::models::{ArtistDetail, Batch, ChartRecord};
    use crate::sync::normalizer::normalize;
    use chrono::NaiveDate;
    use rusqlite::Connection;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        schema::initialize(&conn).unwrap();
        conn
    }

    fn scenario(day: u32) -> Batch {
        let record = |id: &str, artist: &str| ChartRecord {
            id: id.to_string(),
            name: format!("Song {}", id),
            explicit: id == "t2",
            duration_sec: 199.9,
            image: None,
            album_title: "Album".to_string(),
            release_date: "2024-01-01".to_string(),
            artist_ids: vec![artist.to_string()],
        };
        Batch {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            records: vec![record("t1", "A"), record("t2", "B"), record("t3", "A")],
            artists: vec![
                ArtistDetail {
                    id: "A".to_string(),
                    name: "Artist A".to_string(),
                    followers: 5000,
                    popularity: 80,
                    genres: vec!["pop".to_string(), "rock".to_string()],
                },
                ArtistDetail {
                    id: "B".to_string(),
                    name: "Artist B".to_string(),
                    followers: 12,
                    popularity: 3,
                    genres: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_merge_writes_expected_rows() {
        let conn = open();
        let counts = merge(&conn, &normalize(&scenario(1)).unwrap()).unwrap();

        assert_eq!(
            counts,
            MergeCounts {
                artists: 2,
                tracks: 3,
                chart_positions: 3,
                genres: 2,
                artist_genres: 2,
            }
        );
        let stats = conn.stats().unwrap();
        assert_eq!(stats.artists, 2);
        assert_eq!(stats.artist_genres, 2);
    }

    #[test]
    fn test_merge_is_idempotent_for_entities() {
        let conn = open();
        let entities = normalize(&scenario(1)).unwrap();
        merge(&conn, &entities).unwrap();
        let again = merge(&conn, &entities).unwrap();

        assert_eq!(again.artists, 0);
        assert_eq!(again.tracks, 0);
        assert_eq!(again.genres, 0);
        assert_eq!(again.artist_genres, 0);

        let stats = conn.stats().unwrap();
        assert_eq!(stats.artists, 2);
        assert_eq!(stats.tracks, 3);
        assert_eq!(stats.genres, 2);
        assert_eq!(stats.artist_genres, 2);
    }

    #[test]
    fn test_chart_positions_accumulate_across_dates() {
        let conn = open();
        merge(&conn, &normalize(&scenario(1)).unwrap()).unwrap();
        let second = merge(&conn, &normalize(&scenario(2)).unwrap()).unwrap();

        assert_eq!(second.chart_positions, 3);
        let t1_rows: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM chart_positions WHERE track_id = 't1'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(t1_rows, 2);
    }

    #[test]
    fn test_references_resolve_after_merge() {
        let conn = open();
        merge(&conn, &normalize(&scenario(1)).unwrap()).unwrap();

        let dangling_tracks: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tracks t LEFT JOIN artists a ON a.id = t.primary_artist_id
                 WHERE a.id IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        let dangling_links: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM artist_genres ag
                 LEFT JOIN artists a ON a.id = ag.artist_id
                 LEFT JOIN genres g ON g.name = ag.genre_name
                 WHERE a.id IS NULL OR g.name IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(dangling_tracks, 0);
        assert_eq!(dangling_links, 0);
    }

    #[test]
    fn test_new_artist_with_known_genre_only_adds_link() {
        let conn = open();
        merge(&conn, &normalize(&scenario(1)).unwrap()).unwrap();

        let mut next = scenario(2);
        next.records[1].artist_ids = vec!["C".to_string()];
        next.artists.push(ArtistDetail {
            id: "C".to_string(),
            name: "Artist C".to_string(),
            followers: 1,
            popularity: 1,
            genres: vec!["rock".to_string()],
        });

        let counts = merge(&conn, &normalize(&next).unwrap()).unwrap();
        assert_eq!(counts.artists, 1);
        assert_eq!(counts.tracks, 0);
        assert_eq!(counts.genres, 0);
        assert_eq!(counts.artist_genres, 1);
    }

    #[test]
    fn test_unfiltered_duplicate_is_fatal_outside_links() {
        let conn = open();
        let entities = normalize(&scenario(1)).unwrap();
        merge(&conn, &entities).unwrap();

        let err = conn.append_genres(&entities.genres).unwrap_err();
        assert!(matches!(
            err,
            SyncError::ConstraintViolation { table: "genres", .. }
        ));
    }
}
