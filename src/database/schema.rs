use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS artists (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        followers INTEGER NOT NULL CHECK (followers >= 0),
        popularity INTEGER NOT NULL CHECK (popularity BETWEEN 0 AND 100)
    );

    CREATE TABLE IF NOT EXISTS tracks (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        explicit INTEGER NOT NULL,
        primary_artist_id TEXT NOT NULL,
        image TEXT,
        duration_sec REAL NOT NULL CHECK (duration_sec > 0),
        FOREIGN KEY(primary_artist_id) REFERENCES artists(id)
    );

    CREATE TABLE IF NOT EXISTS chart_positions (
        id INTEGER PRIMARY KEY,
        date TEXT NOT NULL,
        position INTEGER NOT NULL CHECK (position >= 1),
        track_id TEXT NOT NULL,
        FOREIGN KEY(track_id) REFERENCES tracks(id)
    );

    CREATE TABLE IF NOT EXISTS genres (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );

    CREATE TABLE IF NOT EXISTS artist_genres (
        id INTEGER PRIMARY KEY,
        artist_id TEXT NOT NULL,
        genre_name TEXT NOT NULL,
        FOREIGN KEY(artist_id) REFERENCES artists(id),
        FOREIGN KEY(genre_name) REFERENCES genres(name),
        UNIQUE(artist_id, genre_name)
    );

    CREATE INDEX IF NOT EXISTS chart_positions_date_index ON chart_positions (date);
";

pub const LEDGER_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS run_fingerprints (
        id INTEGER PRIMARY KEY,
        date TEXT NOT NULL,
        fingerprint TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS run_fingerprints_date_index ON run_fingerprints (date);
";

/// Creates every table and index that is missing. Safe to call on each start.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute_batch(LEDGER_SCHEMA)?;
    Ok(())
}
