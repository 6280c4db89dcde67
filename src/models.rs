use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One chart entry as handed over by the source. Row order is the rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: String,
    pub name: String,
    pub explicit: bool,
    pub duration_sec: f64,
    pub image: Option<String>,
    pub album_title: String,
    pub release_date: String,
    pub artist_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub followers: i64,
    pub popularity: i64,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Everything fetched in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub date: NaiveDate,
    pub records: Vec<ChartRecord>,
    pub artists: Vec<ArtistDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub followers: i64,
    pub popularity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub explicit: bool,
    pub primary_artist_id: String,
    pub image: Option<String>,
    pub duration_sec: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPosition {
    pub date: NaiveDate,
    pub position: u32,
    pub track_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtistGenre {
    pub artist_id: String,
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunFingerprint {
    pub date: NaiveDate,
    pub fingerprint: String,
}
