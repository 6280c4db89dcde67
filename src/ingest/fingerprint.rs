use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::ChartRecord;

#[derive(Serialize)]
struct PositionedRecord<'a> {
    position: usize,
    record: &'a ChartRecord,
}

/// Computes the SHA-256 digest of a batch as a 64 char hex string.
///
/// Every row is hashed together with its index, so the same rows in a
/// different order produce a different digest. The run date is not part
/// of the content.
pub fn fingerprint(records: &[ChartRecord]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((records.len() as u64).to_le_bytes());

    for (position, record) in records.iter().enumerate() {
        // Serializing a plain struct to JSON cannot fail.
        let bytes = serde_json::to_vec(&PositionedRecord { position, record })
            .unwrap_or_default();
        // Length prefix keeps row boundaries unambiguous.
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }

    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> ChartRecord {
        ChartRecord {
            id: id.to_string(),
            name: name.to_string(),
            explicit: false,
            duration_sec: 201.5,
            image: Some(format!("https://img.example/{}.jpg", id)),
            album_title: "Album".to_string(),
            release_date: "2024-01-01".to_string(),
            artist_ids: vec!["a1".to_string()],
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let batch = vec![record("t1", "One"), record("t2", "Two")];
        let first = fingerprint(&batch);
        assert_eq!(first, fingerprint(&batch.clone()));
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_order() {
        let batch = vec![record("t1", "One"), record("t2", "Two")];
        let swapped = vec![record("t2", "Two"), record("t1", "One")];
        assert_ne!(fingerprint(&batch), fingerprint(&swapped));
    }

    #[test]
    fn test_fingerprint_changes_with_any_field() {
        let batch = vec![record("t1", "One")];

        let mut explicit = batch.clone();
        explicit[0].explicit = true;
        assert_ne!(fingerprint(&batch), fingerprint(&explicit));

        let mut image = batch.clone();
        image[0].image = None;
        assert_ne!(fingerprint(&batch), fingerprint(&image));

        let mut artists = batch.clone();
        artists[0].artist_ids.push("a2".to_string());
        assert_ne!(fingerprint(&batch), fingerprint(&artists));
    }

    #[test]
    fn test_empty_batch_has_stable_digest() {
        assert_eq!(fingerprint(&[]), fingerprint(&[]));
        assert_ne!(fingerprint(&[]), fingerprint(&[record("t1", "One")]));
    }
}
