use chrono::NaiveDate;
use tracing::{debug, info};

use crate::database::store::Store;
use crate::error::Result;
use crate::ingest::fingerprint::fingerprint;
use crate::models::{ChartRecord, RunFingerprint};

/// Append-only history of batch fingerprints, one row per changed run.
pub struct ChangeLedger<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> ChangeLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// True when `records` differ from the most recently recorded batch,
    /// or when nothing has been recorded yet.
    pub fn is_new(&self, records: &[ChartRecord]) -> Result<bool> {
        self.store.ensure_ledger()?;

        let Some(previous) = self.store.latest_fingerprint()? else {
            info!("No previous run recorded, treating batch as new");
            return Ok(true);
        };

        let current = fingerprint(records);
        debug!(
            "Comparing fingerprint {} against {} from {}",
            current, previous.fingerprint, previous.date
        );
        Ok(current != previous.fingerprint)
    }

    pub fn record(&self, records: &[ChartRecord], date: NaiveDate) -> Result<RunFingerprint> {
        let entry = RunFingerprint {
            date,
            fingerprint: fingerprint(records),
        };
        self.store.append_fingerprint(&entry)?;
        info!("Recorded fingerprint {} for {}", entry.fingerprint, date);
        Ok(entry)
    }
}
