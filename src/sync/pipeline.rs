use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::database::repo::TransactionManager;
use crate::error::Result;
use crate::ingest::fingerprint::fingerprint;
use crate::ingest::snapshot::BatchSource;
use crate::sync::ledger::ChangeLedger;
use crate::sync::merge::{merge, MergeCounts};
use crate::sync::normalizer::normalize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The batch matched the last recorded fingerprint; nothing was written.
    Unchanged { fingerprint: String },
    Merged {
        fingerprint: String,
        counts: MergeCounts,
    },
}

/// One synchronization run: fetch, compare, normalize, merge, record.
///
/// A failed fetch aborts before the store is touched. Everything after
/// that happens in a single transaction.
pub fn run_once(
    manager: &mut TransactionManager,
    source: &dyn BatchSource,
    date: NaiveDate,
) -> Result<RunOutcome> {
    let batch = source.fetch(date)?;

    manager.in_transaction(|tx| {
        let store: &Connection = tx;
        let ledger = ChangeLedger::new(store);

        if !ledger.is_new(&batch.records)? {
            warn!("Data not new, skipping table updates");
            return Ok(RunOutcome::Unchanged {
                fingerprint: fingerprint(&batch.records),
            });
        }

        let entities = normalize(&batch)?;
        let counts = merge(store, &entities)?;
        let entry = ledger.record(&batch.records, batch.date)?;

        info!("Run for {} wrote {} rows", batch.date, counts.total());
        Ok(RunOutcome::Merged {
            fingerprint: entry.fingerprint,
            counts,
        })
    })
}
