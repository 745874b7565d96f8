// 📸 Snapshot Loader - last known inventory, indexed by fingerprint
// Loaded once per run, read-only afterwards, superseded by the run's output

use crate::error::{JalopyError, Result};
use crate::vehicle::VehicleRecord;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// CSV header written for every record file, including empty ones
pub const CSV_COLUMNS: [&str; 8] = [
    "yard",
    "yard_id",
    "make",
    "model",
    "year",
    "row",
    "fingerprint",
    "date_added",
];

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Snapshot - deduplicated baseline from the previous run
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Records in file order, first occurrence of each fingerprint only
    records: Vec<VehicleRecord>,

    /// fingerprint → position in `records`
    index: HashMap<String, usize>,

    /// Rows dropped because their fingerprint was already seen
    duplicates_dropped: usize,
}

impl Snapshot {
    /// Build a snapshot from records in load order.
    /// Fingerprints are recomputed; the first record per fingerprint wins.
    pub fn from_records(records: impl IntoIterator<Item = VehicleRecord>) -> Self {
        let mut snapshot = Snapshot::default();

        for mut record in records {
            record.refresh_fingerprint();

            if snapshot.index.contains_key(&record.fingerprint) {
                debug!(
                    fingerprint = %record.fingerprint,
                    yard = %record.yard,
                    row = %record.row,
                    "Dropping duplicate snapshot row"
                );
                snapshot.duplicates_dropped += 1;
                continue;
            }

            snapshot
                .index
                .insert(record.fingerprint.clone(), snapshot.records.len());
            snapshot.records.push(record);
        }

        snapshot
    }

    /// Look up a prior record by fingerprint
    pub fn get(&self, fingerprint: &str) -> Option<&VehicleRecord> {
        self.index.get(fingerprint).map(|&i| &self.records[i])
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.index.contains_key(fingerprint)
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }
}

// ============================================================================
// CSV I/O
// ============================================================================

/// Load the prior snapshot.
///
/// A missing file is fatal (`SnapshotNotFound`): without a baseline every
/// vehicle would look new.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(JalopyError::SnapshotNotFound(path.to_path_buf()));
    }

    let records = read_records(path)?;
    let loaded = records.len();
    let snapshot = Snapshot::from_records(records);

    if snapshot.duplicates_dropped() > 0 {
        warn!(
            path = %path.display(),
            dropped = snapshot.duplicates_dropped(),
            "Snapshot contained duplicate identity rows"
        );
    }
    info!(
        path = %path.display(),
        rows = loaded,
        unique = snapshot.len(),
        "Loaded prior snapshot"
    );

    Ok(snapshot)
}

/// Read every record from a CSV file (no fingerprinting, no dedup)
pub fn read_records(path: &Path) -> Result<Vec<VehicleRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: VehicleRecord = result?;
        records.push(record);
    }

    Ok(records)
}

/// Write records to a CSV file, replacing any existing content.
/// The header row is always written, even for an empty set.
pub fn write_records(path: &Path, records: &[VehicleRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(CSV_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
