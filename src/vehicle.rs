// 🚗 Vehicle Records - one observed vehicle in one yard slot
// Identity is the fingerprint: SHA-256 over (yard_id, make, model, year, row)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Field delimiter used when building the fingerprint input.
///
/// Persisted snapshots depend on this value and on the field order below;
/// changing either invalidates every stored fingerprint.
pub const FINGERPRINT_DELIMITER: &str = "|";

// ============================================================================
// VEHICLE RECORD
// ============================================================================

/// VehicleRecord - fixed-shape row of the inventory snapshot
///
/// Column order matches the persisted CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Yard display name (e.g. "BOISE")
    pub yard: String,

    /// Source-system yard identifier (e.g. "1020")
    pub yard_id: String,

    pub make: String,

    pub model: String,

    /// Free text, not guaranteed numeric
    pub year: String,

    /// Slot label, only unique within a yard and reused over time
    pub row: String,

    /// Derived identity. Ignored on load and recomputed, written on save
    #[serde(default, skip_deserializing)]
    pub fingerprint: String,

    /// Date first observed as new (YYYY-MM-DD), empty until reconciled
    #[serde(default)]
    pub date_added: String,
}

impl VehicleRecord {
    /// Create a raw record as produced by the collector.
    /// The fingerprint is computed immediately; `date_added` stays empty.
    pub fn new(
        yard: impl Into<String>,
        yard_id: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: impl Into<String>,
        row: impl Into<String>,
    ) -> Self {
        let mut record = VehicleRecord {
            yard: yard.into(),
            yard_id: yard_id.into(),
            make: make.into(),
            model: model.into(),
            year: year.into(),
            row: row.into(),
            fingerprint: String::new(),
            date_added: String::new(),
        };
        record.refresh_fingerprint();
        record
    }

    /// Builder pattern: set date_added
    pub fn with_date_added(mut self, date_added: impl Into<String>) -> Self {
        self.date_added = date_added.into();
        self
    }

    /// Compute the identity digest for this record (lowercase hex SHA-256)
    pub fn compute_fingerprint(&self) -> String {
        fingerprint(&self.yard_id, &self.make, &self.model, &self.year, &self.row)
    }

    /// Recompute and store the fingerprint
    pub fn refresh_fingerprint(&mut self) {
        self.fingerprint = self.compute_fingerprint();
    }

    /// Physical slot this record occupies
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(&self.yard, &self.row)
    }
}

/// Fingerprint function.
///
/// Pure and total: empty fields are hashed as empty strings.
pub fn fingerprint(yard_id: &str, make: &str, model: &str, year: &str, row: &str) -> String {
    let key = [yard_id, make, model, year, row].join(FINGERPRINT_DELIMITER);
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// SLOT KEY
// ============================================================================

/// SlotKey - (yard, row) grouping key used by the replacement classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub yard: String,
    pub row: String,
}

impl SlotKey {
    pub fn new(yard: impl Into<String>, row: impl Into<String>) -> Self {
        SlotKey {
            yard: yard.into(),
            row: row.into(),
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} row {}", self.yard, self.row)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A12");
        let b = VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A12");

        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.compute_fingerprint(), a.compute_fingerprint());
        assert_eq!(a.fingerprint.len(), 64, "SHA-256 hash should be 64 hex characters");

        println!("✅ Fingerprint determinism test PASSED");
    }

    #[test]
    fn test_fingerprint_known_digest() {
        // sha256("1020|FORD|F-150|2004|A12") must never change across releases
        let fp = fingerprint("1020", "FORD", "F-150", "2004", "A12");
        let mut hasher = Sha256::new();
        hasher.update(b"1020|FORD|F-150|2004|A12");
        assert_eq!(fp, format!("{:x}", hasher.finalize()));
    }

    #[test]
    fn test_fingerprint_ignores_yard_name_and_date() {
        let a = VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A12")
            .with_date_added("2025-01-01");
        let b = VehicleRecord::new("Boise Yard", "1020", "FORD", "F-150", "2004", "A12")
            .with_date_added("2025-06-01");

        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_sensitive_to_each_identity_field() {
        let base = VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A12");
        let variants = [
            VehicleRecord::new("BOISE", "1021", "FORD", "F-150", "2004", "A12"),
            VehicleRecord::new("BOISE", "1020", "CHEVY", "F-150", "2004", "A12"),
            VehicleRecord::new("BOISE", "1020", "FORD", "RANGER", "2004", "A12"),
            VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2005", "A12"),
            VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A13"),
        ];

        for v in &variants {
            assert_ne!(base.fingerprint, v.fingerprint);
        }
    }

    #[test]
    fn test_empty_fields_are_hashed() {
        let fp = fingerprint("", "", "", "", "");
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint("", "", "", "", ""));
    }

    #[test]
    fn test_slot_key() {
        let v = VehicleRecord::new("NAMPA", "1022", "HONDA", "CIVIC", "1999", "7");
        assert_eq!(v.slot_key(), SlotKey::new("NAMPA", "7"));
        assert_eq!(v.slot_key().to_string(), "NAMPA row 7");
    }
}
