// 🔁 Row-Replacement Classifier - infer slot turnover from fingerprint churn
// A slot (yard, row) is flagged when one run sees 3+ unmatched records there

use crate::snapshot::Snapshot;
use crate::vehicle::{SlotKey, VehicleRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Unmatched records a slot must accumulate in a single run
pub const REPLACEMENT_THRESHOLD: usize = 3;

// ============================================================================
// CLASSIFICATION OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Fingerprint in the prior snapshot, slot not flagged
    Unchanged,

    /// Fingerprint absent from the prior snapshot, slot not flagged
    New,

    /// Slot flagged for replacement; the record is re-listed as new
    Replaced,
}

impl Classification {
    /// Whether the record belongs in the new-vehicles report
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Classification::Unchanged)
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct ReplacementClassifier {
    /// Minimum unmatched records per slot (default: 3)
    pub threshold: usize,
}

impl ReplacementClassifier {
    pub fn new() -> Self {
        ReplacementClassifier {
            threshold: REPLACEMENT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: usize) -> Self {
        ReplacementClassifier { threshold }
    }

    /// Group unmatched records by slot. Every listing entry counts,
    /// identical rows included (one row can hold two identical vehicles).
    pub fn unmatched_by_slot<'a>(
        &self,
        snapshot: &Snapshot,
        current: &'a [VehicleRecord],
    ) -> BTreeMap<SlotKey, Vec<&'a VehicleRecord>> {
        let mut groups: BTreeMap<SlotKey, Vec<&'a VehicleRecord>> = BTreeMap::new();

        for record in current.iter().filter(|r| !snapshot.contains(&r.fingerprint)) {
            groups.entry(record.slot_key()).or_default().push(record);
        }

        groups
    }

    /// Slots whose churn in this run reaches the threshold
    pub fn flagged_slots(&self, snapshot: &Snapshot, current: &[VehicleRecord]) -> HashSet<SlotKey> {
        let flagged: HashSet<SlotKey> = self
            .unmatched_by_slot(snapshot, current)
            .into_iter()
            .filter(|(_, records)| records.len() >= self.threshold)
            .map(|(slot, _)| slot)
            .collect();

        for slot in &flagged {
            info!(yard = %slot.yard, row = %slot.row, "Slot flagged for replacement");
        }

        flagged
    }

    /// Outcome for a single record given the flagged slot set
    pub fn classify(
        &self,
        snapshot: &Snapshot,
        flagged: &HashSet<SlotKey>,
        record: &VehicleRecord,
    ) -> Classification {
        if flagged.contains(&record.slot_key()) {
            Classification::Replaced
        } else if snapshot.contains(&record.fingerprint) {
            Classification::Unchanged
        } else {
            Classification::New
        }
    }
}

impl Default for ReplacementClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
