// ⚖️ Reconciler - resolve date_added for every current record
// Produces the full inventory and the notification-worthy delta, in collector order

use crate::classifier::{Classification, ReplacementClassifier};
use crate::snapshot::Snapshot;
use crate::vehicle::{SlotKey, VehicleRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Date format used for date_added and archive file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Every current record with a resolved date_added
    pub updated_vehicles: Vec<VehicleRecord>,

    /// Unmatched or flagged records only
    pub new_vehicles: Vec<VehicleRecord>,

    /// Outcome per entry of `updated_vehicles`, same order
    pub outcomes: Vec<Classification>,

    /// Slots the classifier flagged, sorted
    pub flagged_slots: Vec<SlotKey>,
}

impl Reconciliation {
    pub fn count(&self, outcome: Classification) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} vehicles ({} unchanged, {} new, {} replaced across {} flagged slots)",
            self.updated_vehicles.len(),
            self.count(Classification::Unchanged),
            self.count(Classification::New),
            self.count(Classification::Replaced),
            self.flagged_slots.len()
        )
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct Reconciler {
    pub classifier: ReplacementClassifier,
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler {
            classifier: ReplacementClassifier::new(),
        }
    }

    pub fn with_classifier(classifier: ReplacementClassifier) -> Self {
        Reconciler { classifier }
    }

    /// Classify the current records against the snapshot and merge.
    ///
    /// No deduplication happens here: duplicate current rows pass through.
    pub fn reconcile(
        &self,
        snapshot: &Snapshot,
        current: Vec<VehicleRecord>,
        run_date: NaiveDate,
    ) -> Reconciliation {
        let flagged = self.classifier.flagged_slots(snapshot, &current);
        self.merge(snapshot, current, &flagged, run_date)
    }

    /// Merge with an already computed flagged-slot set
    pub fn merge(
        &self,
        snapshot: &Snapshot,
        current: Vec<VehicleRecord>,
        flagged: &HashSet<SlotKey>,
        run_date: NaiveDate,
    ) -> Reconciliation {
        let today = run_date.format(DATE_FORMAT).to_string();

        let mut updated_vehicles = Vec::with_capacity(current.len());
        let mut new_vehicles = Vec::new();
        let mut outcomes = Vec::with_capacity(current.len());

        for mut record in current {
            let outcome = self.classifier.classify(snapshot, flagged, &record);

            record.date_added = match outcome {
                Classification::Unchanged => snapshot
                    .get(&record.fingerprint)
                    .map(|prior| prior.date_added.clone())
                    .unwrap_or_else(|| today.clone()),
                Classification::New | Classification::Replaced => today.clone(),
            };

            if outcome.is_reportable() {
                new_vehicles.push(record.clone());
            }
            outcomes.push(outcome);
            updated_vehicles.push(record);
        }

        let mut flagged_slots: Vec<SlotKey> = flagged.iter().cloned().collect();
        flagged_slots.sort();

        Reconciliation {
            updated_vehicles,
            new_vehicles,
            outcomes,
            flagged_slots,
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
