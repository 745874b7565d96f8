// 🔄 Run Pipeline - snapshot → collect → classify → reconcile → persist → notify
// Each stage hands its result to the next; nothing is shared across runs but files

use crate::archive::{persist, write_report, OutputPaths, PersistedFiles};
use crate::classifier::{Classification, ReplacementClassifier};
use crate::collector::{collect_inventory, InventorySource, Pacing, Yard, YardFailure};
use crate::config::AppConfig;
use crate::error::Result;
use crate::notify::{notify_new_vehicles, NotificationStatus, Notifier};
use crate::reconciler::{Reconciler, DATE_FORMAT};
use crate::snapshot::load_snapshot;
use crate::vehicle::SlotKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Everything a run needs besides its collaborators
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub yards: Vec<Yard>,
    pub pacing: Pacing,
    pub paths: OutputPaths,
    pub replacement_threshold: usize,
}

impl From<&AppConfig> for RunSettings {
    fn from(config: &AppConfig) -> Self {
        RunSettings {
            yards: config.yards(),
            pacing: config.pacing(),
            paths: config.output_paths(),
            replacement_threshold: config.replacement_threshold,
        }
    }
}

/// RunSummary - what happened, archived as JSON next to the full inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub run_date: String,
    pub prior_snapshot: usize,
    pub full_inventory: usize,
    pub new_vehicles: usize,
    pub unchanged: usize,
    pub new: usize,
    pub replaced: usize,
    pub flagged_slots: Vec<SlotKey>,
    pub yard_failures: Vec<YardFailure>,
    pub notification: NotificationStatus,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.yard_failures.is_empty() || matches!(self.notification, NotificationStatus::Failed { .. })
    }
}

/// Execute one full run.
///
/// Fails before any write when the prior snapshot is missing. Yard errors are
/// absorbed into the summary. A notification failure is logged and reported,
/// never allowed to touch the files already written.
pub fn run(
    settings: &RunSettings,
    source: &dyn InventorySource,
    notifier: &dyn Notifier,
    run_date: NaiveDate,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("run", %run_id, date = %run_date.format(DATE_FORMAT));
    let _enter = span.enter();

    // 1. Baseline (fatal if absent)
    let snapshot = load_snapshot(&settings.paths.snapshot)?;

    // 2. Current inventory
    let collection = collect_inventory(source, &settings.yards, &settings.pacing);
    for failure in &collection.failures {
        warn!(yard = %failure.yard, partial = failure.partial_records, "Yard incomplete: {}", failure.message);
    }

    // 3 + 4. Classify and reconcile
    let reconciler =
        Reconciler::with_classifier(ReplacementClassifier::with_threshold(settings.replacement_threshold));
    let reconciliation = reconciler.reconcile(&snapshot, collection.records, run_date);
    info!("Reconciled: {}", reconciliation.summary());

    // 5. Persist
    let files: PersistedFiles = persist(&settings.paths, run_date, &reconciliation)?;

    // 6. Notify (strictly after persistence)
    let notification = match notify_new_vehicles(notifier, &reconciliation.new_vehicles, run_date) {
        Ok(status) => status,
        Err(e) => {
            error!("Notification failed: {e}");
            NotificationStatus::Failed { error: e.to_string() }
        }
    };

    let summary = RunSummary {
        run_id,
        run_date: run_date.format(DATE_FORMAT).to_string(),
        prior_snapshot: snapshot.len(),
        full_inventory: reconciliation.updated_vehicles.len(),
        new_vehicles: reconciliation.new_vehicles.len(),
        unchanged: reconciliation.count(Classification::Unchanged),
        new: reconciliation.count(Classification::New),
        replaced: reconciliation.count(Classification::Replaced),
        flagged_slots: reconciliation.flagged_slots.clone(),
        yard_failures: collection.failures,
        notification,
    };

    // Inventories are already on disk; a lost report must not hide the counts
    let report_path = settings.paths.run_report(run_date);
    if let Err(e) = write_report(&report_path, &summary) {
        error!(path = %report_path.display(), "Run report not written: {e}");
    }
    info!(
        full = summary.full_inventory,
        new = summary.new_vehicles,
        snapshot = %files.snapshot.display(),
        "Run complete"
    );

    Ok(summary)
}
