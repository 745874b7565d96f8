// 🗄️ Archive - latest outputs plus dated, never-overwritten history copies

use crate::error::Result;
use crate::reconciler::{Reconciliation, DATE_FORMAT};
use crate::snapshot::write_records;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where each run writes its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Prior snapshot input; overwritten with the full inventory
    pub snapshot: PathBuf,

    /// Latest new-vehicles delta
    pub new_vehicles: PathBuf,

    /// Directory of dated full-inventory copies
    pub full_history_dir: PathBuf,

    /// Directory of dated new-vehicle copies
    pub new_history_dir: PathBuf,
}

impl OutputPaths {
    pub fn full_archive(&self, run_date: NaiveDate) -> PathBuf {
        self.full_history_dir.join(format!(
            "jalopy_full_inventory_{}.csv",
            run_date.format(DATE_FORMAT)
        ))
    }

    pub fn new_archive(&self, run_date: NaiveDate) -> PathBuf {
        self.new_history_dir.join(format!(
            "jalopy_new_vehicles_{}.csv",
            run_date.format(DATE_FORMAT)
        ))
    }

    pub fn run_report(&self, run_date: NaiveDate) -> PathBuf {
        self.full_history_dir
            .join(format!("jalopy_run_{}.json", run_date.format(DATE_FORMAT)))
    }
}

/// Files written by `persist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFiles {
    pub snapshot: PathBuf,
    pub new_vehicles: PathBuf,
    pub full_archive: PathBuf,
    pub new_archive: PathBuf,
}

/// Write latest and archival copies of both record sets
pub fn persist(
    paths: &OutputPaths,
    run_date: NaiveDate,
    reconciliation: &Reconciliation,
) -> Result<PersistedFiles> {
    fs::create_dir_all(&paths.full_history_dir)?;
    fs::create_dir_all(&paths.new_history_dir)?;

    let files = PersistedFiles {
        snapshot: paths.snapshot.clone(),
        new_vehicles: paths.new_vehicles.clone(),
        full_archive: paths.full_archive(run_date),
        new_archive: paths.new_archive(run_date),
    };

    write_records(&files.snapshot, &reconciliation.updated_vehicles)?;
    write_records(&files.new_vehicles, &reconciliation.new_vehicles)?;
    write_records(&files.full_archive, &reconciliation.updated_vehicles)?;
    write_records(&files.new_archive, &reconciliation.new_vehicles)?;

    info!(
        snapshot = %files.snapshot.display(),
        full_archive = %files.full_archive.display(),
        new_archive = %files.new_archive.display(),
        "Inventory files written"
    );

    Ok(files)
}

/// Archive a serializable run report as pretty JSON
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{load_snapshot, read_records};
    use crate::vehicle::VehicleRecord;
    use tempfile::tempdir;

    #[test]
    fn test_persist_layout() {
        let dir = tempdir().unwrap();
        let paths = OutputPaths {
            snapshot: dir.path().join("jalopy_inventory.csv"),
            new_vehicles: dir.path().join("jalopy_new_vehicles.csv"),
            full_history_dir: dir.path().join("full_inventory_history"),
            new_history_dir: dir.path().join("new_inventory_history"),
        };
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let old = VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "A1")
            .with_date_added("2025-01-01");
        let new = VehicleRecord::new("BOISE", "1020", "KIA", "RIO", "2012", "A2")
            .with_date_added("2025-06-01");
        let reconciliation = Reconciliation {
            updated_vehicles: vec![old, new.clone()],
            new_vehicles: vec![new],
            outcomes: vec![],
            flagged_slots: vec![],
        };

        let files = persist(&paths, date, &reconciliation).unwrap();

        assert_eq!(
            files.full_archive,
            dir.path().join("full_inventory_history/jalopy_full_inventory_2025-06-01.csv")
        );
        assert_eq!(
            files.new_archive,
            dir.path().join("new_inventory_history/jalopy_new_vehicles_2025-06-01.csv")
        );
        assert_eq!(load_snapshot(&files.snapshot).unwrap().len(), 2);
        assert_eq!(read_records(&files.full_archive).unwrap().len(), 2);
        assert_eq!(read_records(&files.new_vehicles).unwrap().len(), 1);
        assert_eq!(read_records(&files.new_archive).unwrap()[0].make, "KIA");
    }

    #[test]
    fn test_run_report_path() {
        let paths = OutputPaths {
            snapshot: PathBuf::from("s.csv"),
            new_vehicles: PathBuf::from("n.csv"),
            full_history_dir: PathBuf::from("full"),
            new_history_dir: PathBuf::from("new"),
        };
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(paths.run_report(date), PathBuf::from("full/jalopy_run_2025-06-01.json"));
    }
}
