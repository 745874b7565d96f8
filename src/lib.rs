// Jalopy Watch - Core Library
// Salvage-yard inventory change detection: fingerprints, slot-replacement heuristic, reconciliation

pub mod error;
pub mod vehicle;      // Records + fingerprint function
pub mod snapshot;     // Prior snapshot loader/merger, CSV I/O
pub mod collector;    // Yard → make → model traversal
pub mod source;       // HTTP implementation of the inventory source
pub mod classifier;   // Row-replacement heuristic
pub mod reconciler;   // Final merge: full inventory + new vehicles
pub mod archive;      // Latest + dated outputs
pub mod notify;       // Email rendering and delivery
pub mod config;
pub mod logging;
pub mod pipeline;     // Run driver

// Re-export commonly used types
pub use error::{JalopyError, Result};
pub use vehicle::{fingerprint, SlotKey, VehicleRecord};
pub use snapshot::{load_snapshot, write_records, Snapshot};
pub use collector::{
    collect_inventory, Collection, InventorySource, ListingRow, Pacing, Yard, YardError,
    YardFailure,
};
pub use source::HttpInventorySource;
pub use classifier::{Classification, ReplacementClassifier, REPLACEMENT_THRESHOLD};
pub use reconciler::{Reconciler, Reconciliation};
pub use archive::{persist, OutputPaths, PersistedFiles};
pub use notify::{notify_new_vehicles, LogNotifier, NotificationStatus, Notifier};
#[cfg(feature = "email")]
pub use notify::SmtpNotifier;
pub use config::{load_configuration, AppConfig, MailSettings};
pub use pipeline::{run, RunSettings, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
