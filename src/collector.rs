// 🧭 Inventory Collector - yard → make → model → listing rows
// Sequential traversal; failures are isolated per yard, never within a yard

use crate::vehicle::VehicleRecord;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

// ============================================================================
// SOURCE BOUNDARY
// ============================================================================

/// Yard - physical salvage yard as known to the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yard {
    pub name: String,
    pub id: String,
}

impl Yard {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Yard {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One rendered listing row; only year and row label matter to the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub year: String,
    pub row: String,
}

/// InventorySource - drill-down catalog queried by the collector
///
/// Implementations do their own transport; errors bubble up to the yard
/// boundary in `collect_inventory`.
pub trait InventorySource {
    /// Enumerate makes present in a yard
    fn makes(&self, yard: &Yard) -> Result<Vec<String>>;

    /// Enumerate models for a yard + make
    fn models(&self, yard: &Yard, make: &str) -> Result<Vec<String>>;

    /// Listing rows for a yard + make + model
    fn listing(&self, yard: &Yard, make: &str, model: &str) -> Result<Vec<ListingRow>>;
}

// ============================================================================
// PACING
// ============================================================================

/// Politeness delays toward the source
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// Fixed pause after each source call
    pub request_delay: Duration,

    /// Lower bound of the randomized pause after each yard
    pub yard_delay_min: Duration,

    /// Upper bound of the randomized pause after each yard
    pub yard_delay_max: Duration,
}

impl Pacing {
    pub fn new(request_delay: Duration, yard_delay_min: Duration, yard_delay_max: Duration) -> Self {
        Pacing {
            request_delay,
            yard_delay_min,
            yard_delay_max,
        }
    }

    /// No delays at all (tests, local fixtures)
    pub fn none() -> Self {
        Pacing::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Pick a delay uniformly from [min, max]
    pub fn yard_delay(&self) -> Duration {
        if self.yard_delay_max <= self.yard_delay_min {
            return self.yard_delay_min;
        }
        let secs = rand::thread_rng().gen_range(
            self.yard_delay_min.as_secs_f64()..=self.yard_delay_max.as_secs_f64(),
        );
        Duration::from_secs_f64(secs)
    }

    fn after_request(&self) {
        pause(self.request_delay);
    }

    fn after_yard(&self) {
        pause(self.yard_delay());
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::new(
            Duration::from_millis(20),
            Duration::from_millis(3000),
            Duration::from_millis(5000),
        )
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

// ============================================================================
// YARD RESULTS
// ============================================================================

/// Records collected from one yard
#[derive(Debug, Clone)]
pub struct YardInventory {
    pub yard: Yard,
    pub records: Vec<VehicleRecord>,
}

/// A yard traversal that stopped early.
/// `partial` holds whatever was collected before the failure.
#[derive(Error, Debug)]
#[error("error in yard {yard}: {cause:#}")]
pub struct YardError {
    pub yard: String,
    pub partial: Vec<VehicleRecord>,
    pub cause: anyhow::Error,
}

/// Failure entry kept for reporting once partial data has been merged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YardFailure {
    pub yard: String,
    pub message: String,
    pub partial_records: usize,
}

impl From<&YardError> for YardFailure {
    fn from(err: &YardError) -> Self {
        YardFailure {
            yard: err.yard.clone(),
            message: format!("{:#}", err.cause),
            partial_records: err.partial.len(),
        }
    }
}

/// Collection - flattened output of every yard traversal
#[derive(Debug, Default)]
pub struct Collection {
    /// All records in traversal order, including partial yards
    pub records: Vec<VehicleRecord>,

    /// Yards that failed part way (or entirely)
    pub failures: Vec<YardFailure>,
}

impl Collection {
    /// Merge per-yard results; failed yards contribute their partial records
    pub fn from_results(results: Vec<std::result::Result<YardInventory, YardError>>) -> Self {
        let mut collection = Collection::default();

        for result in results {
            match result {
                Ok(inventory) => collection.records.extend(inventory.records),
                Err(err) => {
                    collection.failures.push(YardFailure::from(&err));
                    collection.records.extend(err.partial);
                }
            }
        }

        collection
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ============================================================================
// TRAVERSAL
// ============================================================================

/// Traverse one yard. Any source error ends this yard only.
pub fn collect_yard(
    source: &dyn InventorySource,
    yard: &Yard,
    pacing: &Pacing,
) -> std::result::Result<YardInventory, YardError> {
    let mut records = Vec::new();

    match traverse_yard(source, yard, pacing, &mut records) {
        Ok(()) => Ok(YardInventory {
            yard: yard.clone(),
            records,
        }),
        Err(cause) => Err(YardError {
            yard: yard.name.clone(),
            partial: records,
            cause,
        }),
    }
}

fn traverse_yard(
    source: &dyn InventorySource,
    yard: &Yard,
    pacing: &Pacing,
    records: &mut Vec<VehicleRecord>,
) -> Result<()> {
    let makes = source.makes(yard)?;
    pacing.after_request();

    for make in &makes {
        let models = source.models(yard, make)?;
        pacing.after_request();

        for model in &models {
            let rows = source.listing(yard, make, model)?;
            debug!(yard = %yard.name, %make, %model, rows = rows.len(), "Listing fetched");

            records.extend(rows.into_iter().map(|listing| {
                VehicleRecord::new(&yard.name, &yard.id, make, model, listing.year, listing.row)
            }));
            pacing.after_request();
        }
    }

    Ok(())
}

/// Traverse every yard in order, one at a time.
///
/// Returns one result per yard; use `Collection::from_results` to flatten.
pub fn collect_yards(
    source: &dyn InventorySource,
    yards: &[Yard],
    pacing: &Pacing,
) -> Vec<std::result::Result<YardInventory, YardError>> {
    let mut results = Vec::with_capacity(yards.len());

    for yard in yards {
        info!(yard = %yard.name, yard_id = %yard.id, "Collecting yard");

        let result = collect_yard(source, yard, pacing);
        match &result {
            Ok(inventory) => {
                info!(yard = %yard.name, vehicles = inventory.records.len(), "Yard collected")
            }
            Err(err) => error!(
                yard = %err.yard,
                partial = err.partial.len(),
                "Error in yard {}: {:#}",
                err.yard,
                err.cause
            ),
        }
        results.push(result);

        pacing.after_yard();
    }

    results
}

/// Collect and flatten in one step
pub fn collect_inventory(source: &dyn InventorySource, yards: &[Yard], pacing: &Pacing) -> Collection {
    Collection::from_results(collect_yards(source, yards, pacing))
}

// ============================================================================
// TESTS
// ============================================================================
