use anyhow::{Context, Result};
use chrono::Local;
use std::env;

use jalopy_watch::{
    load_configuration, logging, run, AppConfig, HttpInventorySource, JalopyError, LogNotifier,
    Notifier, RunSettings, RunSummary,
};

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let dry_run = args.len() > 1 && args[1] == "dry-run";

    let config = load_configuration().context("Failed to load configuration")?;
    let _guard = logging::init_logger(&config.log_file).context("Failed to initialize logging")?;

    let notifier: Box<dyn Notifier> = if dry_run {
        Box::new(LogNotifier)
    } else {
        build_notifier()?
    };

    let summary = match run_once(&config, notifier.as_ref()) {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(JalopyError::SnapshotNotFound(path)) = e.downcast_ref::<JalopyError>() {
                eprintln!("❌ File '{}' not found. Ensure it is in the working directory", path.display());
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    print_summary(&config, &summary);
    Ok(())
}

fn run_once(config: &AppConfig, notifier: &dyn Notifier) -> Result<RunSummary> {
    let source = HttpInventorySource::new(&config.base_url, &config.user_agent)?;
    let settings = RunSettings::from(config);
    let today = Local::now().date_naive();

    Ok(run(&settings, &source, notifier, today)?)
}

#[cfg(feature = "email")]
fn build_notifier() -> Result<Box<dyn Notifier>> {
    let settings = jalopy_watch::MailSettings::from_env()
        .context("EMAIL_SENDER, EMAIL_PASSWORD and EMAIL_RECIPIENT must be set")?;
    Ok(Box::new(jalopy_watch::SmtpNotifier::new(&settings)?))
}

#[cfg(not(feature = "email"))]
fn build_notifier() -> Result<Box<dyn Notifier>> {
    eprintln!("❌ Email support not available!");
    eprintln!("   Rebuild with: cargo build --features email");
    eprintln!("   Or run without email: jalopy-watch dry-run");
    std::process::exit(1);
}

fn print_summary(config: &AppConfig, summary: &RunSummary) {
    println!(
        "Full inventory: {} ({} vehicles)",
        config.snapshot_path.display(),
        summary.full_inventory
    );
    println!(
        "New vehicles only: {} ({} vehicles)",
        config.new_vehicles_path.display(),
        summary.new_vehicles
    );
    println!("Historical archives saved");

    for failure in &summary.yard_failures {
        println!("⚠️  Error in yard {}: {}", failure.yard, failure.message);
    }
}
