// ⚙️ Configuration - defaults → jalopy.toml → JALOPY_* environment
// Mail credentials keep their deployed, unprefixed names (EMAIL_SENDER, ...)

use crate::archive::OutputPaths;
use crate::collector::{Pacing, Yard};
use crate::error::Result;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct YardConfig {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Traversal order is the order listed here
    #[serde(default = "default_yards")]
    pub yards: Vec<YardConfig>,

    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    #[serde(default = "default_new_vehicles_path")]
    pub new_vehicles_path: PathBuf,

    #[serde(default = "default_full_history_dir")]
    pub full_history_dir: PathBuf,

    #[serde(default = "default_new_history_dir")]
    pub new_history_dir: PathBuf,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_yard_delay_min_ms")]
    pub yard_delay_min_ms: u64,

    #[serde(default = "default_yard_delay_max_ms")]
    pub yard_delay_max_ms: u64,

    #[serde(default = "default_replacement_threshold")]
    pub replacement_threshold: usize,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://inventory.pickapartjalopyjungle.com".to_string()
}

fn default_yards() -> Vec<YardConfig> {
    [
        ("BOISE", "1020"),
        ("CALDWELL", "1021"),
        ("GARDEN CITY", "1119"),
        ("NAMPA", "1022"),
        ("TWIN FALLS", "1099"),
    ]
    .into_iter()
    .map(|(name, id)| YardConfig {
        name: name.to_string(),
        id: id.to_string(),
    })
    .collect()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("jalopy_inventory.csv")
}

fn default_new_vehicles_path() -> PathBuf {
    PathBuf::from("jalopy_new_vehicles.csv")
}

fn default_full_history_dir() -> PathBuf {
    PathBuf::from("full_inventory_history")
}

fn default_new_history_dir() -> PathBuf {
    PathBuf::from("new_inventory_history")
}

fn default_request_delay_ms() -> u64 {
    20
}

fn default_yard_delay_min_ms() -> u64 {
    3000
}

fn default_yard_delay_max_ms() -> u64 {
    5000
}

fn default_replacement_threshold() -> usize {
    crate::classifier::REPLACEMENT_THRESHOLD
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/jalopy.log")
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

impl AppConfig {
    pub fn yards(&self) -> Vec<Yard> {
        self.yards.iter().map(|y| Yard::new(&y.name, &y.id)).collect()
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::new(
            Duration::from_millis(self.request_delay_ms),
            Duration::from_millis(self.yard_delay_min_ms),
            Duration::from_millis(self.yard_delay_max_ms),
        )
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            snapshot: self.snapshot_path.clone(),
            new_vehicles: self.new_vehicles_path.clone(),
            full_history_dir: self.full_history_dir.clone(),
            new_history_dir: self.new_history_dir.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_url: default_base_url(),
            yards: default_yards(),
            snapshot_path: default_snapshot_path(),
            new_vehicles_path: default_new_vehicles_path(),
            full_history_dir: default_full_history_dir(),
            new_history_dir: default_new_history_dir(),
            request_delay_ms: default_request_delay_ms(),
            yard_delay_min_ms: default_yard_delay_min_ms(),
            yard_delay_max_ms: default_yard_delay_max_ms(),
            replacement_threshold: default_replacement_threshold(),
            log_file: default_log_file(),
            user_agent: default_user_agent(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("jalopy").required(false))
        .add_source(Environment::with_prefix("JALOPY").try_parsing(true))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}

/// Sender credentials and recipient for the notification email
#[derive(Clone, Deserialize)]
pub struct MailSettings {
    pub email_sender: String,
    pub email_password: String,
    pub email_recipient: String,

    #[serde(default = "default_smtp_relay")]
    pub smtp_relay: String,
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("email_sender", &self.email_sender)
            .field("email_password", &"<redacted>")
            .field("email_recipient", &self.email_recipient)
            .field("smtp_relay", &self.smtp_relay)
            .finish()
    }
}

impl MailSettings {
    /// Read EMAIL_SENDER, EMAIL_PASSWORD, EMAIL_RECIPIENT and optional SMTP_RELAY
    pub fn from_env() -> Result<Self> {
        let builder = Config::builder()
            .add_source(Environment::default().try_parsing(false))
            .build()?;
        Ok(builder.try_deserialize::<MailSettings>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = AppConfig::default();

        let yards = config.yards();
        assert_eq!(yards.len(), 5);
        assert_eq!(yards[0], Yard::new("BOISE", "1020"));
        assert_eq!(yards[2], Yard::new("GARDEN CITY", "1119"));
        assert_eq!(config.replacement_threshold, 3);
        assert_eq!(config.snapshot_path, PathBuf::from("jalopy_inventory.csv"));
    }

    #[test]
    fn test_pacing_from_config() {
        let config = AppConfig::default();
        let pacing = config.pacing();

        assert_eq!(pacing.request_delay, Duration::from_millis(20));
        assert_eq!(pacing.yard_delay_min, Duration::from_secs(3));
        assert_eq!(pacing.yard_delay_max, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_source_deserializes_to_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.base_url, default_base_url());
        assert_eq!(config.yards.len(), 5);
    }

    #[test]
    fn test_mail_settings_debug_redacts_password() {
        let settings = MailSettings {
            email_sender: "bot@example.com".to_string(),
            email_password: "hunter2".to_string(),
            email_recipient: "me@example.com".to_string(),
            smtp_relay: default_smtp_relay(),
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }
}
