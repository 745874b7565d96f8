// 📬 Notification - email the new-vehicles delta
// Sent only when the delta is non-empty, always after persistence

use crate::error::Result;
use crate::reconciler::DATE_FORMAT;
use crate::vehicle::VehicleRecord;
use chrono::NaiveDate;
use html_escape::encode_text;
use serde::{Deserialize, Serialize};
use tracing::info;

const CELL_STYLE: &str = "border:1px solid #ddd; padding:6px;";
const HEADER_STYLE: &str = "border:1px solid #ddd; padding:8px;";
const PARAGRAPH_STYLE: &str = "font-family: Arial, sans-serif; font-size: 15px;";

/// Column headers of the emailed table
pub const TABLE_COLUMNS: [&str; 6] = ["Yard", "Row", "Year", "Make", "Model", "Date Added"];

// ============================================================================
// NOTIFIER TRAIT
// ============================================================================

/// Notifier - single-recipient mail channel
pub trait Notifier {
    /// Deliver one message with an HTML body
    fn send(&self, subject: &str, html_body: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// Nothing new, no message attempted
    Skipped,

    /// One message sent covering `count` vehicles
    Sent { count: usize },

    /// Delivery failed; outputs were already written
    Failed { error: String },
}

/// Notify about new vehicles, or do nothing when there are none
pub fn notify_new_vehicles(
    notifier: &dyn Notifier,
    new_vehicles: &[VehicleRecord],
    run_date: NaiveDate,
) -> Result<NotificationStatus> {
    if new_vehicles.is_empty() {
        info!("No new vehicles, no email sent");
        return Ok(NotificationStatus::Skipped);
    }

    let subject = render_subject(new_vehicles.len(), run_date);
    let body = render_body(new_vehicles, run_date);
    notifier.send(&subject, &body)?;

    info!(count = new_vehicles.len(), "Email sent");
    Ok(NotificationStatus::Sent {
        count: new_vehicles.len(),
    })
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn render_subject(count: usize, run_date: NaiveDate) -> String {
    format!(
        "🚗 {} New Vehicles Added - {}",
        count,
        run_date.format(DATE_FORMAT)
    )
}

/// Email-client friendly HTML (inline styles only)
pub fn render_body(new_vehicles: &[VehicleRecord], run_date: NaiveDate) -> String {
    let date = run_date.format(DATE_FORMAT);
    let count = new_vehicles.len();

    format!(
        "<p style='{PARAGRAPH_STYLE}'>Hello,<br><br>\
         <strong>{count}</strong> new vehicle(s) were added to the Jalopy Jungle Inventory on \
         <strong>{date}</strong>.</p>\
         <p style='{PARAGRAPH_STYLE}'>Here is a detailed list:</p>\
         {table}\
         <p style='{PARAGRAPH_STYLE}'>Best regards,<br><strong>Jalopy Inventory Bot</strong></p>",
        table = render_table(new_vehicles),
    )
}

pub fn render_table(vehicles: &[VehicleRecord]) -> String {
    let header: String = TABLE_COLUMNS
        .iter()
        .map(|c| format!("<th style='{HEADER_STYLE}'>{c}</th>"))
        .collect();

    let rows: String = vehicles
        .iter()
        .map(|v| {
            let cells: String = [&v.yard, &v.row, &v.year, &v.make, &v.model, &v.date_added]
                .iter()
                .map(|value| format!("<td style='{CELL_STYLE}'>{}</td>", encode_text(value.as_str())))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        "<table style='border-collapse:collapse; width:100%; font-family:Arial, sans-serif; font-size:14px;'>\
         <thead><tr style='background-color:#F05A28; color:white;'>{header}</tr></thead>\
         <tbody>{rows}</tbody></table>"
    )
}

// ============================================================================
// TRANSPORTS
// ============================================================================

/// Logs the message instead of sending it (dry runs)
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, subject: &str, html_body: &str) -> Result<()> {
        info!(%subject, body_bytes = html_body.len(), "Dry run: email not sent");
        Ok(())
    }
}

#[cfg(feature = "email")]
pub use smtp::SmtpNotifier;

#[cfg(feature = "email")]
mod smtp {
    use super::Notifier;
    use crate::config::MailSettings;
    use crate::error::{JalopyError, Result};
    use lettre::message::header::ContentType;
    use lettre::message::Mailbox;
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{Message, SmtpTransport, Transport};

    /// SMTP delivery from the configured sender to the configured recipient
    pub struct SmtpNotifier {
        transport: SmtpTransport,
        from: Mailbox,
        to: Mailbox,
    }

    impl SmtpNotifier {
        pub fn new(settings: &MailSettings) -> Result<Self> {
            let from: Mailbox = settings
                .email_sender
                .parse()
                .map_err(|e| JalopyError::Mail(format!("invalid sender address: {e}")))?;
            let to: Mailbox = settings
                .email_recipient
                .parse()
                .map_err(|e| JalopyError::Mail(format!("invalid recipient address: {e}")))?;

            let transport = SmtpTransport::relay(&settings.smtp_relay)
                .map_err(|e| JalopyError::Mail(format!("SMTP relay {}: {e}", settings.smtp_relay)))?
                .credentials(Credentials::new(
                    settings.email_sender.clone(),
                    settings.email_password.clone(),
                ))
                .build();

            Ok(SmtpNotifier { transport, from, to })
        }
    }

    impl Notifier for SmtpNotifier {
        fn send(&self, subject: &str, html_body: &str) -> Result<()> {
            let message = Message::builder()
                .from(self.from.clone())
                .to(self.to.clone())
                .subject(subject)
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string())
                .map_err(|e| JalopyError::Mail(format!("failed to build message: {e}")))?;

            self.transport
                .send(&message)
                .map_err(|e| JalopyError::Mail(format!("SMTP send failed: {e}")))?;

            Ok(())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JalopyError;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, subject: &str, html_body: &str) -> Result<()> {
            self.sent
                .borrow_mut()
                .push((subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _subject: &str, _html_body: &str) -> Result<()> {
            Err(JalopyError::Mail("relay refused".to_string()))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn new_vehicle(make: &str) -> VehicleRecord {
        VehicleRecord::new("BOISE", "1020", make, "MODEL", "2004", "A1").with_date_added("2025-06-01")
    }

    #[test]
    fn test_empty_delta_sends_nothing() {
        let notifier = RecordingNotifier::default();

        let status = notify_new_vehicles(&notifier, &[], date()).unwrap();

        assert_eq!(status, NotificationStatus::Skipped);
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn test_non_empty_delta_sends_once() {
        let notifier = RecordingNotifier::default();
        let vehicles = vec![new_vehicle("FORD"), new_vehicle("KIA")];

        let status = notify_new_vehicles(&notifier, &vehicles, date()).unwrap();

        assert_eq!(status, NotificationStatus::Sent { count: 2 });
        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "🚗 2 New Vehicles Added - 2025-06-01");
        assert_eq!(sent[0].1.matches("<tr>").count(), 2, "one body row per vehicle");
        assert!(sent[0].1.contains("FORD"));
        assert!(sent[0].1.contains("KIA"));

        println!("✅ Notification gating test PASSED");
    }

    /// Cell text of every <tbody> row, entities decoded
    fn body_rows(html: &str) -> Vec<Vec<String>> {
        let document = scraper::Html::parse_fragment(html);
        let row_selector = scraper::Selector::parse("tbody tr").unwrap();
        let cell_selector = scraper::Selector::parse("td").unwrap();
        document
            .select(&row_selector)
            .map(|tr| tr.select(&cell_selector).map(|td| td.text().collect::<String>()).collect())
            .collect()
    }

    fn expected_cells(v: &VehicleRecord) -> Vec<String> {
        vec![
            v.yard.clone(),
            v.row.clone(),
            v.year.clone(),
            v.make.clone(),
            v.model.clone(),
            v.date_added.clone(),
        ]
    }

    #[test]
    fn test_sent_rows_match_new_vehicles_in_order() {
        let notifier = RecordingNotifier::default();
        let vehicles = vec![
            VehicleRecord::new("NAMPA", "1022", "TOYOTA", "CAMRY", "2008", "C3")
                .with_date_added("2025-06-01"),
            VehicleRecord::new("BOISE", "1020", "A&B MOTORS", "<X5>", "", "A1")
                .with_date_added("2025-06-01"),
            VehicleRecord::new("BOISE", "1020", "FORD", "F-150", "2004", "B7")
                .with_date_added("2024-12-31"),
        ];

        notify_new_vehicles(&notifier, &vehicles, date()).unwrap();

        let sent = notifier.sent.borrow();
        let rows = body_rows(&sent[0].1);
        let expected: Vec<Vec<String>> = vehicles.iter().map(expected_cells).collect();
        assert_eq!(rows, expected);

        println!("✅ Notification rows test PASSED");
    }

    #[test]
    fn test_transport_error_propagates() {
        let err = notify_new_vehicles(&FailingNotifier, &[new_vehicle("FORD")], date()).unwrap_err();
        assert!(matches!(err, JalopyError::Mail(_)));
    }

    #[test]
    fn test_table_columns_and_escaping() {
        let mut v = new_vehicle("A&B");
        v.model = "<script>".to_string();

        let table = render_table(&[v]);

        for column in TABLE_COLUMNS {
            assert!(table.contains(&format!(">{column}</th>")));
        }
        assert!(table.contains("A&amp;B"));
        assert!(table.contains("&lt;script&gt;"));
        assert!(!table.contains("<script>"));
    }

    #[test]
    fn test_body_mentions_count_and_date() {
        let body = render_body(&[new_vehicle("FORD")], date());
        assert!(body.contains("<strong>1</strong> new vehicle(s)"));
        assert!(body.contains("<strong>2025-06-01</strong>"));
        assert!(body.contains("Jalopy Inventory Bot"));
    }
}
