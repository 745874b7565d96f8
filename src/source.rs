// 🌐 HTTP Inventory Source - the yard website's drill-down endpoints
// Two JSON lookups (makes, models) and one HTML listing per make/model

use crate::collector::{InventorySource, ListingRow, Yard};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use scraper::{Html, Selector};
use serde::Deserialize;

/// Entry of `/Home/GetMakes`
#[derive(Debug, Deserialize)]
struct MakeEntry {
    #[serde(rename = "makeName")]
    make_name: String,
}

/// Entry of `/Home/GetModels`
#[derive(Debug, Deserialize)]
struct ModelEntry {
    model: String,
}

pub struct HttpInventorySource {
    client: Client,
    base_url: String,
}

impl HttpInventorySource {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpInventorySource {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<reqwest::blocking::Response> {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .post(&url)
            .form(form)
            .send()
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {url} returned an error status"))
    }
}

impl InventorySource for HttpInventorySource {
    fn makes(&self, yard: &Yard) -> Result<Vec<String>> {
        let entries: Vec<MakeEntry> = self
            .post_form("/Home/GetMakes", &[("yardId", yard.id.as_str())])?
            .json()
            .context("Failed to decode makes")?;

        Ok(entries.into_iter().map(|e| e.make_name).collect())
    }

    fn models(&self, yard: &Yard, make: &str) -> Result<Vec<String>> {
        let entries: Vec<ModelEntry> = self
            .post_form(
                "/Home/GetModels",
                &[("yardId", yard.id.as_str()), ("makeName", make)],
            )?
            .json()
            .with_context(|| format!("Failed to decode models for {make}"))?;

        Ok(entries.into_iter().map(|e| e.model).collect())
    }

    fn listing(&self, yard: &Yard, make: &str, model: &str) -> Result<Vec<ListingRow>> {
        let body = self
            .post_form(
                "/",
                &[
                    ("YardId", yard.id.as_str()),
                    ("VehicleMake", make),
                    ("VehicleModel", model),
                ],
            )?
            .text()
            .context("Failed to read listing body")?;

        parse_listing(&body)
    }
}

/// Extract (year, row) pairs from a listing page.
///
/// The first `table.table` row is the header. Rows without exactly four
/// cells are skipped; cell 0 is the year and cell 3 the row label.
pub fn parse_listing(html: &str) -> Result<Vec<ListingRow>> {
    let document = Html::parse_document(html);
    let row_selector =
        Selector::parse("table.table tr").map_err(|e| anyhow!("Invalid row selector: {e}"))?;
    let cell_selector = Selector::parse("td").map_err(|e| anyhow!("Invalid cell selector: {e}"))?;

    let rows = document
        .select(&row_selector)
        .skip(1)
        .filter_map(|tr| {
            let cells: Vec<String> = tr
                .select(&cell_selector)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();

            if cells.len() != 4 {
                return None;
            }
            Some(ListingRow {
                year: cells[0].clone(),
                row: cells[3].clone(),
            })
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_rows() {
        let html = r#"
            <html><body>
            <table class="table">
              <tr><th>Year</th><th>Make</th><th>Model</th><th>Row</th></tr>
              <tr><td> 2004 </td><td>FORD</td><td>F-150</td><td> A12 </td></tr>
              <tr><td>1999</td><td>FORD</td><td>F-150</td><td>B7</td></tr>
              <tr><td colspan="4">No more vehicles</td></tr>
            </table>
            </body></html>
        "#;

        let rows = parse_listing(html).unwrap();

        assert_eq!(
            rows,
            vec![
                ListingRow { year: "2004".to_string(), row: "A12".to_string() },
                ListingRow { year: "1999".to_string(), row: "B7".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_listing_without_table() {
        let rows = parse_listing("<html><body><p>Nothing here</p></body></html>").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_listing_ignores_other_tables() {
        let html = r#"
            <table class="layout"><tr><td>a</td><td>b</td><td>c</td><td>d</td></tr></table>
            <table class="table">
              <tr><th>Year</th><th>Make</th><th>Model</th><th>Row</th></tr>
              <tr><td>2010</td><td>KIA</td><td>RIO</td><td>9</td></tr>
            </table>
        "#;

        let rows = parse_listing(html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, "2010");
        assert_eq!(rows[0].row, "9");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let source = HttpInventorySource::new("https://example.test/", "Mozilla/5.0").unwrap();
        assert_eq!(source.base_url, "https://example.test");
    }
}
