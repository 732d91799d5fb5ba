use std::time::{Duration, Instant};

use reqwest::Url;
use serde_json::json;

use super::auth::{ServiceAccountKey, TokenSource};
use super::{time_left, TabularLog};
use crate::config::SheetsConfig;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Blocking Google Sheets v4 client appending rows to one tab.
///
/// Construct and call this only from blocking threads: the underlying
/// `reqwest::blocking` client refuses to run inside an async context.
pub struct GoogleSheets {
    http: reqwest::blocking::Client,
    tokens: TokenSource,
    api_base: String,
    spreadsheet_id: String,
    tab: String,
}

impl GoogleSheets {
    pub fn new(config: &SheetsConfig, timeout: Duration) -> Result<Self, String> {
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        Self::from_key(key, &config.spreadsheet_id, &config.tab, timeout)
    }

    pub fn from_key(
        key: ServiceAccountKey,
        spreadsheet_id: &str,
        tab: &str,
        timeout: Duration,
    ) -> Result<Self, String> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            tokens: TokenSource::new(key, http.clone()),
            http,
            api_base: SHEETS_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tab: tab.to_string(),
        })
    }

    /// Point the client at another API host.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn append_url(&self) -> Result<Url, String> {
        let mut url = Url::parse(&self.api_base).map_err(|e| format!("Invalid API base: {e}"))?;
        url.path_segments_mut()
            .map_err(|_| "API base cannot carry a path".to_string())?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}!A1:append", self.tab));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

impl TabularLog for GoogleSheets {
    fn append_row(&self, cells: &[String], deadline: Instant) -> Result<(), String> {
        let token = self.tokens.token(time_left(deadline)?)?;
        let url = self.append_url()?;

        let resp = self
            .http
            .post(url)
            .timeout(time_left(deadline)?)
            .bearer_auth(token)
            .json(&json!({ "values": [cells] }))
            .send()
            .map_err(|e| format!("Append request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(format!(
                "Append rejected ({status}): {}",
                body.chars().take(512).collect::<String>()
            ));
        }

        Ok(())
    }
}
