//! Google Sheets values API writer.

use async_trait::async_trait;
use reqwest::Url;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::traits::SheetWriter;
use std::sync::Arc;

use crate::auth::ServiceAccountAuth;

/// Writes checkbox rows into one spreadsheet.
pub struct SheetsClient {
    auth: Arc<ServiceAccountAuth>,
    api_base: String,
    spreadsheet_key: String,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(auth: Arc<ServiceAccountAuth>, api_base: &str, spreadsheet_key: &str) -> Self {
        Self {
            auth,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_key: spreadsheet_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// `PUT` target for a values update of `range`.
    pub fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| RollcallError::Config(format!("Invalid Sheets API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RollcallError::Config("Sheets API base cannot be a base URL".into()))?
            .extend(["spreadsheets", self.spreadsheet_key.as_str(), "values", range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }
}

/// Request body for a single-row update.
pub fn row_body(range: &str, values: &[bool]) -> serde_json::Value {
    serde_json::json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": [values],
    })
}

#[async_trait]
impl SheetWriter for SheetsClient {
    async fn write_row(&self, range: &str, values: &[bool]) -> Result<()> {
        if self.spreadsheet_key.is_empty() {
            return Err(RollcallError::Sheet("sheet.spreadsheet_key is not configured".into()));
        }
        let url = self.values_url(range)?;
        let token = self.auth.access_token().await?;

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&row_body(range, values))
            .timeout(std::time::Duration::from_secs(15))
            .send()
            .await
            .map_err(|e| RollcallError::Sheet(format!("Sheets request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RollcallError::Sheet(format!(
                "Sheets API error {status}: {error_text}"
            )));
        }

        tracing::info!("[sheet] wrote {range}");
        Ok(())
    }
}
