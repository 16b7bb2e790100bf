//! Google Sheets backup sink.
//!
//! Without a configured spreadsheet id each export creates a new spreadsheet
//! titled after the backup, then appends the table to its `Requests` sheet.
//! With an id, the table is appended to that spreadsheet's `Requests` sheet.

use pharmadesk_core::backup::SinkFuture;
use pharmadesk_core::{BackupSink, BackupTable, SinkError, SinkReceipt};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://sheets.googleapis.com";

/// Sheet (tab) the backup rows are written to.
pub const SHEET_NAME: &str = "Requests";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

/// Sheets API client implementing [`BackupSink`].
#[derive(Clone)]
pub struct GoogleSheetsSink {
    client: Client,
    access_token: Option<String>,
    api_url: String,
    spreadsheet_id: Option<String>,
}

impl GoogleSheetsSink {
    /// Create a sink. A missing or empty token makes every export fail with
    /// [`SinkError::NotConfigured`].
    #[must_use]
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.filter(|token| !token.trim().is_empty()),
            api_url: DEFAULT_API_URL.to_string(),
            spreadsheet_id: None,
        }
    }

    /// Point the sink at a different base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Append to an existing spreadsheet instead of creating one per export.
    #[must_use]
    pub fn with_spreadsheet_id(mut self, spreadsheet_id: Option<String>) -> Self {
        self.spreadsheet_id = spreadsheet_id.filter(|id| !id.trim().is_empty());
        self
    }

    async fn create_spreadsheet(&self, token: &str, title: &str) -> Result<String, SinkError> {
        let response = self
            .client
            .post(format!("{}/v4/spreadsheets", self.api_url))
            .bearer_auth(token)
            .json(&json!({
                "properties": { "title": title },
                "sheets": [{ "properties": { "title": SHEET_NAME } }],
            }))
            .send()
            .await
            .map_err(|e| SinkError::RequestFailed(e.to_string()))?;

        let response = check(response).await?;
        response
            .json::<CreatedSpreadsheet>()
            .await
            .map(|created| created.spreadsheet_id)
            .map_err(|e| SinkError::ResponseParseFailed(e.to_string()))
    }

    async fn append(&self, token: &str, spreadsheet_id: &str, table: &BackupTable) -> Result<(), SinkError> {
        let range = format!("{SHEET_NAME}!A1");
        let response = self
            .client
            .post(format!(
                "{}/v4/spreadsheets/{spreadsheet_id}/values/{range}:append",
                self.api_url
            ))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": table.values(),
            }))
            .send()
            .await
            .map_err(|e| SinkError::RequestFailed(e.to_string()))?;

        check(response).await.map(|_| ())
    }

    async fn write(&self, table: BackupTable) -> Result<SinkReceipt, SinkError> {
        let token = self.access_token.as_deref().ok_or_else(|| {
            SinkError::NotConfigured("GOOGLE_SHEETS_ACCESS_TOKEN is not set".to_string())
        })?;

        let spreadsheet_id = match &self.spreadsheet_id {
            Some(id) => id.clone(),
            None => self.create_spreadsheet(token, &table.title).await?,
        };

        self.append(token, &spreadsheet_id, &table).await?;

        tracing::debug!(%spreadsheet_id, rows = table.rows.len(), "Backup table appended");
        Ok(SinkReceipt { spreadsheet_id })
    }
}

async fn check(response: Response) -> Result<Response, SinkError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(SinkError::NotConfigured(
            "spreadsheet API rejected the access token".to_string(),
        )),
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(SinkError::Rejected {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}

impl std::fmt::Debug for GoogleSheetsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsSink")
            .field("api_url", &self.api_url)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("configured", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl BackupSink for GoogleSheetsSink {
    fn export(&self, table: BackupTable) -> SinkFuture<'_> {
        Box::pin(self.write(table))
    }
}
