use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;

use crate::config::SheetsConfig;
use crate::submission::record::HEADERS;

use super::auth::ServiceAccountAuth;
use super::{RecordStore, SheetsError};

const FALLBACK_SHEET: &str = "Sheet1";

#[derive(Deserialize)]
struct SpreadsheetInfo {
    #[serde(default)]
    sheets: Vec<SheetInfo>,
}

#[derive(Deserialize)]
struct SheetInfo {
    properties: Option<SheetProperties>,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: Option<String>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets client writing to the first sheet of one spreadsheet.
pub struct GoogleSheets {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    spreadsheet_id: String,
    api_base: Url,
}

impl GoogleSheets {
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| SheetsError::Config(format!("api base: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(SheetsError::Config(format!(
                "api base: {} is not a base URL",
                config.api_base
            )));
        }

        let http = reqwest::Client::new();
        let auth = ServiceAccountAuth::from_json(&config.service_account_key, http.clone())?;

        Ok(Self {
            http,
            auth,
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_base,
        })
    }

    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    /// Title of the first sheet, or `Sheet1` if the spreadsheet reports none.
    pub async fn first_sheet_title(&self) -> Result<String, SheetsError> {
        let mut url = self.url(&[]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let info: SpreadsheetInfo = self
            .send(self.http.get(url))
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))?;

        Ok(info
            .sheets
            .into_iter()
            .next()
            .and_then(|s| s.properties)
            .and_then(|p| p.title)
            .unwrap_or_else(|| FALLBACK_SHEET.to_string()))
    }

    /// Write the column titles into the first row.
    pub async fn write_headers(&self) -> Result<String, SheetsError> {
        let title = self.first_sheet_title().await?;
        let range = a1_range(&title, "A1:H1");

        let mut url = self.url(&["values", &range]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        self.send(self.http.put(url).json(&json!({
            "range": range,
            "values": [HEADERS],
        })))
        .await?;

        tracing::info!("Wrote header row to sheet {title}");
        Ok(title)
    }

    /// Every stored row, header included.
    pub async fn list_rows(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let title = self.first_sheet_title().await?;
        let url = self.url(&["values", &a1_range(&title, "A:H")]);

        let range: ValueRange = self
            .send(self.http.get(url))
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))?;

        Ok(range.values)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("spreadsheets")
                .push(&self.spreadsheet_id)
                .extend(segments);
        }
        url
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, SheetsError> {
        let token = self.auth.access_token().await?;
        let resp = req.bearer_auth(token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }
}

#[async_trait]
impl RecordStore for GoogleSheets {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        let title = self.first_sheet_title().await?;
        let range = a1_range(&title, "A:H");

        let mut url = self.url(&["values", &format!("{range}:append")]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        self.send(self.http.post(url).json(&json!({ "values": [row] })))
            .await?;

        tracing::info!("Appended row to sheet {title}");
        Ok(())
    }
}

/// A1 notation with the sheet title quoted, e.g. `'My Sheet'!A:H`.
fn a1_range(title: &str, cells: &str) -> String {
    format!("'{}'!{cells}", title.replace('\'', "''"))
}
