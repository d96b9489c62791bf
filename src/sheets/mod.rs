pub mod auth;
pub mod client;

use async_trait::async_trait;

pub use client::GoogleSheets;

/// Durable store that every accepted submission is appended to.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError>;
}

#[derive(Debug)]
pub enum SheetsError {
    /// Bad service account key or API base URL.
    Config(String),
    /// Token exchange with Google failed.
    Auth(String),
    Http(reqwest::Error),
    Api { status: u16, body: String },
    Decode(String),
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::Config(msg) => write!(f, "Invalid Sheets configuration: {msg}"),
            SheetsError::Auth(msg) => write!(f, "Token exchange failed: {msg}"),
            SheetsError::Http(err) => write!(f, "Sheets request failed: {err}"),
            SheetsError::Api { status, body } => {
                write!(f, "Sheets API returned {status}: {body}")
            }
            SheetsError::Decode(msg) => write!(f, "Unexpected Sheets response: {msg}"),
        }
    }
}

impl std::error::Error for SheetsError {}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        SheetsError::Http(err)
    }
}
