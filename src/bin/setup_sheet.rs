//! Prepare the submissions spreadsheet.
//!
//! `setup-sheet` writes the column titles into the first row of the first sheet.
//! `setup-sheet --list` prints every stored row as one JSON array per line.

use tracing_subscriber::EnvFilter;

use storydesk::config::SheetsConfig;
use storydesk::sheets::GoogleSheets;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SheetsConfig::from_env()?;
    let sheets = GoogleSheets::new(&config)?;

    match std::env::args().nth(1).as_deref() {
        None => {
            let title = sheets.write_headers().await?;
            tracing::info!("Sheet {title} is ready to receive submissions");
        }
        Some("--list") => {
            for row in sheets.list_rows().await? {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
        Some(other) => {
            return Err(format!("Unknown argument: {other} (expected --list)").into());
        }
    }

    Ok(())
}
