use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use storydesk::config::Config;
use storydesk::email::{DisabledNotifier, Notifier, SmtpNotifier};
use storydesk::sheets::GoogleSheets;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting storydesk");

    let sheets = GoogleSheets::new(&config.sheets)?;
    tracing::info!("Google Sheets client ready ({})", sheets.client_email());

    let notifier: Arc<dyn Notifier> = match config.smtp.as_ref().map(SmtpNotifier::new) {
        Some(Ok(mailer)) => {
            match mailer.verify().await {
                Ok(true) => tracing::info!("SMTP server is ready to send messages"),
                Ok(false) => tracing::warn!("SMTP server did not accept the connection test"),
                Err(e) => tracing::warn!("SMTP verification failed: {e}"),
            }
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("SMTP not available: {e}");
            Arc::new(DisabledNotifier)
        }
        None => {
            tracing::warn!("SMTP not configured, confirmation emails are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let app = storydesk::build_app(config, Arc::new(sheets), notifier);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
