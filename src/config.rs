use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub sheets: SheetsConfig,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Raw JSON of the Google service account key.
    pub service_account_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    pub tls_mode: TlsMode,
    pub staff_address: String,
    pub org_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TlsMode {
    StartTls,
    Tls,
    None,
}

impl TlsMode {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "starttls" => Ok(TlsMode::StartTls),
            "tls" => Ok(TlsMode::Tls),
            "none" => Ok(TlsMode::None),
            other => Err(format!("Invalid STORYDESK_SMTP_TLS: {other}")),
        }
    }
}

pub const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4";

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("STORYDESK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid STORYDESK_HOST: {e}"))?;

        let port: u16 = env_or("STORYDESK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid STORYDESK_PORT: {e}"))?;

        let max_body_size: usize = env_or("STORYDESK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid STORYDESK_MAX_BODY_SIZE: {e}"))?;

        let cors_origins: Vec<String> = env_or("STORYDESK_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let log_level = env_or("STORYDESK_LOG_LEVEL", "info");

        let sheets = SheetsConfig::from_env()?;

        let smtp = match (
            std::env::var("STORYDESK_SMTP_USER").ok(),
            std::env::var("STORYDESK_SMTP_PASS").ok(),
            std::env::var("STORYDESK_SMTP_FROM").ok(),
        ) {
            (Some(user), Some(pass), Some(from)) => {
                let port = env_or("STORYDESK_SMTP_PORT", "587")
                    .parse()
                    .map_err(|e| format!("Invalid STORYDESK_SMTP_PORT: {e}"))?;
                let tls_mode = TlsMode::parse(&env_or("STORYDESK_SMTP_TLS", "starttls"))?;
                // Staff notifications go to the sending mailbox unless overridden
                let staff_address = env_or("STORYDESK_STAFF_EMAIL", &user);

                Some(SmtpConfig {
                    host: env_or("STORYDESK_SMTP_HOST", "smtp.gmail.com"),
                    port,
                    user,
                    pass,
                    from,
                    tls_mode,
                    staff_address,
                    org_name: env_or("STORYDESK_ORG_NAME", "Laberge Casting"),
                })
            }
            _ => None,
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            cors_origins,
            log_level,
            sheets,
            smtp,
        })
    }
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(SheetsConfig {
            spreadsheet_id: env_required("GOOGLE_SHEET_ID")?,
            service_account_key: env_required("GOOGLE_SERVICE_ACCOUNT_KEY")?,
            api_base: env_or("STORYDESK_SHEETS_API", DEFAULT_SHEETS_API),
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
