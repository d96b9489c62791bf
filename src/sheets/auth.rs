use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::SheetsError;

pub const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// OAuth2 access tokens for a Google service account, cached until shortly before expiry.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn from_json(json: &str, http: reqwest::Client) -> Result<Self, SheetsError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| SheetsError::Config(format!("service account key: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Config(format!("private key: {e}")))?;

        Ok(Self {
            key,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Signed JWT assertion exchanged for an access token.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Config(format!("JWT encode failed: {e}")))
    }

    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached
            .as_ref()
            .filter(|t| t.expires_at > Utc::now() + Duration::seconds(60))
        {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, SheetsError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| SheetsError::Auth(format!("invalid token response: {e}")))?;

        tracing::debug!("Obtained Sheets access token for {}", self.key.client_email);

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
