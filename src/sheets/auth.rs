use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read service account key {}: {e}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| format!("Invalid service account key: {e}"))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Build the signed RS256 assertion exchanged for an access token.
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, String> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: SHEETS_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| format!("Invalid service account private key: {e}"))?;

    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| format!("JWT encode failed: {e}"))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Caches one access token and refreshes it under a lock, so concurrent
/// appends share a single refresh.
pub struct TokenSource {
    key: ServiceAccountKey,
    http: reqwest::blocking::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::blocking::Client) -> Self {
        Self {
            key,
            http,
            cached: Mutex::new(None),
        }
    }

    /// A valid access token, refreshed if needed. A refresh request is
    /// bounded by `timeout`.
    pub fn token(&self, timeout: std::time::Duration) -> Result<String, String> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| "Token cache lock poisoned".to_string())?;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch(timeout)?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn fetch(&self, timeout: std::time::Duration) -> Result<AccessToken, String> {
        let assertion = sign_assertion(&self.key, Utc::now())?;

        let resp = self
            .http
            .post(&self.key.token_uri)
            .timeout(timeout)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .map_err(|e| format!("Token request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(format!(
                "Token exchange rejected ({status}): {}",
                body.chars().take(512).collect::<String>()
            ));
        }

        let token: TokenResponse = resp
            .json()
            .map_err(|e| format!("Invalid token response: {e}"))?;

        tracing::debug!("Refreshed spreadsheet access token for {}", self.key.client_email);

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}
