//! Service-account OAuth: a self-signed RS256 JWT exchanged for a bearer
//! token (RFC 7523 JWT bearer grant). Tokens are cached until shortly
//! before they expire.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64URL};
use chrono::{DateTime, Duration, Utc};
use rollcall_core::error::{Result, RollcallError};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::Deserialize;
use sha2::Sha256;
use tokio::sync::Mutex;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the cached token expires.
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// The fields of a service-account key file that signing needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Err(RollcallError::Config(
                "Service account key is not set (SERVICE_ACC_SECRET)".into(),
            ));
        }
        serde_json::from_str(json)
            .map_err(|e| RollcallError::Config(format!("Invalid service account key: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Shared bearer-token source for every Google API client.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    signing_key: SigningKey<Sha256>,
    scopes: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, scopes: &[&str]) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(&key.private_key)
            .map_err(|e| RollcallError::Config(format!("Invalid service account private key: {e}")))?;
        Ok(Self {
            key,
            signing_key: SigningKey::<Sha256>::new(private_key),
            scopes: scopes.join(" "),
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    /// Signed JWT assertion for the token endpoint.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let header = serde_json::json!({"alg": "RS256", "typ": "JWT"});
        let claims = serde_json::json!({
            "iss": self.key.client_email,
            "scope": self.scopes,
            "aud": self.key.token_uri,
            "iat": now.timestamp(),
            "exp": now.timestamp() + TOKEN_LIFETIME_SECS,
        });
        let signing_input = format!(
            "{}.{}",
            B64URL.encode(serde_json::to_vec(&header)?),
            B64URL.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self
            .signing_key
            .try_sign(signing_input.as_bytes())
            .map_err(|e| RollcallError::Auth(format!("JWT signing failed: {e}")))?;
        Ok(format!("{signing_input}.{}", B64URL.encode(signature.to_bytes())))
    }

    /// A valid bearer token, fetching a new one when the cache is stale.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let assertion = self.assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| RollcallError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RollcallError::Auth(format!("Token endpoint error {status}: {body}")));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| RollcallError::Auth(format!("Invalid token response: {e}")))?;
        let lifetime = body.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        tracing::debug!("Fetched Google access token for {} ({lifetime}s)", self.key.client_email);

        *cached = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: now + Duration::seconds(lifetime),
        });
        Ok(body.access_token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};
    use rsa::signature::Verifier;

    pub(crate) fn test_key() -> (ServiceAccountKey, RsaPrivateKey) {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 1024).unwrap();
        let pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap();
        let key = ServiceAccountKey {
            client_email: "bot@project.iam.gserviceaccount.com".into(),
            private_key: pem.to_string(),
            token_uri: default_token_uri(),
        };
        (key, private_key)
    }

    #[test]
    fn test_key_from_json_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"type":"service_account","client_email":"a@b.c","private_key":"pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(ServiceAccountKey::from_json("").is_err());
        assert!(ServiceAccountKey::from_json("{}").is_err());
    }

    #[test]
    fn test_bad_private_key_rejected() {
        let key = ServiceAccountKey {
            client_email: "a@b.c".into(),
            private_key: "not a pem".into(),
            token_uri: default_token_uri(),
        };
        assert!(ServiceAccountAuth::new(key, &[SHEETS_SCOPE]).is_err());
    }

    #[test]
    fn test_assertion_is_signed_jwt() {
        let (key, private_key) = test_key();
        let auth = ServiceAccountAuth::new(key, &[SHEETS_SCOPE, CALENDAR_SCOPE]).unwrap();
        let now = DateTime::<Utc>::from_timestamp(1_725_960_000, 0).unwrap();
        let jwt = auth.assertion(now).unwrap();

        let parts: Vec<&str> = jwt.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims: serde_json::Value =
            serde_json::from_slice(&B64URL.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["iss"], "bot@project.iam.gserviceaccount.com");
        assert_eq!(claims["scope"], format!("{SHEETS_SCOPE} {CALENDAR_SCOPE}"));
        assert_eq!(claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(), 3600);

        let verifying_key = VerifyingKey::<Sha256>::new(private_key.to_public_key());
        let signature = Signature::try_from(B64URL.decode(parts[2]).unwrap().as_slice()).unwrap();
        let signing_input = format!("{}.{}", parts[0], parts[1]);
        assert!(verifying_key.verify(signing_input.as_bytes(), &signature).is_ok());
    }
}
