// Shadow-Instructor: Service-account access tokens for Vertex AI
// Signs an RS256 JWT grant with the service-account key and exchanges it for
// an OAuth access token. Tokens are cached until shortly before expiry.

use crate::error::{CoreError, ProviderError};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account key file the core needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse the key JSON as it arrives from the environment.
    /// Surrounding single quotes (a common .env artifact) are stripped.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let mut json = raw.trim();
        if json.len() >= 2 && json.starts_with('\'') && json.ends_with('\'') {
            json = &json[1..json.len() - 1];
        }
        serde_json::from_str(json).map_err(|e| {
            CoreError::Configuration(format!("invalid GOOGLE_APPLICATION_CREDENTIALS_JSON: {}", e))
        })
    }
}

/// Supplies bearer tokens for authenticated provider calls
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http: Client) -> Result<Self, CoreError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CoreError::Configuration(format!("invalid service-account private key: {}", e)))?;
        Ok(Self {
            key,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    async fn mint(&self) -> Result<CachedToken, ProviderError> {
        let now = Utc::now().timestamp();
        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| ProviderError::new("oauth", None, format!("failed to sign grant: {}", e)))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::transport("oauth", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new("oauth", Some(status.as_u16()), body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new("oauth", None, format!("unreadable token response: {}", e)))?;

        log::debug!("Minted Vertex AI access token for {}", self.key.client_email);
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > Utc::now().timestamp() {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.mint().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_json_with_surrounding_quotes() {
        let raw = r#"'{"client_email":"svc@proj.iam.gserviceaccount.com","private_key":"pem","project_id":"proj"}'"#;
        let key = ServiceAccountKey::from_json(raw).unwrap();
        assert_eq!(key.client_email, "svc@proj.iam.gserviceaccount.com");
        assert_eq!(key.project_id.as_deref(), Some("proj"));
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_invalid_key_json_is_configuration_error() {
        let err = ServiceAccountKey::from_json("{not json").unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_invalid_private_key_is_configuration_error() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@proj.iam.gserviceaccount.com","private_key":"not a pem"}"#,
        )
        .unwrap();
        let result = ServiceAccountTokenSource::new(key, Client::new());
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PEM: &str = include_str!("../../tests/fixtures/service_account_key.pem");

    fn token_source(server: &MockServer) -> ServiceAccountTokenSource {
        let key = ServiceAccountKey {
            client_email: "svc@proj.iam.gserviceaccount.com".to_string(),
            private_key: TEST_PEM.to_string(),
            project_id: Some("proj".to_string()),
            token_uri: format!("{}/token", server.uri()),
        };
        ServiceAccountTokenSource::new(key, Client::new()).unwrap()
    }

    fn token(access_token: &str, expires_in: i64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access_token,
            "expires_in": expires_in,
            "token_type": "Bearer"
        }))
    }

    #[tokio::test]
    async fn test_token_is_minted_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("jwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(token("ya29.first", 3600))
            .expect(1)
            .mount(&server)
            .await;

        let source = token_source(&server);
        assert_eq!(source.access_token().await.unwrap(), "ya29.first");
        assert_eq!(source.access_token().await.unwrap(), "ya29.first");

        // The grant is an RS256 JWT signed with the key
        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        let assertion = body
            .split('&')
            .find_map(|pair| pair.strip_prefix("assertion="))
            .unwrap();
        let header = jsonwebtoken::decode_header(assertion).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
    }

    #[tokio::test]
    async fn test_token_inside_refresh_margin_is_reminted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(token("ya29.short", REFRESH_MARGIN_SECS / 2))
            .expect(2)
            .mount(&server)
            .await;

        let source = token_source(&server);
        source.access_token().await.unwrap();
        source.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_token_endpoint_rate_limit_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&server)
            .await;

        let err = token_source(&server).access_token().await.unwrap_err();
        assert_eq!(err.provider, "oauth");
        assert_eq!(err.status, Some(429));
    }
}
