//! OAuth authorization-code exchange for calendar linking.
//!
//! The HTTP transport lives in the CLI; this module owns the request
//! validation, the upstream call and the response mapping. Every outcome is
//! an HTTP status plus a JSON body.

use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Default Google token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const CODE_LOG_PREFIX: usize = 15;

/// Body accepted by the exchange endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub client_redirect_uri: Option<String>,
}

/// Tokens returned to the caller on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeResponse {
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamTokens {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl From<UpstreamTokens> for TokenExchangeResponse {
    fn from(tokens: UpstreamTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            scope: tokens.scope,
            token_type: tokens.token_type,
        }
    }
}

/// A failed exchange, ready to be sent as an HTTP response.
#[derive(Debug, Clone, Error)]
#[error("token exchange failed with status {status}")]
pub struct TokenExchangeError {
    pub status: u16,
    pub body: Value,
}

impl TokenExchangeError {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 500 response for anything unexpected.
    pub fn unhandled() -> Self {
        Self::new(
            500,
            json!({
                "error": "Critical Internal Server Error",
                "message": "An unexpected error occurred on the server during token exchange. Please check server logs.",
                "errorCode": "API_UNHANDLED_EXCEPTION",
            }),
        )
    }
}

/// OAuth client credentials and endpoint.
#[derive(Debug)]
pub struct OAuthClientConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub token_url: String,
    pub timeout: Duration,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl OAuthClientConfig {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.filter(|id| !id.trim().is_empty()),
            client_secret: client_secret
                .filter(|secret| !secret.trim().is_empty())
                .map(SecretString::from),
            ..Self::default()
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Exchanges authorization codes for tokens.
pub struct TokenExchanger {
    client: Client,
    config: OAuthClientConfig,
}

impl TokenExchanger {
    pub fn new(config: OAuthClientConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| crate::MileageError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OAuthClientConfig {
        &self.config
    }

    /// Handle a raw request body, returning the status and JSON to send.
    pub async fn respond(&self, body: &[u8]) -> (u16, Value) {
        let request: TokenExchangeRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                error!("Token exchange request body is not valid JSON: {}", e);
                let err = TokenExchangeError::unhandled();
                return (err.status, err.body);
            }
        };

        match self.exchange(&request).await {
            Ok(tokens) => match serde_json::to_value(&tokens) {
                Ok(value) => (200, value),
                Err(e) => {
                    error!("Failed to serialize token response: {}", e);
                    let err = TokenExchangeError::unhandled();
                    (err.status, err.body)
                }
            },
            Err(err) => (err.status, err.body),
        }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// - 400 if `code` or `clientRedirectUri` is missing
    /// - 500 if client credentials are not configured
    /// - the upstream status if the token endpoint rejects the exchange
    /// - 500 `API_UNHANDLED_EXCEPTION` on transport or parse failures
    pub async fn exchange(
        &self,
        request: &TokenExchangeRequest,
    ) -> Result<TokenExchangeResponse, TokenExchangeError> {
        let code = request.code.as_deref().filter(|c| !c.is_empty());
        let redirect_uri = request
            .client_redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty());

        debug!(
            "Received auth code: {}",
            code.map(code_prefix).unwrap_or_else(|| "MISSING_CODE".to_string())
        );

        let code = code.ok_or_else(|| {
            TokenExchangeError::new(
                400,
                json!({
                    "error": "Authorization code is missing",
                    "details": { "message": "Authorization code not found in the request payload." },
                }),
            )
        })?;
        let redirect_uri = redirect_uri.ok_or_else(|| {
            TokenExchangeError::new(
                400,
                json!({
                    "error": "clientRedirectUri is missing from request body",
                    "details": { "message": "clientRedirectUri not found in the request payload." },
                }),
            )
        })?;

        let (client_id, client_secret) =
            match (&self.config.client_id, &self.config.client_secret) {
                (Some(id), Some(secret)) => (id.as_str(), secret.expose_secret()),
                (id, secret) => {
                    error!("OAuth client id or secret is not configured");
                    return Err(TokenExchangeError::new(
                        500,
                        json!({
                            "error": "Server configuration error for Google OAuth (ID or Secret missing)",
                            "details": {
                                "message": "One or both Google OAuth credentials (Client ID, Client Secret) are missing. Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET or the [oauth] config section.",
                                "clientIdEnvVarPresent": id.is_some(),
                                "clientSecretEnvVarPresent": secret.is_some(),
                            },
                        }),
                    ));
                }
            };

        debug!(
            "Posting to token endpoint: code={}&client_id={}&redirect_uri={}&grant_type=authorization_code",
            code_prefix(code),
            client_id,
            redirect_uri
        );

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Token endpoint unreachable: {}", e);
                TokenExchangeError::unhandled()
            })?;

        let status = response.status().as_u16();
        let body: Value = response.json().await.map_err(|e| {
            error!("Token endpoint returned an unreadable body: {}", e);
            TokenExchangeError::unhandled()
        })?;

        if !(200..300).contains(&status) {
            error!("Token exchange rejected with status {}", status);
            let message = body
                .get("error_description")
                .and_then(Value::as_str)
                .or_else(|| body.get("error").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to exchange token with Google ({})", status));
            return Err(TokenExchangeError::new(
                status,
                json!({
                    "error": message,
                    "details": {
                        "googleResponse": body,
                        "requestParams": {
                            "code_present": true,
                            "client_id_present": true,
                            "redirect_uri_used": redirect_uri,
                            "grant_type": "authorization_code",
                        },
                        "message": "Error during token exchange with Google. Check redirect_uri matching and client credentials.",
                        "clientSentRedirectUri": redirect_uri,
                    },
                }),
            ));
        }

        let tokens: UpstreamTokens = serde_json::from_value(body).map_err(|e| {
            error!("Token endpoint returned an unexpected body: {}", e);
            TokenExchangeError::unhandled()
        })?;
        info!(
            "Token exchange successful (scope: {})",
            tokens.scope.as_deref().unwrap_or("-")
        );
        Ok(tokens.into())
    }
}

fn code_prefix(code: &str) -> String {
    let prefix: String = code.chars().take(CODE_LOG_PREFIX).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchanger(id: Option<&str>, secret: Option<&str>) -> TokenExchanger {
        let config = OAuthClientConfig::new(id.map(String::from), secret.map(String::from))
            .with_token_url("http://127.0.0.1:1/token");
        TokenExchanger::new(config).unwrap()
    }

    #[test]
    fn test_request_is_camel_case() {
        let request: TokenExchangeRequest =
            serde_json::from_str(r#"{"code":"abc","clientRedirectUri":"http://localhost"}"#).unwrap();
        assert_eq!(request.code.as_deref(), Some("abc"));
        assert_eq!(request.client_redirect_uri.as_deref(), Some("http://localhost"));
    }

    #[test]
    fn test_response_omits_missing_refresh_token() {
        let response = TokenExchangeResponse {
            access_token: Some("at".into()),
            refresh_token: None,
            expires_in: Some(3599),
            scope: Some("calendar".into()),
            token_type: Some("Bearer".into()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["accessToken"], "at");
        assert_eq!(value["expiresIn"], 3599);
        assert!(value.get("refreshToken").is_none());
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let config = OAuthClientConfig::new(Some("  ".into()), Some("secret".into()));
        assert!(config.client_id.is_none());
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_code_prefix_truncates() {
        assert_eq!(code_prefix("4/0AbCdEfGhIjKlMnOpQrStUv"), "4/0AbCdEfGhIjKl...");
        assert_eq!(code_prefix("short"), "short...");
    }

    #[tokio::test]
    async fn test_missing_code_is_bad_request() {
        let err = exchanger(Some("id"), Some("secret"))
            .exchange(&TokenExchangeRequest {
                code: None,
                client_redirect_uri: Some("http://localhost".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.body["error"], "Authorization code is missing");
    }

    #[tokio::test]
    async fn test_missing_redirect_is_bad_request() {
        let err = exchanger(Some("id"), Some("secret"))
            .exchange(&TokenExchangeRequest {
                code: Some("abc".into()),
                client_redirect_uri: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.body["error"], "clientRedirectUri is missing from request body");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_server_error() {
        let err = exchanger(Some("id"), None)
            .exchange(&TokenExchangeRequest {
                code: Some("abc".into()),
                client_redirect_uri: Some("http://localhost".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, 500);
        assert_eq!(err.body["details"]["clientIdEnvVarPresent"], true);
        assert_eq!(err.body["details"]["clientSecretEnvVarPresent"], false);
    }

    #[tokio::test]
    async fn test_invalid_json_is_unhandled() {
        let (status, body) = exchanger(Some("id"), Some("secret")).respond(b"not json").await;
        assert_eq!(status, 500);
        assert_eq!(body["errorCode"], "API_UNHANDLED_EXCEPTION");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unhandled() {
        let (status, body) = exchanger(Some("id"), Some("secret"))
            .respond(br#"{"code":"abc","clientRedirectUri":"http://localhost"}"#)
            .await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Critical Internal Server Error");
    }
}
