mod support;

use mileage_core::oauth::{OAuthClientConfig, TokenExchanger};

use support::CannedServer;

const REQUEST: &[u8] =
    br#"{"code":"4/0AbCdEfGhIjKlMnOp","clientRedirectUri":"http://localhost:3000"}"#;

fn exchanger(base_url: &str) -> TokenExchanger {
    let config = OAuthClientConfig::new(Some("client-id".into()), Some("client-secret".into()))
        .with_token_url(format!("{}/token", base_url));
    TokenExchanger::new(config).expect("exchanger should build")
}

#[tokio::test]
async fn test_successful_exchange_maps_to_camel_case() {
    let server = CannedServer::start(
        200,
        r#"{"access_token":"ya29.token","refresh_token":"1//refresh","expires_in":3599,"scope":"https://www.googleapis.com/auth/calendar","token_type":"Bearer"}"#,
    )
    .await;

    let (status, body) = exchanger(&server.base_url).respond(REQUEST).await;
    assert_eq!(status, 200);
    assert_eq!(body["accessToken"], "ya29.token");
    assert_eq!(body["refreshToken"], "1//refresh");
    assert_eq!(body["expiresIn"], 3599);
    assert_eq!(body["tokenType"], "Bearer");

    let request = server.request().await;
    assert!(request.starts_with("POST /token"));
    assert!(request.contains("grant_type=authorization_code"));
    assert!(request.contains("client_id=client-id"));
    assert!(request.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000"));
}

#[tokio::test]
async fn test_upstream_rejection_is_mirrored() {
    let server = CannedServer::start(
        400,
        r#"{"error":"invalid_grant","error_description":"Bad Request"}"#,
    )
    .await;

    let (status, body) = exchanger(&server.base_url).respond(REQUEST).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["details"]["googleResponse"]["error"], "invalid_grant");
    assert_eq!(body["details"]["clientSentRedirectUri"], "http://localhost:3000");
}

#[tokio::test]
async fn test_upstream_error_without_description() {
    let server = CannedServer::start(401, r#"{"error":"invalid_client"}"#).await;

    let (status, body) = exchanger(&server.base_url).respond(REQUEST).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn test_upstream_error_with_empty_body_object() {
    let server = CannedServer::start(503, "{}").await;

    let (status, body) = exchanger(&server.base_url).respond(REQUEST).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"], "Failed to exchange token with Google (503)");
}
