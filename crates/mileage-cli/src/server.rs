//! HTTP endpoint for the OAuth token exchange.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};

use mileage_core::oauth::{TokenExchangeError, TokenExchanger};

use crate::constants::EXCHANGE_TOKEN_PATH;

/// Accept connections until the process is interrupted.
pub async fn run(listener: TcpListener, exchanger: Arc<TokenExchanger>) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!("Connection from {}", peer);
                        let exchanger = Arc::clone(&exchanger);
                        tokio::spawn(async move {
                            handle_connection(stream, exchanger).await;
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, exchanger: Arc<TokenExchanger>) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| handle_request(req, Arc::clone(&exchanger)));

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        error!("HTTP connection error: {}", err);
    }
}

async fn handle_request(
    req: Request<Incoming>,
    exchanger: Arc<TokenExchanger>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    debug!("{} {}", method, path);

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("Failed to read request body: {}", e);
            let err = TokenExchangeError::unhandled();
            return Ok(json_response(err.status, &err.body));
        }
    };

    let (status, value) = route(&method, &path, &body, &exchanger).await;
    info!("{} {} -> {}", method, path, status);
    Ok(json_response(status, &value))
}

/// Dispatch a request to its handler.
pub async fn route(
    method: &Method,
    path: &str,
    body: &[u8],
    exchanger: &TokenExchanger,
) -> (u16, Value) {
    match (method, path) {
        (&Method::POST, EXCHANGE_TOKEN_PATH) => exchanger.respond(body).await,
        (_, EXCHANGE_TOKEN_PATH) => (405, json!({ "error": "Method Not Allowed" })),
        _ => (404, json!({ "error": "Not Found" })),
    }
}

fn json_response(status: u16, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
