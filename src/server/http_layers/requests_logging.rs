//! Request logging middleware

use super::super::state::ServerState;
use axum::extract::State;
use axum::{
    body::{Body, Bytes},
    http::{
        header::{HeaderMap, CONTENT_LENGTH},
        Request, Response, StatusCode,
    },
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Bodies at least this long are summarized instead of echoed.
const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

fn parse_content_length(headers: &HeaderMap) -> Result<usize, &'static str> {
    headers
        .get(CONTENT_LENGTH)
        .ok_or("no content-length")?
        .to_str()
        .map_err(|_| "content-length is not text")?
        .parse::<usize>()
        .map_err(|_| "content-length is not a number")
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {} headers:", label);
    for (name, value) in headers {
        info!("    {}: {:?}", name, value);
    }
}

/// Logs `body` when it is small enough and hands back an equivalent body.
async fn log_body(label: &str, headers: &HeaderMap, body: Body) -> Result<Body, axum::Error> {
    let size = match parse_content_length(headers) {
        Ok(size) => size,
        Err(reason) => {
            info!("  {} body not logged: {}", label, reason);
            return Ok(body);
        }
    };
    if size >= MAX_LOGGABLE_BODY_LENGTH {
        info!(
            "  {} body not logged: too big ({:#})",
            label,
            byte_unit::Byte::from(size)
        );
        return Ok(body);
    }

    let bytes: Bytes = axum::body::to_bytes(body, size).await?;
    info!("  {} body:\n{}", label, String::from_utf8_lossy(&bytes));
    Ok(Body::from(bytes))
}

fn internal_error() -> Response<Body> {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();
    if level == RequestsLoggingLevel::None {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    info!(">>> {} {}", method, uri);

    let (parts, body) = request.into_parts();
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Request", &parts.headers);
    }
    let body = if level >= RequestsLoggingLevel::Body {
        match log_body("Request", &parts.headers, body).await {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to read request body of {} {}: {:?}", method, uri, err);
                return internal_error();
            }
        }
    } else {
        body
    };

    let response = next.run(Request::from_parts(parts, body)).await;

    let (parts, body) = response.into_parts();
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Response", &parts.headers);
    }
    let body = if level >= RequestsLoggingLevel::Body {
        match log_body("Response", &parts.headers, body).await {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to read response body of {} {}: {:?}", method, uri, err);
                return internal_error();
            }
        }
    } else {
        body
    };

    info!(
        "<<< {} {} {} ({}ms)",
        parts.status.as_u16(),
        method,
        uri.path(),
        start.elapsed().as_millis()
    );
    Response::from_parts(parts, body)
}
