//! PSK-based authentication for the mock backend.
//!
//! Implements constant-time comparison to mitigate timing attacks.

use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse, response::Response};
use subtle::ConstantTimeEq;

use super::errors::AppError;
use crate::client::API_KEY_HEADER;

/// Reject requests whose `x-api-key` (or bearer token) does not match `expected_psk`.
pub async fn psk_auth_layer(expected_psk: Option<String>, request: Request, next: Next) -> Response {
    // No PSK configured: open access
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let headers = request.headers();
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
        .map(str::to_string);

    match provided {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid API key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing API key".to_string()).into_response(),
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
