//! Plain-text responses produced by the router itself.
//!
//! # Responsibilities
//! - Generic 404 when no route and no not-found handler matched
//! - Generic 400 when computing a match faulted
//!
//! # Design Decisions
//! - Bodies are `text/plain` with `X-Content-Type-Options: nosniff`
//! - Body ends with a newline
//! - Handlers own every other response

use axum::{
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};

fn plain(status: StatusCode, body: String) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// `404 Not Found : <uri>`.
pub fn not_found(uri: &Uri) -> Response {
    plain(StatusCode::NOT_FOUND, format!("404 Not Found : {}\n", uri))
}

/// `400 Bad Request : <message>`.
pub fn bad_request(message: &str) -> Response {
    plain(
        StatusCode::BAD_REQUEST,
        format!("400 Bad Request : {}\n", message),
    )
}
