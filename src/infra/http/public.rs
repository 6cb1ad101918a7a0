use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderValue, Method, StatusCode, Uri,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use super::ServerState;
use crate::application::error::ErrorReport;

const NOT_FOUND_PAGE: &str = "404.html";

/// Serve a file from the output directory.
///
/// Directory paths resolve to `index.html`; unknown paths get `404.html`
/// with status 404.
pub async fn serve_output(State(state): State<ServerState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return rejected(StatusCode::METHOD_NOT_ALLOWED, "Only GET and HEAD are supported");
    }

    let Some(relative) = safe_relative_path(uri.path()) else {
        return rejected(StatusCode::BAD_REQUEST, "Path escapes the output directory");
    };

    let root = state.output_dir.as_path();
    match resolve_file(root, &relative).await {
        Some(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => file_response(&path, Bytes::from(bytes), StatusCode::OK),
            Err(err) => {
                let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                ErrorReport::from_error(
                    "infra::http::public::serve_output",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &err,
                )
                .attach(&mut response);
                response
            }
        },
        None => not_found(root).await,
    }
}

/// Decode the request path into segments below the root, rejecting `..`.
fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            segment if segment.contains('\\') || segment.contains('\0') => return None,
            segment => relative.push(segment),
        }
    }
    Some(relative)
}

async fn resolve_file(root: &Path, relative: &Path) -> Option<PathBuf> {
    let candidate = root.join(relative);
    let metadata = tokio::fs::metadata(&candidate).await.ok()?;
    if metadata.is_file() {
        return Some(candidate);
    }
    if metadata.is_dir() {
        let index = candidate.join("index.html");
        if tokio::fs::metadata(&index).await.is_ok_and(|meta| meta.is_file()) {
            return Some(index);
        }
    }
    None
}

async fn not_found(root: &Path) -> Response {
    let page = root.join(NOT_FOUND_PAGE);
    let mut response = match tokio::fs::read(&page).await {
        Ok(bytes) => file_response(&page, Bytes::from(bytes), StatusCode::NOT_FOUND),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    };
    ErrorReport::from_message(
        "infra::http::public::not_found",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

fn rejected(status: StatusCode, message: &'static str) -> Response {
    let mut response = status.into_response();
    ErrorReport::from_message("infra::http::public::serve_output", status, message)
        .attach(&mut response);
    response
}

fn file_response(path: &Path, bytes: Bytes, status: StatusCode) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    response
}
