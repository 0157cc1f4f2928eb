use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::models::{Destination, RequestMode, ShellRequest, ShellResponse};
use crate::state::AppState;

/// Response headers the server recomputes for the body it sends.
const DROPPED_RESPONSE_HEADERS: [&str; 3] = ["connection", "content-length", "transfer-encoding"];

/// Fallback for every path the API does not claim.
pub async fn serve(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::MethodNotAllowed(method.to_string()));
    }

    let request = shell_request(&method, &uri, &headers);
    let response = state.shell.handle(&request).await?;
    Ok(into_response(response))
}

pub fn shell_request(method: &Method, uri: &Uri, headers: &HeaderMap) -> ShellRequest {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let navigate = header("sec-fetch-mode") == Some("navigate")
        || (method == Method::GET && header("accept").is_some_and(|a| a.contains("text/html")));
    let destination = match header("sec-fetch-dest") {
        Some(dest) => Destination::parse(dest),
        None if navigate => Destination::Document,
        None => Destination::guess_from_path(&url),
    };

    ShellRequest {
        method: method.as_str().to_string(),
        url,
        mode: if navigate {
            RequestMode::Navigate
        } else {
            RequestMode::Other
        },
        destination,
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
    }
}

fn into_response(response: ShellResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if DROPPED_RESPONSE_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::debug!(header = %name, "dropping unrepresentable header"),
        }
    }

    (status, headers, Body::from(response.body)).into_response()
}
