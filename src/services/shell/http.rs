use async_trait::async_trait;
use reqwest::{Method, Url};

use super::{Network, NetworkError};
use crate::models::{ResponseKind, ShellRequest, ShellResponse};

/// Request headers that describe the hop, not the resource.
const SKIPPED_HEADERS: [&str; 5] = [
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "upgrade",
];

/// Fetches shell requests from one upstream origin.
pub struct HttpNetwork {
    origin: Url,
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(origin: &str) -> Result<Self, NetworkError> {
        let origin = Url::parse(origin).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            client: reqwest::Client::new(),
        })
    }

    /// Resolves `url` against the origin. Anything that lands on another
    /// origin, such as a protocol-relative `//host/path`, is rejected.
    fn resolve(&self, url: &str) -> Result<Url, NetworkError> {
        let resolved = self
            .origin
            .join(url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
        if resolved.origin() != self.origin.origin() {
            return Err(NetworkError::InvalidUrl(format!(
                "{url} resolves outside {}",
                self.origin
            )));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &ShellRequest) -> Result<ShellResponse, NetworkError> {
        let url = self.resolve(&request.url)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetworkError::InvalidUrl(format!("bad method {}", request.method)))?;

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &request.headers {
            if !SKIPPED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkError::Unreachable(e.to_string()))?;

        let final_url = response.url().clone();
        let kind = if final_url.origin() == self.origin.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        };
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::Unreachable(e.to_string()))?;

        Ok(ShellResponse {
            status,
            headers,
            body,
            kind,
            redirected: final_url != url,
        })
    }
}
