use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Other,
}

impl Destination {
    /// Maps a `Sec-Fetch-Dest` header value.
    pub fn parse(s: &str) -> Self {
        match s {
            "document" | "iframe" => Destination::Document,
            "image" => Destination::Image,
            "script" => Destination::Script,
            "style" => Destination::Style,
            _ => Destination::Other,
        }
    }

    pub fn guess_from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" | "ico") => Destination::Image,
            Some("js" | "mjs") => Destination::Script,
            Some("css") => Destination::Style,
            _ => Destination::Other,
        }
    }
}

/// An intercepted request. `url` is the origin-relative path plus query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    pub method: String,
    pub url: String,
    pub mode: RequestMode,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
}

impl ShellRequest {
    pub fn get(url: impl Into<String>) -> Self {
        let url = url.into();
        let destination = Destination::guess_from_path(&url);
        Self {
            method: "GET".to_string(),
            url,
            mode: RequestMode::Other,
            destination,
            headers: vec![],
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            mode: RequestMode::Navigate,
            destination: Destination::Document,
            ..Self::get(url)
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            method: self.method.to_ascii_uppercase(),
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

impl CacheKey {
    pub fn get(url: &str) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.to_string(),
        }
    }
}

/// Same-origin (`Basic`), cross-origin readable (`Cors`), unreadable
/// (`Opaque`) or a network error placeholder (`Error`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    Error,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "basic" => ResponseKind::Basic,
            "cors" => ResponseKind::Cors,
            "opaque" => ResponseKind::Opaque,
            _ => ResponseKind::Error,
        }
    }
}

/// A captured response. Cloning is cheap, the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub kind: ResponseKind,
    pub redirected: bool,
}

impl ShellResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            headers: vec![],
            body: body.into(),
            kind: ResponseKind::Basic,
            redirected: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn redirected(mut self) -> Self {
        self.redirected = true;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only plain same-origin 200s are stored by the sub-resource path.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic && !self.redirected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_destination() {
        assert_eq!(
            Destination::guess_from_path("/icons/icon-192x192.png"),
            Destination::Image
        );
        assert_eq!(Destination::guess_from_path("/favicon.ico?v=2"), Destination::Image);
        assert_eq!(Destination::guess_from_path("/static/js/main.js"), Destination::Script);
        assert_eq!(Destination::guess_from_path("/manifest.json"), Destination::Other);
        assert_eq!(Destination::guess_from_path("/"), Destination::Other);
    }

    #[test]
    fn test_cacheable_requires_plain_same_origin_200() {
        assert!(ShellResponse::ok("x").is_cacheable());
        assert!(!ShellResponse::ok("x").with_status(404).is_cacheable());
        assert!(!ShellResponse::ok("x").with_status(204).is_cacheable());
        assert!(!ShellResponse::ok("x").with_kind(ResponseKind::Opaque).is_cacheable());
        assert!(!ShellResponse::ok("x").with_kind(ResponseKind::Cors).is_cacheable());
        assert!(!ShellResponse::ok("x").redirected().is_cacheable());
    }

    #[test]
    fn test_cache_key_normalizes_method() {
        let mut req = ShellRequest::get("/index.html");
        req.method = "get".to_string();
        assert_eq!(req.cache_key(), CacheKey::get("/index.html"));
    }
}
