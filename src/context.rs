//! Per-request evaluation context.
//!
//! A [`RequestContext`] is built fresh for each inbound request from
//! already-extracted primitives and discarded when the response is
//! finalized. It carries both the caller's literal path (preserved for
//! redirect targets) and the normalized form used for pattern
//! comparison.

use std::collections::BTreeSet;
use std::fmt;

/// HTTP method of the request under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// HTTP GET method
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
        }
    }
}

/// Read-only descriptor of the request under evaluation.
///
/// Path comparison in the decision engine is case-insensitive and
/// trailing-slash-insensitive, so the constructor normalizes `path`
/// and `path_alias` once, up front. The literal path string survives
/// in [`RequestContext::raw_path`] because a redirect target must
/// preserve the caller's spelling (including any trailing slash).
///
/// # Examples
///
/// ```
/// use securepages::{Method, RequestContext};
///
/// let ctx = RequestContext::new("/User/", "/User/", Method::Get)
///     .with_host("example.com");
///
/// assert_eq!(ctx.path(), "/user");      // normalized for comparison
/// assert_eq!(ctx.raw_path(), "/User/"); // preserved for redirects
/// assert!(!ctx.is_secure());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    raw_path: String,
    path: String,
    path_alias: String,
    method: Method,
    is_secure: bool,
    is_xhr: bool,
    host: String,
    query: Option<String>,
    user_roles: BTreeSet<String>,
}

impl RequestContext {
    /// Creates a context from the raw request path, its resolved alias,
    /// and the request method.
    ///
    /// When alias resolution is unavailable, pass the path as its own
    /// alias; the engine treats `path == path_alias` as "no alias".
    /// All other fields default to an insecure, non-XHR, anonymous GET
    /// against an empty host; use the `with_*` builders to fill them in.
    pub fn new(raw_path: &str, path_alias: &str, method: Method) -> Self {
        Self {
            raw_path: raw_path.to_string(),
            path: normalize_path(raw_path),
            path_alias: normalize_path(path_alias),
            method,
            is_secure: false,
            is_xhr: false,
            host: String::new(),
            query: None,
            user_roles: BTreeSet::new(),
        }
    }

    /// Sets whether the request arrived over the secure scheme.
    pub fn with_secure(mut self, is_secure: bool) -> Self {
        self.is_secure = is_secure;
        self
    }

    /// Sets whether the request was made via XMLHttpRequest.
    pub fn with_xhr(mut self, is_xhr: bool) -> Self {
        self.is_xhr = is_xhr;
        self
    }

    /// Sets the request's host authority, used as the origin fallback
    /// when no base URL is configured.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Sets the raw query string (without the leading `?`).
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.map(str::to_string);
        self
    }

    /// Sets the requesting user's role identifiers.
    pub fn with_roles(mut self, roles: BTreeSet<String>) -> Self {
        self.user_roles = roles;
        self
    }

    /// The path exactly as the caller sent it.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// The normalized path used for pattern comparison.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The normalized path alias; equals [`RequestContext::path`] when
    /// no alias exists.
    pub fn path_alias(&self) -> &str {
        &self.path_alias
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Whether the request arrived over the secure scheme.
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }

    /// Whether the request was made via XMLHttpRequest.
    pub fn is_xhr(&self) -> bool {
        self.is_xhr
    }

    /// The request's host authority (no scheme, no path).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The requesting user's roles.
    pub fn user_roles(&self) -> &BTreeSet<String> {
        &self.user_roles
    }
}

/// Normalizes a path for comparison: lowercased, trailing slash
/// stripped, and the front page represented as `/`.
pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed.to_lowercase()
}
