//! Request adapter for mapping host requests to decision-core types.

use tracing::warn;

use crate::context::{Method, RequestContext};
use crate::provider::{AliasResolver, RoleProvider};

/// Adapter for converting framework-specific HTTP requests into a
/// [`RequestContext`].
///
/// `RequestAdapter` is the primary integration point between web
/// frameworks and the decision core. It carries only simple, owned
/// primitives, so it never couples to a framework's request types;
/// framework-specific code should implement `From<FrameworkRequest>`
/// for `RequestAdapter`.
///
/// The XHR flag is derived the way hosts observe it: presence of the
/// `X-Requested-With: XMLHttpRequest` header.
///
/// # Examples
///
/// ```
/// use securepages::web::RequestAdapter;
/// use securepages::provider::{IdentityAliasResolver, StaticRoleProvider};
/// use securepages::Method;
///
/// let adapter = RequestAdapter::new(Method::Get, "/User/")
///     .host("example.com")
///     .query("page=2")
///     .requested_with(Some("XMLHttpRequest"));
///
/// let ctx = adapter.context(&IdentityAliasResolver, &StaticRoleProvider::default());
/// assert_eq!(ctx.path(), "/user");
/// assert!(ctx.is_xhr());
/// assert_eq!(ctx.query(), Some("page=2"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    method: Method,
    raw_path: String,
    host: String,
    query: Option<String>,
    is_secure: bool,
    is_xhr: bool,
}

impl RequestAdapter {
    /// Creates an adapter from the request method and raw path.
    ///
    /// All other fields default to an insecure, non-XHR request
    /// against an empty host; use the builder methods to fill them in.
    pub fn new(method: Method, raw_path: &str) -> Self {
        Self {
            method,
            raw_path: raw_path.to_string(),
            host: String::new(),
            query: None,
            is_secure: false,
            is_xhr: false,
        }
    }

    /// Sets the request's host authority.
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Sets the raw query string (without the leading `?`).
    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    /// Sets whether the request arrived over the secure scheme.
    pub fn secure(mut self, is_secure: bool) -> Self {
        self.is_secure = is_secure;
        self
    }

    /// Derives the XHR flag from the `X-Requested-With` header value.
    pub fn requested_with(mut self, header: Option<&str>) -> Self {
        self.is_xhr = header == Some("XMLHttpRequest");
        self
    }

    /// Resolves the full request context through the host's providers.
    ///
    /// Collaborator failures never abort request handling: a failed
    /// alias resolution falls back to the raw path as its own alias,
    /// and a failed role lookup falls back to the empty role set. Each
    /// fallback logs a warning naming the provider so operators can
    /// see why the policy saw degraded inputs.
    pub fn context(&self, aliases: &dyn AliasResolver, roles: &dyn RoleProvider) -> RequestContext {
        let alias = match aliases.resolve_alias(&self.raw_path) {
            Ok(alias) => alias,
            Err(err) => {
                warn!(path = %self.raw_path, error = %err, "alias resolver failed; using path as its own alias");
                self.raw_path.clone()
            }
        };

        let user_roles = match roles.current_roles() {
            Ok(roles) => roles,
            Err(err) => {
                warn!(error = %err, "role provider failed; treating user as anonymous");
                Default::default()
            }
        };

        RequestContext::new(&self.raw_path, &alias, self.method)
            .with_secure(self.is_secure)
            .with_xhr(self.is_xhr)
            .with_host(&self.host)
            .with_query(self.query.as_deref())
            .with_roles(user_roles)
    }
}
