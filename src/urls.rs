//! Outbound URL construction.
//!
//! Links, redirect targets, and form actions emitted while rendering a
//! page must land on the scheme the policy demands. The builder
//! substitutes the configured secure/insecure base URLs when present
//! and falls back to the request's own origin otherwise. Resolution is
//! pure computation over the current request and configuration, so it
//! is safe to call once per emitted link; results must never be cached
//! across users or sessions because they depend on the requesting
//! user's roles.

use crate::config::PolicyConfig;
use crate::context::RequestContext;
use crate::decision::{match_form_id, match_path, matches_privileged_role, PageVerdict};

/// Requested scheme for an outbound URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlScheme {
    /// Force the secure scheme.
    Secure,
    /// Force the insecure scheme.
    Insecure,
    /// Derive the scheme from policy (roles, page rules, form rules),
    /// keeping the request's current scheme when no rule applies.
    Auto,
}

/// Builds absolute URLs under the policy's scheme rules.
///
/// # Examples
///
/// ```
/// use securepages::{
///     Method, OutboundUrlBuilder, PatternSet, PolicyConfig, RequestContext, UrlScheme,
/// };
///
/// let cfg = PolicyConfig {
///     enabled: true,
///     secure_when_matched: true,
///     secure_base_url: "https://secure.example.com".to_string(),
///     page_patterns: PatternSet::from_lines("/user*"),
///     ..PolicyConfig::default()
/// };
/// let ctx = RequestContext::new("/user/login", "/user/login", Method::Get)
///     .with_host("example.com");
///
/// let urls = OutboundUrlBuilder::new(&cfg, &ctx);
/// assert_eq!(
///     urls.build("/user/login", UrlScheme::Auto),
///     "https://secure.example.com/user/login"
/// );
/// assert_eq!(
///     urls.build("/node", UrlScheme::Insecure),
///     "http://example.com/node" // no insecure base configured: ambient origin
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OutboundUrlBuilder<'a> {
    cfg: &'a PolicyConfig,
    ctx: &'a RequestContext,
}

impl<'a> OutboundUrlBuilder<'a> {
    /// Creates a builder over the request and configuration snapshot.
    pub fn new(cfg: &'a PolicyConfig, ctx: &'a RequestContext) -> Self {
        Self { cfg, ctx }
    }

    /// The base URL for the requested polarity, without a trailing
    /// slash.
    ///
    /// Configured base URLs win; with none configured the request's
    /// own host is used under the requested scheme.
    pub fn base(&self, secure: bool) -> String {
        let configured = if secure {
            &self.cfg.secure_base_url
        } else {
            &self.cfg.insecure_base_url
        };
        if configured.is_empty() {
            let scheme = if secure { "https" } else { "http" };
            format!("{}://{}", scheme, self.ctx.host())
        } else {
            configured.trim_end_matches('/').to_string()
        }
    }

    /// Builds an absolute URL for a destination path.
    ///
    /// The destination is used verbatim (aside from guaranteeing one
    /// `/` between base and path), so a caller's trailing slash
    /// survives into the result.
    pub fn build(&self, destination: &str, scheme: UrlScheme) -> String {
        let secure = match scheme {
            UrlScheme::Secure => true,
            UrlScheme::Insecure => false,
            UrlScheme::Auto => self.auto_secure(None),
        };
        join(&self.base(secure), destination)
    }

    /// Builds the self-referential form action for the current page.
    ///
    /// The action points back at the request's literal path (original
    /// spelling preserved) with the query string appended verbatim,
    /// under the scheme the policy derives. The form identifier is an
    /// additional forcing condition: a matching form posts to the
    /// secure scheme even when the page rules would not require it.
    ///
    /// Resolve this immediately before render; the result depends on
    /// the current user's roles and must not be cached across sessions.
    pub fn form_action(&self, form_id: &str) -> String {
        let secure = self.auto_secure(Some(form_id));
        let mut action = join(&self.base(secure), self.ctx.raw_path());
        if let Some(query) = self.ctx.query() {
            action.push('?');
            action.push_str(query);
        }
        action
    }

    /// Whether a URL points at this site and may have its base
    /// rewritten.
    ///
    /// Relative URLs are always local. Absolute URLs are alterable only
    /// when they start at one of the site's own bases (configured or
    /// ambient); anything else is an external target the policy must
    /// not touch.
    pub fn can_alter(&self, url: &str) -> bool {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return true;
        }
        starts_at_base(url, &self.base(true)) || starts_at_base(url, &self.base(false))
    }

    /// Derives the desired polarity with the decision engine's
    /// precedence, extended by the optional form-id forcing condition.
    fn auto_secure(&self, form_id: Option<&str>) -> bool {
        let role_match = matches_privileged_role(self.ctx, self.cfg);
        let page = match_path(self.ctx, self.cfg);
        let form_match = form_id.is_some_and(|id| match_form_id(id, self.cfg));

        if role_match {
            true
        } else if page == PageVerdict::MustSecure || form_match {
            true
        } else if page == PageVerdict::MustInsecure && self.cfg.switch_back {
            false
        } else {
            self.ctx.is_secure()
        }
    }
}

/// Joins a base origin and a destination path with exactly one slash.
fn join(base: &str, destination: &str) -> String {
    if destination.starts_with('/') {
        format!("{}{}", base, destination)
    } else {
        format!("{}/{}", base, destination)
    }
}

/// Whether `url` is `base` itself or a path under it.
fn starts_at_base(url: &str, base: &str) -> bool {
    match url.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
