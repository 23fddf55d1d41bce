//! Redirect response fix-up.
//!
//! Other subsystems (login flows, destination handling) produce
//! redirects without consulting the scheme policy. This post-response
//! step inspects an already-produced redirect and, when its target
//! disagrees with what the decision engine would rule for the current
//! request, swaps the target's base URL. Only the target URL changes;
//! the status code is never touched.

use crate::config::PolicyConfig;
use crate::context::RequestContext;
use crate::decision::{match_path, matches_privileged_role, PageVerdict};
use crate::urls::OutboundUrlBuilder;

/// Minimal view of an outgoing response, owned by the host pipeline.
///
/// Only the pieces the rewriter needs: the status code (to recognize a
/// redirect) and the Location target (to rewrite it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    status: u16,
    location: Option<String>,
}

impl OutgoingResponse {
    /// Creates a non-redirect response view.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            location: None,
        }
    }

    /// Creates a redirect response view with a target URL.
    pub fn redirect(status: u16, target: impl Into<String>) -> Self {
        Self {
            status,
            location: Some(target.into()),
        }
    }

    /// The response status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether this response is a redirect the rewriter may act on.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }
}

/// Rewrites a redirect target that disagrees with policy.
///
/// Recomputes the role and page match exactly as the decision engine
/// does, then:
///
/// - upgrades the target's insecure base to the secure base when the
///   rules demand the secure scheme and the request is not on it;
/// - downgrades the target's secure base to the insecure base when the
///   page rules say "must be insecure", switch-back is enabled, the
///   request is on the secure scheme, and no privileged role pins the
///   user to it (role match takes precedence over switch-back here
///   exactly as it does in [`crate::decide`]).
///
/// Targets outside the site's own bases are never altered. Returns
/// true when the target was rewritten.
///
/// # Examples
///
/// ```
/// use securepages::{
///     rewrite_redirect, Method, OutgoingResponse, PatternSet, PolicyConfig, RequestContext,
/// };
///
/// let cfg = PolicyConfig {
///     enabled: true,
///     secure_when_matched: true,
///     page_patterns: PatternSet::from_lines("/user*"),
///     ..PolicyConfig::default()
/// };
/// let ctx = RequestContext::new("/user", "/user", Method::Get).with_host("example.com");
///
/// let mut response = OutgoingResponse::redirect(302, "http://example.com/user/login");
/// assert!(rewrite_redirect(&mut response, &ctx, &cfg));
/// assert_eq!(response.location(), Some("https://example.com/user/login"));
/// ```
pub fn rewrite_redirect(
    response: &mut OutgoingResponse,
    ctx: &RequestContext,
    cfg: &PolicyConfig,
) -> bool {
    if !cfg.enabled || !response.is_redirect() {
        return false;
    }
    let Some(target) = response.location.clone() else {
        return false;
    };

    let urls = OutboundUrlBuilder::new(cfg, ctx);
    // External targets are out of policy reach.
    if !urls.can_alter(&target) {
        return false;
    }

    let role_match = matches_privileged_role(ctx, cfg);
    let page = match_path(ctx, cfg);

    if (role_match || page == PageVerdict::MustSecure) && !ctx.is_secure() {
        // Request should be secure but the produced redirect still
        // points at the insecure base.
        if let Some(rest) = strip_base(&target, &urls.base(false)) {
            response.location = Some(format!("{}{}", urls.base(true), rest));
            return true;
        }
    } else if page == PageVerdict::MustInsecure && ctx.is_secure() && cfg.switch_back && !role_match
    {
        if let Some(rest) = strip_base(&target, &urls.base(true)) {
            response.location = Some(format!("{}{}", urls.base(false), rest));
            return true;
        }
    }

    false
}

/// Strips `base` from the front of `url`, keeping the path remainder.
///
/// Returns `None` when the URL does not sit at that base. The
/// remainder always begins with `/`, `?`, or is empty, so prefix
/// collisions with longer hostnames cannot match.
fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let rest = url.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
        Some(rest)
    } else {
        None
    }
}
