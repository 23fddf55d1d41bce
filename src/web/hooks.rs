//! Pipeline hook points.
//!
//! Two extension points, called by the host at fixed lifecycle
//! moments: [`check_request`] before response generation (to issue a
//! redirect instead of serving the page) and [`check_response`] after
//! (to fix up a redirect some other subsystem produced). Both are thin
//! compositions over the decision core so the host never re-implements
//! precedence rules.

use crate::config::PolicyConfig;
use crate::context::RequestContext;
use crate::decision::{decide, Decision};
use crate::rewrite::{rewrite_redirect, OutgoingResponse};
use crate::urls::{OutboundUrlBuilder, UrlScheme};

/// Pre-response hook: decides whether to redirect the request.
///
/// Returns the absolute redirect target when the policy demands a
/// scheme change, `None` when the request may be served as-is. The
/// target reuses the caller's literal path (trailing slash and case
/// preserved) with the query string appended verbatim; the host wraps
/// it in its own 301/302 response.
///
/// # Examples
///
/// ```
/// use securepages::web::check_request;
/// use securepages::{Method, PatternSet, PolicyConfig, RequestContext};
///
/// let cfg = PolicyConfig {
///     enabled: true,
///     secure_when_matched: true,
///     page_patterns: PatternSet::from_lines("/admin*"),
///     ..PolicyConfig::default()
/// };
/// let ctx = RequestContext::new("/admin/settings", "/admin/settings", Method::Get)
///     .with_host("example.com")
///     .with_query(Some("tab=general"));
///
/// assert_eq!(
///     check_request(&ctx, &cfg),
///     Some("https://example.com/admin/settings?tab=general".to_string())
/// );
/// ```
pub fn check_request(ctx: &RequestContext, cfg: &PolicyConfig) -> Option<String> {
    let scheme = match decide(ctx, cfg) {
        Decision::ForceSecure => UrlScheme::Secure,
        Decision::ForceInsecure => UrlScheme::Insecure,
        Decision::NoOpinion => return None,
    };

    let urls = OutboundUrlBuilder::new(cfg, ctx);
    let mut target = urls.build(ctx.raw_path(), scheme);
    if let Some(query) = ctx.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

/// Post-response hook: fixes up a redirect that disagrees with policy.
///
/// Delegates to [`rewrite_redirect`]; returns true when the response's
/// target URL was rewritten.
pub fn check_response(
    ctx: &RequestContext,
    cfg: &PolicyConfig,
    response: &mut OutgoingResponse,
) -> bool {
    rewrite_redirect(response, ctx, cfg)
}
