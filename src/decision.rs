//! The scheme-enforcement decision engine.
//!
//! Everything in this module is a total, pure function over a
//! [`RequestContext`] and a [`PolicyConfig`] snapshot: no I/O, no
//! hidden state, no panics for any input combination. The host
//! pipeline calls [`decide`] before producing a response; the same
//! primitives are reused by the response rewriter and the outbound URL
//! builder so every surface applies one set of rules.
//!
//! # Precedence
//!
//! 1. Disabled policy, POST, or XHR: no opinion, unconditionally.
//! 2. Privileged role on an insecure request: force secure.
//! 3. Page rules say "must be secure" on an insecure request: force
//!    secure.
//! 4. Page rules say "must be insecure" on a secure request, with
//!    switch-back enabled and no role match: force insecure.
//! 5. Otherwise: no opinion.
//!
//! The ignore list is evaluated before the page list and wins
//! outright: an ignored path yields [`PageVerdict::NoOpinion`], so no
//! rule can change the scheme the request already uses.

use tracing::debug;

use crate::config::PolicyConfig;
use crate::context::{Method, RequestContext};

/// Verdict of the engine for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request must be redirected to the secure scheme.
    ForceSecure,
    /// The request must be redirected to the insecure scheme.
    ForceInsecure,
    /// The policy has nothing to say; serve on the current scheme.
    NoOpinion,
}

/// What the page rules say about a path.
///
/// An explicit three-value result instead of a nullable boolean: the
/// ignore list short-circuits to [`PageVerdict::NoOpinion`] rather
/// than echoing the request's current scheme, so ignored paths can
/// never leak into the role-priority logic as a page opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    /// The path must be served over the secure scheme.
    MustSecure,
    /// The path must be served over the insecure scheme.
    MustInsecure,
    /// The page rules have no opinion about this path.
    NoOpinion,
}

/// Decides whether the request should change scheme.
///
/// # Examples
///
/// ```
/// use securepages::{decide, Decision, Method, PatternSet, PolicyConfig, RequestContext};
///
/// let cfg = PolicyConfig {
///     enabled: true,
///     secure_when_matched: true,
///     page_patterns: PatternSet::from_lines("/admin\n/admin/*"),
///     ..PolicyConfig::default()
/// };
///
/// let ctx = RequestContext::new("/admin/settings", "/admin/settings", Method::Get);
/// assert_eq!(decide(&ctx, &cfg), Decision::ForceSecure);
/// ```
pub fn decide(ctx: &RequestContext, cfg: &PolicyConfig) -> Decision {
    if !cfg.enabled {
        return Decision::NoOpinion;
    }

    // Never redirect non-idempotent or programmatic requests: a
    // redirected POST drops its body, and redirected XHR breaks
    // same-origin handling in the client.
    if ctx.method() == Method::Post || ctx.is_xhr() {
        return Decision::NoOpinion;
    }

    let role_match = matches_privileged_role(ctx, cfg);
    let page = match_path(ctx, cfg);

    if role_match && !ctx.is_secure() {
        log_decision(cfg, "redirect user to secure", ctx.path());
        Decision::ForceSecure
    } else if page == PageVerdict::MustSecure && !ctx.is_secure() {
        log_decision(cfg, "redirect path to secure", ctx.path());
        Decision::ForceSecure
    } else if page == PageVerdict::MustInsecure && ctx.is_secure() && cfg.switch_back && !role_match
    {
        log_decision(cfg, "redirect path to insecure", ctx.path());
        Decision::ForceInsecure
    } else {
        Decision::NoOpinion
    }
}

/// Matches the request path against the ignore and page lists.
///
/// The ignore list always wins: a path matching it (by alias or, when
/// different, by internal path) returns [`PageVerdict::NoOpinion`]
/// before the page list is consulted. With an empty page list the
/// verdict is also `NoOpinion`. Otherwise the match result combines
/// with [`PolicyConfig::secure_when_matched`]: equal means the path
/// must be secure, unequal means it must be insecure.
pub fn match_path(ctx: &RequestContext, cfg: &PolicyConfig) -> PageVerdict {
    if !cfg.ignore_patterns.is_empty() && matches_either(ctx, &cfg.ignore_patterns) {
        log_decision(cfg, "ignored path", ctx.path());
        return PageVerdict::NoOpinion;
    }

    if cfg.page_patterns.is_empty() {
        return PageVerdict::NoOpinion;
    }

    let matched = matches_either(ctx, &cfg.page_patterns);
    if matched == cfg.secure_when_matched {
        PageVerdict::MustSecure
    } else {
        PageVerdict::MustInsecure
    }
}

/// Matches a form identifier against the configured form patterns.
///
/// Independent of [`decide`]: the result feeds only the outbound URL
/// builder, forcing a form's action onto the secure scheme.
pub fn match_form_id(form_id: &str, cfg: &PolicyConfig) -> bool {
    cfg.form_patterns.matches(form_id)
}

/// Whether the user holds any role from the privileged set.
pub fn matches_privileged_role(ctx: &RequestContext, cfg: &PolicyConfig) -> bool {
    !cfg.privileged_roles.is_empty()
        && ctx
            .user_roles()
            .iter()
            .any(|role| cfg.privileged_roles.contains(role))
}

/// Tests alias first, then the internal path when it differs.
fn matches_either(ctx: &RequestContext, patterns: &crate::matcher::PatternSet) -> bool {
    patterns.matches(ctx.path_alias())
        || (ctx.path() != ctx.path_alias() && patterns.matches(ctx.path()))
}

/// Emits a decision trace when verbose logging is configured.
fn log_decision(cfg: &PolicyConfig, what: &str, path: &str) {
    if cfg.debug {
        debug!(path = %path, "{}", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::PatternSet;
    use std::collections::BTreeSet;

    fn default_pages() -> PatternSet {
        PatternSet::from_list([
            "/node/add*",
            "/node/*/edit",
            "/node/*/delete",
            "/user",
            "/user/*",
            "/admin",
            "/admin/*",
        ])
    }

    fn enabled_config() -> PolicyConfig {
        PolicyConfig {
            enabled: true,
            secure_when_matched: true,
            page_patterns: default_pages(),
            ..PolicyConfig::default()
        }
    }

    fn get(path: &str) -> RequestContext {
        RequestContext::new(path, path, Method::Get)
    }

    #[test]
    fn disabled_policy_yields_no_opinion() {
        let cfg = PolicyConfig {
            enabled: false,
            ..enabled_config()
        };
        assert_eq!(decide(&get("/admin"), &cfg), Decision::NoOpinion);
    }

    #[test]
    fn protected_page_forces_secure() {
        let cfg = enabled_config();
        assert_eq!(decide(&get("/admin/settings"), &cfg), Decision::ForceSecure);
        assert_eq!(decide(&get("/user/login"), &cfg), Decision::ForceSecure);
    }

    #[test]
    fn protected_page_already_secure_is_no_opinion() {
        let cfg = enabled_config();
        let ctx = get("/admin/settings").with_secure(true);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn unmatched_page_without_switch_back_is_no_opinion() {
        let cfg = enabled_config();
        assert_eq!(decide(&get("/node"), &cfg), Decision::NoOpinion);
        assert_eq!(
            decide(&get("/node").with_secure(true), &cfg),
            Decision::NoOpinion
        );
    }

    #[test]
    fn switch_back_downgrades_unmatched_secure_page() {
        let cfg = PolicyConfig {
            switch_back: true,
            ..enabled_config()
        };
        let ctx = get("/node").with_secure(true);
        assert_eq!(decide(&ctx, &cfg), Decision::ForceInsecure);
        // Insecure already: nothing to do.
        assert_eq!(decide(&get("/node"), &cfg), Decision::NoOpinion);
    }

    #[test]
    fn post_is_never_redirected() {
        let cfg = PolicyConfig {
            switch_back: true,
            ..enabled_config()
        };
        let ctx = RequestContext::new("/admin", "/admin", Method::Post);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);

        let secure_post = RequestContext::new("/node", "/node", Method::Post).with_secure(true);
        assert_eq!(decide(&secure_post, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn xhr_is_never_redirected() {
        let cfg = PolicyConfig {
            switch_back: true,
            ..enabled_config()
        };
        let ctx = get("/admin").with_xhr(true);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn privileged_role_forces_secure_on_any_path() {
        let mut cfg = enabled_config();
        cfg.privileged_roles.insert("administrator".to_string());

        let mut roles = BTreeSet::new();
        roles.insert("administrator".to_string());

        let ctx = get("/node").with_roles(roles);
        assert_eq!(decide(&ctx, &cfg), Decision::ForceSecure);
    }

    #[test]
    fn role_match_overrides_switch_back() {
        let mut cfg = PolicyConfig {
            switch_back: true,
            ..enabled_config()
        };
        cfg.privileged_roles.insert("administrator".to_string());

        let mut roles = BTreeSet::new();
        roles.insert("administrator".to_string());

        // Page verdict is MustInsecure, but the role wins: never downgrade.
        let ctx = get("/node").with_secure(true).with_roles(roles);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn unprivileged_roles_do_not_force_secure() {
        let mut cfg = enabled_config();
        cfg.privileged_roles.insert("administrator".to_string());

        let mut roles = BTreeSet::new();
        roles.insert("authenticated".to_string());

        let ctx = get("/node").with_roles(roles);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn empty_privileged_set_never_matches() {
        let cfg = enabled_config();
        let mut roles = BTreeSet::new();
        roles.insert("administrator".to_string());
        assert!(!matches_privileged_role(&get("/node").with_roles(roles), &cfg));
    }

    #[test]
    fn ignored_path_short_circuits_to_no_opinion() {
        let cfg = PolicyConfig {
            ignore_patterns: PatternSet::from_lines("*/autocomplete/*"),
            ..enabled_config()
        };

        // /user/autocomplete/alice would match "/user/*" but the ignore
        // list wins: the current scheme is preserved either way.
        let ctx = get("/user/autocomplete/alice");
        assert_eq!(match_path(&ctx, &cfg), PageVerdict::NoOpinion);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);

        let secure_ctx = get("/user/autocomplete/alice").with_secure(true);
        assert_eq!(decide(&secure_ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn ignored_path_is_immune_to_switch_back() {
        let cfg = PolicyConfig {
            switch_back: true,
            ignore_patterns: PatternSet::from_lines("/feed*"),
            ..enabled_config()
        };
        let ctx = get("/feed/rss").with_secure(true);
        assert_eq!(decide(&ctx, &cfg), Decision::NoOpinion);
    }

    #[test]
    fn empty_page_list_yields_no_opinion() {
        let cfg = PolicyConfig {
            enabled: true,
            switch_back: true,
            secure_when_matched: true,
            ..PolicyConfig::default()
        };
        assert_eq!(match_path(&get("/anything"), &cfg), PageVerdict::NoOpinion);
        assert_eq!(
            decide(&get("/anything").with_secure(true), &cfg),
            Decision::NoOpinion
        );
    }

    #[test]
    fn inverted_polarity_protects_unlisted_pages() {
        // secure_when_matched = false: listed pages must be insecure,
        // everything else must be secure.
        let cfg = PolicyConfig {
            enabled: true,
            switch_back: true,
            secure_when_matched: false,
            page_patterns: PatternSet::from_lines("/public*"),
            ..PolicyConfig::default()
        };

        assert_eq!(match_path(&get("/private"), &cfg), PageVerdict::MustSecure);
        assert_eq!(decide(&get("/private"), &cfg), Decision::ForceSecure);

        assert_eq!(
            match_path(&get("/public/page"), &cfg),
            PageVerdict::MustInsecure
        );
        assert_eq!(
            decide(&get("/public/page").with_secure(true), &cfg),
            Decision::ForceInsecure
        );
    }

    #[test]
    fn matching_uses_alias_or_internal_path() {
        let cfg = enabled_config();

        // Alias matches even though the internal path does not.
        let by_alias = RequestContext::new("/node/12", "/user/profile", Method::Get);
        assert_eq!(match_path(&by_alias, &cfg), PageVerdict::MustSecure);

        // Internal path matches even though the alias does not.
        let by_path = RequestContext::new("/admin/people", "/staff-directory", Method::Get);
        assert_eq!(match_path(&by_path, &cfg), PageVerdict::MustSecure);
    }

    #[test]
    fn case_and_trailing_slash_are_insensitive() {
        let cfg = enabled_config();
        assert_eq!(match_path(&get("/User"), &cfg), PageVerdict::MustSecure);
        assert_eq!(match_path(&get("/user/"), &cfg), PageVerdict::MustSecure);
        assert_eq!(match_path(&get("/USER/"), &cfg), PageVerdict::MustSecure);
    }

    #[test]
    fn form_id_matching_is_independent_of_paths() {
        let cfg = PolicyConfig {
            form_patterns: PatternSet::from_lines("user_login_form\ncommerce_*"),
            ..enabled_config()
        };
        assert!(match_form_id("user_login_form", &cfg));
        assert!(match_form_id("commerce_checkout", &cfg));
        assert!(!match_form_id("search_form", &cfg));
        // Form ids never influence the redirect decision.
        assert_eq!(decide(&get("/node"), &cfg), Decision::NoOpinion);
    }

    #[test]
    fn decide_is_idempotent() {
        let cfg = PolicyConfig {
            switch_back: true,
            ..enabled_config()
        };
        let ctx = get("/admin/settings");
        let first = decide(&ctx, &cfg);
        let second = decide(&ctx, &cfg);
        assert_eq!(first, second);
        assert_eq!(first, Decision::ForceSecure);
    }

    #[test]
    fn end_to_end_scenario_from_default_rule_set() {
        let cfg = PolicyConfig {
            enabled: true,
            switch_back: true,
            secure_when_matched: true,
            page_patterns: PatternSet::from_list([
                "/node/add*",
                "/user",
                "/user/*",
                "/admin",
                "/admin/*",
            ]),
            ..PolicyConfig::default()
        };

        assert_eq!(decide(&get("/admin/settings"), &cfg), Decision::ForceSecure);
        assert_eq!(
            decide(&get("/node").with_secure(true), &cfg),
            Decision::ForceInsecure
        );
        assert_eq!(decide(&get("/node"), &cfg), Decision::NoOpinion);
    }
}
