//! Host pipeline integration flow.
//!
//! Drives the crate end to end the way a framework integration would:
//! configuration published through the store, request context resolved
//! through providers, the pre-response hook deciding redirects, and
//! the post-response hook fixing up redirects other subsystems made.

use std::collections::BTreeSet;

use securepages::provider::{AliasResolver, ConfigProvider, IdentityAliasResolver, RoleProvider, StaticRoleProvider};
use securepages::web::{check_request, check_response, RequestAdapter};
use securepages::{
    ConfigStore, Method, OutgoingResponse, PatternSet, PolicyConfig, ProviderError,
};

fn site_config() -> PolicyConfig {
    PolicyConfig {
        enabled: true,
        switch_back: true,
        secure_when_matched: true,
        page_patterns: PatternSet::from_list(["/user", "/user/*", "/admin", "/admin/*"]),
        ignore_patterns: PatternSet::from_lines("*/autocomplete/*"),
        ..PolicyConfig::default()
    }
}

/// Alias resolver with a fixed alias table, standing in for a host's
/// path-alias subsystem.
struct TableAliases;

impl AliasResolver for TableAliases {
    fn resolve_alias(&self, path: &str) -> Result<String, ProviderError> {
        match path {
            "/node/7" => Ok("/user/profile".to_string()),
            other => Ok(other.to_string()),
        }
    }
}

#[test]
fn full_request_cycle_redirects_protected_page() {
    let store = ConfigStore::new(site_config());
    let cfg = store.snapshot();

    let ctx = RequestAdapter::new(Method::Get, "/user/login")
        .host("example.com")
        .query("destination=/node/1")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());

    assert_eq!(
        check_request(&ctx, &cfg),
        Some("https://example.com/user/login?destination=/node/1".to_string())
    );
}

#[test]
fn aliased_path_is_protected_through_its_alias() {
    let store = ConfigStore::new(site_config());
    let cfg = store.snapshot();

    let ctx = RequestAdapter::new(Method::Get, "/node/7")
        .host("example.com")
        .context(&TableAliases, &StaticRoleProvider::default());

    assert_eq!(ctx.path_alias(), "/user/profile");
    assert_eq!(
        check_request(&ctx, &cfg),
        Some("https://example.com/node/7".to_string())
    );
}

#[test]
fn privileged_session_is_pinned_to_https() {
    let store = ConfigStore::new(PolicyConfig {
        privileged_roles: ["administrator".to_string()].into_iter().collect(),
        ..site_config()
    });
    let cfg = store.snapshot();

    let mut roles = BTreeSet::new();
    roles.insert("administrator".to_string());
    let provider = StaticRoleProvider::new(roles);

    // Forced onto HTTPS on an unprotected page.
    let ctx = RequestAdapter::new(Method::Get, "/node")
        .host("example.com")
        .context(&IdentityAliasResolver, &provider);
    assert_eq!(
        check_request(&ctx, &cfg),
        Some("https://example.com/node".to_string())
    );

    // Not switched back once there.
    let ctx = RequestAdapter::new(Method::Get, "/node")
        .host("example.com")
        .secure(true)
        .context(&IdentityAliasResolver, &provider);
    assert_eq!(check_request(&ctx, &cfg), None);
}

#[test]
fn privileged_session_redirect_is_never_downgraded() {
    let store = ConfigStore::new(PolicyConfig {
        privileged_roles: ["administrator".to_string()].into_iter().collect(),
        ..site_config()
    });
    let cfg = store.snapshot();

    let mut roles = BTreeSet::new();
    roles.insert("administrator".to_string());
    let provider = StaticRoleProvider::new(roles);

    // /node is unclaimed and switch-back is on, but the role pins the
    // session to HTTPS: a secure redirect target must stay secure.
    let ctx = RequestAdapter::new(Method::Get, "/node")
        .host("example.com")
        .secure(true)
        .context(&IdentityAliasResolver, &provider);
    let mut response = OutgoingResponse::redirect(302, "https://example.com/node/1");

    assert!(!check_response(&ctx, &cfg, &mut response));
    assert_eq!(response.location(), Some("https://example.com/node/1"));
}

#[test]
fn login_flow_redirect_is_upgraded_after_the_fact() {
    let store = ConfigStore::new(site_config());
    let cfg = store.snapshot();

    // The login subsystem already produced a redirect to HTTP.
    let ctx = RequestAdapter::new(Method::Get, "/user")
        .host("example.com")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());
    let mut response = OutgoingResponse::redirect(302, "http://example.com/user/login");

    assert!(check_response(&ctx, &cfg, &mut response));
    assert_eq!(response.location(), Some("https://example.com/user/login"));
    assert_eq!(response.status(), 302);
}

#[test]
fn xhr_autocomplete_is_left_alone_end_to_end() {
    let store = ConfigStore::new(site_config());
    let cfg = store.snapshot();

    let ctx = RequestAdapter::new(Method::Get, "/user/autocomplete/alice")
        .host("example.com")
        .requested_with(Some("XMLHttpRequest"))
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());

    assert_eq!(check_request(&ctx, &cfg), None);

    // Even without the XHR header the ignore rule prevents redirects.
    let ctx = RequestAdapter::new(Method::Get, "/user/autocomplete/alice")
        .host("example.com")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());
    assert_eq!(check_request(&ctx, &cfg), None);
}

#[test]
fn published_config_applies_only_to_new_requests() {
    let store = ConfigStore::new(site_config());

    // Request A starts under the old snapshot.
    let old_cfg = store.snapshot();

    // Settings change mid-flight: policy disabled.
    store.publish(PolicyConfig {
        enabled: false,
        ..site_config()
    });

    let ctx = RequestAdapter::new(Method::Get, "/user")
        .host("example.com")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());

    // A keeps redirecting under its snapshot; a new request sees the
    // disabled policy.
    assert!(check_request(&ctx, &old_cfg).is_some());
    assert_eq!(check_request(&ctx, &store.snapshot()), None);
}

#[test]
fn provider_failures_degrade_to_safe_defaults() {
    struct DownAliases;
    impl AliasResolver for DownAliases {
        fn resolve_alias(&self, _: &str) -> Result<String, ProviderError> {
            Err(ProviderError::new("alias backend down"))
        }
    }
    struct DownRoles;
    impl RoleProvider for DownRoles {
        fn current_roles(&self) -> Result<BTreeSet<String>, ProviderError> {
            Err(ProviderError::new("session store down"))
        }
    }

    let store = ConfigStore::new(site_config());
    let cfg = store.snapshot();

    // Path still matches through itself; roles degrade to anonymous.
    let ctx = RequestAdapter::new(Method::Get, "/admin/config")
        .host("example.com")
        .context(&DownAliases, &DownRoles);

    assert_eq!(ctx.path_alias(), ctx.path());
    assert!(ctx.user_roles().is_empty());
    assert_eq!(
        check_request(&ctx, &cfg),
        Some("https://example.com/admin/config".to_string())
    );
}
