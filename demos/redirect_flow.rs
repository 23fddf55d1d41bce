//! Request redirect flow demonstration.
//!
//! This example shows the two pipeline hook points a host integrates:
//! 1. Publish a configuration snapshot
//! 2. Resolve the request context through providers
//! 3. Ask the pre-response hook for a redirect
//! 4. Let the post-response hook fix up redirects other code produced
//!
//! Run with: `cargo run --example redirect_flow`

use securepages::provider::{ConfigProvider, IdentityAliasResolver, StaticRoleProvider};
use securepages::web::{check_request, check_response, RequestAdapter};
use securepages::{ConfigStore, Method, OutgoingResponse, PatternSet, PolicyConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Step 1: the host's settings store publishes a snapshot.
    let store = ConfigStore::new(PolicyConfig {
        enabled: true,
        switch_back: true,
        secure_when_matched: true,
        debug: true,
        page_patterns: PatternSet::from_list(["/user", "/user/*", "/admin", "/admin/*"]),
        ignore_patterns: PatternSet::from_lines("*/autocomplete/*"),
        ..PolicyConfig::default()
    });
    let cfg = store.snapshot();
    println!("1. Published policy snapshot (switch-back enabled)");

    // Step 2: resolve a request context for GET /user/login over HTTP.
    let ctx = RequestAdapter::new(Method::Get, "/user/login")
        .host("example.com")
        .query("destination=/node/1")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());
    println!("2. Resolved context for GET {}", ctx.raw_path());

    // Step 3: pre-response hook.
    match check_request(&ctx, &cfg) {
        Some(target) => println!("3. Redirect issued: 302 -> {}", target),
        None => println!("3. Served in place"),
    }

    // A secure request for an unclaimed page switches back.
    let ctx = RequestAdapter::new(Method::Get, "/node")
        .host("example.com")
        .secure(true)
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());
    match check_request(&ctx, &cfg) {
        Some(target) => println!("   Switch-back: 302 -> {}", target),
        None => println!("   Served in place"),
    }

    // Step 4: post-response hook fixes a redirect the login flow made.
    let ctx = RequestAdapter::new(Method::Get, "/user")
        .host("example.com")
        .context(&IdentityAliasResolver, &StaticRoleProvider::default());
    let mut response = OutgoingResponse::redirect(302, "http://example.com/user/login");
    let rewritten = check_response(&ctx, &cfg, &mut response);
    println!(
        "4. Response fix-up (rewritten: {}): {} -> {:?}",
        rewritten,
        response.status(),
        response.location()
    );
}
