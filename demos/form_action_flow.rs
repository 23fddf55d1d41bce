//! Form action scheme selection demonstration.
//!
//! Shows how a page's self-referential form action is resolved at
//! render time: page rules, privileged roles, and the form-id list
//! each force the secure scheme, and the result depends on the current
//! request so it must never be cached across users.
//!
//! Run with: `cargo run --example form_action_flow`

use std::collections::BTreeSet;

use securepages::{Method, OutboundUrlBuilder, PatternSet, PolicyConfig, RequestContext};

fn main() {
    let cfg = PolicyConfig {
        enabled: true,
        secure_when_matched: true,
        secure_base_url: "https://secure.example.com".to_string(),
        insecure_base_url: "http://www.example.com".to_string(),
        page_patterns: PatternSet::from_lines("/user\n/user/*"),
        form_patterns: PatternSet::from_lines("checkout_*"),
        privileged_roles: ["administrator".to_string()].into_iter().collect(),
        ..PolicyConfig::default()
    };

    // Anonymous visitor rendering the login page over HTTP: the page
    // rule forces the action onto the secure base.
    let ctx = RequestContext::new("/user/login", "/user/login", Method::Get)
        .with_host("www.example.com");
    let urls = OutboundUrlBuilder::new(&cfg, &ctx);
    println!(
        "login form on /user/login  -> {}",
        urls.form_action("user_login_form")
    );

    // Anonymous visitor on an unprotected page: a checkout form is
    // forced secure by the form-id list, a search form is not.
    let ctx =
        RequestContext::new("/node/9", "/node/9", Method::Get).with_host("www.example.com");
    let urls = OutboundUrlBuilder::new(&cfg, &ctx);
    println!(
        "checkout form on /node/9   -> {}",
        urls.form_action("checkout_payment")
    );
    println!(
        "search form on /node/9     -> {}",
        urls.form_action("search_form")
    );

    // An administrator gets the secure action everywhere.
    let mut roles = BTreeSet::new();
    roles.insert("administrator".to_string());
    let ctx = RequestContext::new("/node/9", "/node/9", Method::Get)
        .with_host("www.example.com")
        .with_roles(roles);
    let urls = OutboundUrlBuilder::new(&cfg, &ctx);
    println!(
        "search form as admin      -> {}",
        urls.form_action("search_form")
    );
}
