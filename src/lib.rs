//! HTTP(S) scheme-enforcement policy engine.
//!
//! Given an incoming request (path, method, security-context flags)
//! and a declarative rule set, this crate decides whether the request
//! should be served over the secure or insecure transport, and decides
//! the scheme of outbound links and form actions emitted at render
//! time. The core is pure decision logic:
//!
//! - **Pattern matching**: wildcard path lists for protected pages,
//!   exempt pages, and always-secure forms
//! - **Role override**: privileged roles force the secure scheme on
//!   every path
//! - **Switch-back**: optionally downgrade secure requests no rule
//!   claims
//! - **Redirect fix-up**: rewrite redirect targets other subsystems
//!   produced when they disagree with policy
//!
//! # Core Types
//!
//! - [`PolicyConfig`]: immutable rule-set snapshot for one evaluation
//! - [`RequestContext`]: read-only per-request descriptor
//! - [`decide`]: the decision engine, returning a [`Decision`]
//! - [`OutboundUrlBuilder`]: scheme-aware absolute URL construction
//! - [`rewrite_redirect`]: post-response redirect target fix-up
//!
//! Persistence, the settings UI, session handling, and the HTTPS
//! self-test probe stay outside this crate behind the traits in
//! [`provider`].
//!
//! # Examples
//!
//! ```
//! use securepages::{decide, Decision, Method, PatternSet, PolicyConfig, RequestContext};
//!
//! let cfg = PolicyConfig {
//!     enabled: true,
//!     switch_back: true,
//!     secure_when_matched: true,
//!     page_patterns: PatternSet::from_lines("/user\n/user/*\n/admin\n/admin/*"),
//!     ..PolicyConfig::default()
//! };
//!
//! // A protected page reached over plain HTTP must move to HTTPS.
//! let ctx = RequestContext::new("/user/login", "/user/login", Method::Get);
//! assert_eq!(decide(&ctx, &cfg), Decision::ForceSecure);
//!
//! // An unclaimed page reached over HTTPS switches back.
//! let ctx = RequestContext::new("/node", "/node", Method::Get).with_secure(true);
//! assert_eq!(decide(&ctx, &cfg), Decision::ForceInsecure);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod decision;
mod error;
mod matcher;
pub mod provider;
mod rewrite;
mod urls;
pub mod web;

pub use config::{ConfigStore, PolicyConfig};
pub use context::{Method, RequestContext};
pub use decision::{decide, match_form_id, match_path, matches_privileged_role};
pub use decision::{Decision, PageVerdict};
pub use error::{ConfigViolation, ConfigViolationKind, Error, ProviderError};
pub use matcher::PatternSet;
pub use rewrite::{rewrite_redirect, OutgoingResponse};
pub use urls::{OutboundUrlBuilder, UrlScheme};
