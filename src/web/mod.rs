//! Host pipeline integration surface.
//!
//! This module is the boundary between an HTTP framework and the
//! decision core. It handles:
//! - Mapping raw request primitives to a [`crate::RequestContext`]
//! - Absorbing collaborator failures into safe defaults
//! - The two pipeline hook points: pre-response redirect and
//!   post-response redirect fix-up
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: nothing in here names a specific
//!    framework. Hosts feed in primitives they have already extracted
//!    (method, scheme, XHR header presence, raw path, query, host).
//!
//! 2. **Safe Defaults at the Boundary**: an alias resolver or role
//!    provider failure degrades to "path is its own alias" / "no
//!    roles" with a warning; the core never sees the error.
//!
//! 3. **Explicit Context**: no global state. The configuration
//!    snapshot and request context flow through values.
//!
//! # Integration Model
//!
//! The host pipeline calls exactly two functions at well-defined
//! lifecycle moments:
//!
//! ```text
//! HTTP request
//!   ↓
//! Host builds RequestAdapter, resolves context via providers
//!   ↓
//! check_request() → Some(url): host emits its 301/302 and stops
//!                 → None: normal response generation continues
//!   ↓
//! Response produced (may itself be a redirect, e.g. a login flow)
//!   ↓
//! check_response() fixes up a redirect target that disagrees
//!   ↓
//! Response sent
//! ```

mod adapter;
mod hooks;

pub use adapter::RequestAdapter;
pub use hooks::{check_request, check_response};
