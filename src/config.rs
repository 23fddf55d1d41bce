//! Policy configuration snapshots.
//!
//! A [`PolicyConfig`] is an immutable view of the rule set used for one
//! request evaluation. Concurrent requests share a snapshot; writers
//! publish a replacement through [`ConfigStore`] rather than mutating
//! fields in place, so the read path needs no locking beyond one
//! reference-count bump.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigViolation, ConfigViolationKind};
use crate::matcher::PatternSet;
use crate::provider::ConfigProvider;

/// The rule set governing scheme enforcement, frozen for one evaluation.
///
/// Fields map one-to-one to the flat key/value record the host's
/// configuration store persists; `serde` defaults let partial records
/// load cleanly.
///
/// # Examples
///
/// ```
/// use securepages::{PatternSet, PolicyConfig};
///
/// let cfg = PolicyConfig {
///     enabled: true,
///     page_patterns: PatternSet::from_lines("/admin\n/admin/*"),
///     ..PolicyConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Master switch; when false the engine always returns no opinion.
    pub enabled: bool,
    /// Downgrade non-matching secure requests back to the insecure scheme.
    pub switch_back: bool,
    /// Absolute origin used when materializing secure URLs; empty means
    /// "use the request's own origin".
    pub secure_base_url: String,
    /// Absolute origin used when materializing insecure URLs; empty means
    /// "use the request's own origin".
    pub insecure_base_url: String,
    /// Patterns defining the protected-page set.
    pub page_patterns: PatternSet,
    /// Patterns exempt from policy; the current scheme is left as-is.
    pub ignore_patterns: PatternSet,
    /// Form identifiers that must always post to the secure scheme.
    pub form_patterns: PatternSet,
    /// Polarity: true means page patterns list pages that MUST be
    /// secure; false means they list pages that must NOT be secure.
    pub secure_when_matched: bool,
    /// Roles that force the secure scheme regardless of path.
    pub privileged_roles: BTreeSet<String>,
    /// Verbose decision logging; observability only, never affects the
    /// verdict.
    pub debug: bool,
}

impl PolicyConfig {
    /// Validates the configured base URLs.
    ///
    /// A non-empty base URL must be an absolute origin carrying the
    /// scheme its field implies (`https://` for `secure_base_url`,
    /// `http://` for `insecure_base_url`). Empty base URLs are valid
    /// and mean "fall back to the request's own origin".
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigViolation`] for the first field that fails.
    pub fn validate(&self) -> Result<(), ConfigViolation> {
        validate_base(&self.secure_base_url, "secure_base_url", "https://")?;
        validate_base(&self.insecure_base_url, "insecure_base_url", "http://")?;
        Ok(())
    }
}

/// Checks one base-URL field against its expected scheme prefix.
fn validate_base(
    value: &str,
    field: &'static str,
    scheme_prefix: &str,
) -> Result<(), ConfigViolation> {
    if value.is_empty() {
        return Ok(());
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigViolation::new(
            ConfigViolationKind::InvalidBaseUrl { field },
            format!("'{}' is not an absolute http(s) origin", value),
        ));
    }
    if !value.starts_with(scheme_prefix) {
        return Err(ConfigViolation::new(
            ConfigViolationKind::SchemeMismatch { field },
            format!("'{}' must start with {}", value, scheme_prefix),
        ));
    }
    // The origin must not carry a path component beyond a trailing slash.
    let rest = &value[scheme_prefix.len()..];
    let authority = rest.trim_end_matches('/');
    if authority.is_empty() || authority.contains('/') {
        return Err(ConfigViolation::new(
            ConfigViolationKind::InvalidBaseUrl { field },
            format!("'{}' must be an origin with no path component", value),
        ));
    }
    Ok(())
}

/// Atomically published configuration snapshots.
///
/// `ConfigStore` is the reference implementation of
/// [`ConfigProvider`]: readers take a cheap `Arc` clone of the current
/// snapshot and keep it for the life of their request; writers swap in
/// a whole new snapshot. In-flight requests are never affected by a
/// publish.
///
/// # Examples
///
/// ```
/// use securepages::{ConfigStore, PolicyConfig};
/// use securepages::provider::ConfigProvider;
///
/// let store = ConfigStore::new(PolicyConfig::default());
/// let before = store.snapshot();
///
/// store.publish(PolicyConfig {
///     enabled: true,
///     ..PolicyConfig::default()
/// });
///
/// assert!(!before.enabled); // old snapshot untouched
/// assert!(store.snapshot().enabled);
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<PolicyConfig>>,
}

impl ConfigStore {
    /// Creates a store holding the given initial snapshot.
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Replaces the current snapshot.
    ///
    /// Readers that already hold a snapshot keep it; only requests that
    /// start after the publish observe the new configuration.
    pub fn publish(&self, config: PolicyConfig) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Arc::new(config);
    }
}

impl ConfigProvider for ConfigStore {
    fn snapshot(&self) -> Arc<PolicyConfig> {
        self.current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
