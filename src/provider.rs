//! External collaborator contracts.
//!
//! The decision core consumes three host services but implements none
//! of them: a configuration snapshot source, a path alias resolver,
//! and a current-user role lookup. Hosts implement these traits over
//! their own storage, routing, and session machinery; the crate ships
//! [`crate::ConfigStore`] as the reference [`ConfigProvider`] and an
//! identity [`AliasResolver`] for hosts without aliasing.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::PolicyConfig;
use crate::error::ProviderError;

/// Source of the current configuration snapshot.
///
/// `snapshot()` must be atomic: a returned snapshot never changes,
/// even if the host saves new settings while a request is in flight.
pub trait ConfigProvider {
    /// Returns the current immutable configuration snapshot.
    fn snapshot(&self) -> Arc<PolicyConfig>;
}

/// Resolves a request path to its public alias.
///
/// Pattern lists are written against both internal paths and their
/// aliases, so the engine compares both forms. A resolver failure is
/// not fatal: the web adapter falls back to treating the path as its
/// own alias and logs a warning.
pub trait AliasResolver {
    /// Resolves the alias for `path`.
    ///
    /// Returns the path unchanged when it has no alias.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the alias backend fails.
    fn resolve_alias(&self, path: &str) -> Result<String, ProviderError>;
}

/// Looks up the roles of the user issuing the current request.
///
/// A lookup failure is not fatal: the web adapter falls back to the
/// empty role set (no privileged-role forcing) and logs a warning.
pub trait RoleProvider {
    /// Returns the current user's role identifiers.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the session/user backend fails.
    fn current_roles(&self) -> Result<BTreeSet<String>, ProviderError>;
}

/// Alias resolver for hosts without path aliasing: every path is its
/// own alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAliasResolver;

impl AliasResolver for IdentityAliasResolver {
    fn resolve_alias(&self, path: &str) -> Result<String, ProviderError> {
        Ok(path.to_string())
    }
}

/// Role provider backed by a fixed role set, useful for tests and for
/// hosts that resolve roles ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleProvider {
    roles: BTreeSet<String>,
}

impl StaticRoleProvider {
    /// Creates a provider that always reports the given roles.
    pub fn new(roles: BTreeSet<String>) -> Self {
        Self { roles }
    }
}

impl RoleProvider for StaticRoleProvider {
    fn current_roles(&self) -> Result<BTreeSet<String>, ProviderError> {
        Ok(self.roles.clone())
    }
}
