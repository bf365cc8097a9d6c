//! Caller permissions consumed by the serializers.
//!
//! The permission store itself lives elsewhere; serializers only ever ask a
//! [`SecurityContext`] yes/no questions about an [`Action`].

use std::fmt;
use std::sync::Arc;

/// An action a caller may be permitted to perform on the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read audit entries at all
    AuditRead,
    /// Read audit entries including sensitive fields (snapshots, request bodies)
    AuditReadFull,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::AuditRead => write!(f, "audit_read"),
            Action::AuditReadFull => write!(f, "audit_read_full"),
        }
    }
}

/// The caller's permission-checking capability.
///
/// A context is borrowed for the duration of one `serialize` call and is
/// shared across request threads, hence the `Send + Sync` bound.
pub trait SecurityContext: Send + Sync {
    /// Returns `true` if the caller may perform `action`.
    fn check_permission(&self, action: Action) -> bool;
}

impl<T: SecurityContext + ?Sized> SecurityContext for &T {
    fn check_permission(&self, action: Action) -> bool {
        (**self).check_permission(action)
    }
}

impl<T: SecurityContext + ?Sized> SecurityContext for Arc<T> {
    fn check_permission(&self, action: Action) -> bool {
        (**self).check_permission(action)
    }
}

/// A security context holding an explicit list of granted actions.
///
/// # Examples
///
/// ```
/// use audit_serializer::{Action, PermissionSet, SecurityContext};
///
/// let perms = PermissionSet::new()
///     .grant(Action::AuditRead)
///     .grant(Action::AuditRead); // deduplicated
///
/// assert_eq!(perms.len(), 1);
/// assert!(perms.check_permission(Action::AuditRead));
/// assert!(!perms.check_permission(Action::AuditReadFull));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    granted: Vec<Action>,
}

impl PermissionSet {
    /// Creates a context with no permissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants an action, ignoring duplicates.
    pub fn grant(mut self, action: Action) -> Self {
        if !self.granted.contains(&action) {
            self.granted.push(action);
        }
        self
    }

    /// Returns the number of distinct granted actions.
    pub fn len(&self) -> usize {
        self.granted.len()
    }

    /// Returns `true` if nothing has been granted.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl SecurityContext for PermissionSet {
    fn check_permission(&self, action: Action) -> bool {
        self.granted.contains(&action)
    }
}

/// Context for internal callers; every action is permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSecurityContext;

impl SecurityContext for SystemSecurityContext {
    fn check_permission(&self, _action: Action) -> bool {
        true
    }
}
