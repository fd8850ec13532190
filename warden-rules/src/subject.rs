//! Subjects and roles
//!
//! This module models the caller being evaluated by an access check:
//! either an anonymous visitor, or an authenticated identity holding the
//! role memberships resolved by the identity provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role held by an authenticated subject.
///
/// Roles are opaque to the engine: rules reference them by id, and the
/// identity provider owns the catalog of which roles exist.
///
/// # Example
///
/// ```
/// use warden_rules::Role;
///
/// let role = Role::new("editor");
/// assert_eq!(role.name, "editor");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Role {
    /// Unique role ID.
    pub id: Uuid,

    /// Role name (e.g. "editor").
    pub name: String,
}

impl Role {
    /// Create a new role with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
        }
    }

    /// Create a role with a known id.
    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The caller being evaluated by an access check.
///
/// Resolved once per decision by the identity provider and immutable for
/// the duration of the check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Subject {
    /// Unauthenticated caller.
    #[default]
    Anonymous,

    /// Authenticated identity with its role memberships.
    Authenticated {
        /// User ID.
        user_id: Uuid,
        /// Roles held by the user.
        roles: Vec<Role>,
    },
}

impl Subject {
    /// Create an authenticated subject.
    pub fn authenticated(user_id: Uuid, roles: Vec<Role>) -> Self {
        Self::Authenticated { user_id, roles }
    }

    /// Check whether the subject is anonymous.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Subject::Anonymous)
    }

    /// Roles held by the subject (empty for anonymous callers).
    pub fn roles(&self) -> &[Role] {
        match self {
            Subject::Anonymous => &[],
            Subject::Authenticated { roles, .. } => roles,
        }
    }

    /// Sorted, deduplicated role ids.
    ///
    /// Two subjects with the same memberships produce the same vector,
    /// which makes it usable as a cache key.
    pub fn role_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.roles().iter().map(|role| role.id).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Check whether the subject holds a role by name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles().iter().any(|role| role.name == name)
    }
}
