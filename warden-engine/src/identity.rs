//! Identity resolution
//!
//! The engine never authenticates. It consumes the subject resolved by the
//! hosting application and, for administration, resolves role names to
//! canonical role records.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use warden_rules::{Role, Subject};

use crate::error::AclResult;

/// Resolves the acting subject and the role catalog.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The subject performing the current operation.
    async fn current_subject(&self) -> Subject;

    /// Resolve a role name to its canonical record, if it exists.
    async fn role_by_name(&self, name: &str) -> AclResult<Option<Role>>;
}

/// Fixed identity provider.
///
/// Holds one subject and a role catalog in memory. This is suitable for
/// single-process applications and testing; hosts with real session state
/// implement [`IdentityProvider`] over their auth layer.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    subject: RwLock<Subject>,
    roles: RwLock<HashMap<String, Role>>,
}

impl StaticIdentityProvider {
    /// Provider with an anonymous subject and an empty role catalog.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Provider with a fixed subject.
    pub fn new(subject: Subject) -> Self {
        Self {
            subject: RwLock::new(subject),
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the current subject.
    pub async fn set_subject(&self, subject: Subject) {
        *self.subject.write().await = subject;
    }

    /// Add a role to the catalog.
    pub async fn define_role(&self, role: Role) {
        self.roles.write().await.insert(role.name.clone(), role);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_subject(&self) -> Subject {
        self.subject.read().await.clone()
    }

    async fn role_by_name(&self, name: &str) -> AclResult<Option<Role>> {
        Ok(self.roles.read().await.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_defaults_to_anonymous() {
        let identity = StaticIdentityProvider::anonymous();
        assert!(identity.current_subject().await.is_anonymous());
    }

    #[tokio::test]
    async fn test_set_subject() {
        let identity = StaticIdentityProvider::anonymous();
        let subject = Subject::authenticated(Uuid::now_v7(), vec![Role::new("editor")]);

        identity.set_subject(subject.clone()).await;
        assert_eq!(identity.current_subject().await, subject);
    }

    #[tokio::test]
    async fn test_role_catalog() {
        let identity = StaticIdentityProvider::anonymous();
        let editor = Role::new("editor");
        identity.define_role(editor.clone()).await;

        assert_eq!(identity.role_by_name("editor").await.unwrap(), Some(editor));
        assert_eq!(identity.role_by_name("admin").await.unwrap(), None);
    }
}
