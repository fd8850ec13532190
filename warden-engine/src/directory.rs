//! Resource directory
//!
//! Administrative registry of the protected resource types known to the
//! hosting application. Resource types register their metadata at startup;
//! nothing here sits on the decision hot path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use warden_rules::Resource;

/// Declared metadata for one protected resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Type-level resource identifier (e.g. `m:post`).
    pub resource_id: String,

    /// Actions the resource type declares.
    pub actions: Vec<String>,

    /// Condition names the resource type can evaluate.
    pub conditions: Vec<String>,
}

/// Registry of protected resource types, for management tooling.
#[derive(Debug, Default)]
pub struct ResourceDirectory {
    entries: RwLock<BTreeMap<String, ResourceEntry>>,
}

impl ResourceDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type from a live instance.
    pub async fn register(&self, resource: &dyn Resource) {
        self.register_entry(ResourceEntry {
            resource_id: resource.resource_id(),
            actions: resource.actions(),
            conditions: resource.condition_names(),
        })
        .await;
    }

    /// Register declared metadata directly.
    pub async fn register_entry(&self, entry: ResourceEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.resource_id.clone(), entry);
    }

    /// Metadata for one resource id.
    pub async fn get(&self, resource_id: &str) -> Option<ResourceEntry> {
        self.entries.read().await.get(resource_id).cloned()
    }

    /// All registered resource ids.
    pub async fn resource_ids(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// The full catalog.
    pub async fn all(&self) -> Vec<ResourceEntry> {
        self.entries.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_rules::{ControllerResource, EntityResource};

    #[tokio::test]
    async fn test_register_and_lookup() {
        let directory = ResourceDirectory::new();
        directory.register(&EntityResource::new("post")).await;
        directory
            .register(
                &ControllerResource::new("admin.users").with_actions(["index", "edit"]),
            )
            .await;

        let entry = directory.get("m:post").await.expect("registered entry");
        assert!(entry.actions.contains(&"update".to_string()));
        assert!(entry.conditions.is_empty());

        assert!(directory.get("m:order").await.is_none());
    }

    #[tokio::test]
    async fn test_listing() {
        let directory = ResourceDirectory::new();
        directory.register(&EntityResource::new("post")).await;
        directory.register(&ControllerResource::new("admin.users")).await;

        assert_eq!(directory.resource_ids().await, vec!["c:admin.users", "m:post"]);
        assert_eq!(directory.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_reregistration_replaces_entry() {
        let directory = ResourceDirectory::new();
        directory.register(&EntityResource::new("post")).await;
        directory
            .register(&EntityResource::new("post").with_action("publish"))
            .await;

        let entry = directory.get("m:post").await.expect("registered entry");
        assert!(entry.actions.contains(&"publish".to_string()));
        assert_eq!(directory.all().await.len(), 1);
    }
}
