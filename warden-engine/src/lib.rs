//! # Warden Engine
//!
//! Access decision engine and rule administration for the Warden ACL
//! crates.
//!
//! ## Overview
//!
//! The warden-engine crate layers the runtime on top of the `warden-rules`
//! type layer:
//! - **Rule Store**: the persistence boundary, with an in-memory backend
//! - **Rule Cache**: lazily-built per-role-set indexes, invalidated on
//!   every mutation
//! - **Access Engine**: typed grant/deny decisions with deadline support
//! - **Rule Admin**: grant/revoke with shadowed-rule pruning
//! - **Resource Directory**: startup-time registry of protected resource
//!   types for management tooling
//!
//! ## Features
//!
//! - `memory` (default): in-memory rule store for single-process apps
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use warden_engine::{Acl, AclResult, RuleSpec, StaticIdentityProvider};
//! use warden_rules::{EntityResource, Role, Subject};
//!
//! async fn example() -> AclResult<()> {
//!     let identity = Arc::new(StaticIdentityProvider::anonymous());
//!     let editor = Role::new("editor");
//!     identity.define_role(editor.clone()).await;
//!     identity
//!         .set_subject(Subject::authenticated(Uuid::now_v7(), vec![editor]))
//!         .await;
//!
//!     let acl = Acl::in_memory(identity);
//!
//!     // "editor may update anything under m:post"
//!     acl.grant(
//!         RuleSpec::role("editor")
//!             .with_resource("m:post")
//!             .with_action("update"),
//!     )
//!     .await?;
//!
//!     let post = EntityResource::new("post").with_key("7");
//!     assert!(acl.allowed(&post, Some("update")).await?);
//!     assert!(!acl.allowed(&post, Some("delete")).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Decisions, not exceptions
//!
//! [`AccessEngine::check`] returns a typed [`Decision`]: granted, or a
//! denial that distinguishes `Unauthenticated` (anonymous caller, prompt
//! for login) from `Forbidden` (authenticated caller, no matching rule).
//! Store failures are errors, never silent denials, so callers can tell
//! "you may not do this" from "the system could not decide".

pub mod admin;
pub mod cache;
pub mod directory;
pub mod engine;
pub mod error;
pub mod identity;
pub mod store;

use std::sync::Arc;

use warden_rules::{Resource, Rule};

// Re-export main types for convenience
pub use admin::{RuleAdmin, RuleSpec};
pub use cache::{RuleCache, RuleIndex};
pub use directory::{ResourceDirectory, ResourceEntry};
pub use engine::{AccessEngine, Decision, Denial, DenialKind};
pub use error::{AclError, AclResult};
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use store::{RoleScope, RuleCriteria, RuleStore};

#[cfg(feature = "memory")]
pub use store::MemoryRuleStore;

/// One-stop handle bundling the decision engine, rule administration, and
/// the resource directory over shared collaborators.
pub struct Acl {
    /// Decision engine.
    pub engine: AccessEngine,

    /// Grant/revoke administration.
    pub admin: RuleAdmin,

    /// Registry of protected resource types.
    pub directory: ResourceDirectory,

    cache: Arc<RuleCache>,
}

impl Acl {
    /// Wire an ACL over a rule store and an identity provider.
    ///
    /// The engine and the administration share one rule cache, so every
    /// grant or revoke is observed by the very next check.
    pub fn new(store: Arc<dyn RuleStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        let cache = Arc::new(RuleCache::new(store.clone()));
        Self {
            engine: AccessEngine::new(identity.clone(), cache.clone()),
            admin: RuleAdmin::new(store, identity, cache.clone()),
            directory: ResourceDirectory::new(),
            cache,
        }
    }

    /// Wire an ACL over the in-memory rule store.
    #[cfg(feature = "memory")]
    pub fn in_memory(identity: Arc<dyn IdentityProvider>) -> Self {
        Self::new(Arc::new(MemoryRuleStore::new()), identity)
    }

    /// Check whether the current subject may perform `action` on
    /// `resource`.
    pub async fn check(&self, resource: &dyn Resource, action: Option<&str>) -> AclResult<Decision> {
        self.engine.check(resource, action).await
    }

    /// Boolean convenience wrapper around [`check`](Self::check).
    pub async fn allowed(&self, resource: &dyn Resource, action: Option<&str>) -> AclResult<bool> {
        self.engine.allowed(resource, action).await
    }

    /// Grant access and return the stored rule.
    pub async fn grant(&self, spec: RuleSpec) -> AclResult<Rule> {
        self.admin.grant(spec).await
    }

    /// Revoke access.
    pub async fn revoke(&self, spec: RuleSpec) -> AclResult<()> {
        self.admin.revoke(spec).await
    }

    /// Drop the cached rule indexes, forcing a reload on the next check.
    /// Useful after out-of-band rule edits.
    pub async fn reset(&self) {
        self.cache.invalidate().await;
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use warden_rules::{ControllerResource, Subject};

    #[tokio::test]
    async fn test_facade_wires_shared_cache() {
        let identity = Arc::new(StaticIdentityProvider::new(Subject::Anonymous));
        let acl = Acl::in_memory(identity);

        let users = ControllerResource::new("admin.users");
        assert!(!acl.allowed(&users, Some("index")).await.unwrap());

        acl.grant(RuleSpec::everyone().with_resource("c:admin.users"))
            .await
            .unwrap();
        assert!(acl.allowed(&users, Some("index")).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_reloads_out_of_band_edits() {
        let store = Arc::new(MemoryRuleStore::new());
        let identity = Arc::new(StaticIdentityProvider::new(Subject::Anonymous));
        let acl = Acl::new(store.clone(), identity);

        let users = ControllerResource::new("admin.users");
        assert!(!acl.allowed(&users, Some("index")).await.unwrap());

        // Rule written behind the facade's back.
        store
            .insert(Rule::new(None).with_resource("c:admin.users"))
            .await
            .unwrap();
        assert!(!acl.allowed(&users, Some("index")).await.unwrap());

        acl.reset().await;
        assert!(acl.allowed(&users, Some("index")).await.unwrap());
    }
}
