//! # Warden Rules
//!
//! Access rule model and resource contracts for the Warden ACL crates.
//!
//! ## Overview
//!
//! The warden-rules crate holds the pure type layer of the ACL:
//! - **Rules**: stored permissive statements and the matching algorithm
//! - **Subjects**: anonymous callers or authenticated identities with roles
//! - **Resources**: the contract implemented by anything under access
//!   control, plus ready-made entity and handler adapters
//!
//! ## Rule Anatomy
//!
//! ```text
//! Rule = [role] + [resource prefix] + [action] + [condition]
//!
//! Examples:
//!   {editor, m:post, update}              - editors may update posts
//!   {editor, m:post.7, update, owned}     - ...post 7, if "owned" holds
//!   {-, c:admin, -}                       - everyone, everything under c:admin
//! ```
//!
//! Every field is optional. An absent role means the rule applies to
//! everyone, including unauthenticated callers; an absent resource matches
//! every resource; an absent action matches every action. Resource matching
//! walks the dot hierarchy: a rule on `m:post` also covers `m:post.7`.
//!
//! ## Usage
//!
//! ```rust
//! use uuid::Uuid;
//! use warden_rules::{EntityResource, Role, Rule, Subject};
//!
//! let editor = Role::new("editor");
//! let subject = Subject::authenticated(Uuid::now_v7(), vec![editor.clone()]);
//!
//! // "editor may update anything under m:post"
//! let rule = Rule::new(Some(editor.id))
//!     .with_resource("m:post")
//!     .with_action("update");
//!
//! let post = EntityResource::new("post").with_key("7");
//! assert!(rule.allows(&post, Some("update"), &subject));
//! assert!(!rule.allows(&post, Some("delete"), &subject));
//! ```
//!
//! ## Integration with warden-engine
//!
//! The `warden-engine` crate layers the rule store, the per-role-set rule
//! cache, the decision engine, and grant/revoke administration on top of
//! these types.

pub mod resource;
pub mod rule;
pub mod subject;

// Re-export main types for convenience
pub use resource::{ControllerResource, EntityResource, Resource, ENTITY_ACTIONS};
pub use rule::{resource_matches, Rule};
pub use subject::{Role, Subject};
