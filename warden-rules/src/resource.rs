//! Resource contract
//!
//! Anything placed under access control implements [`Resource`]: it exposes
//! a hierarchical identifier, may self-describe the action implied by the
//! current call context, and evaluates named conditions against a subject.
//!
//! Two ready-made adapters cover the common cases: [`EntityResource`] for
//! domain entities (`m:order.42`) and [`ControllerResource`] for request
//! handlers (`c:admin.users`).

use crate::subject::Subject;

/// Default actions carried by every entity resource.
pub const ENTITY_ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];

/// Contract implemented by anything placed under access control.
pub trait Resource {
    /// Hierarchical identifier with `.`-separated segments (e.g. `m:order.42`).
    ///
    /// A rule granting a prefix of this identifier also grants the resource
    /// itself: a rule on `m:order` authorizes `m:order.42`.
    fn resource_id(&self) -> String;

    /// The action implied by the current call context, if any.
    ///
    /// Consulted when a check is made without an explicit action. Entities
    /// typically return `None`; request handlers return the action currently
    /// being dispatched.
    fn default_action(&self) -> Option<String> {
        None
    }

    /// All actions that may be performed on this resource type.
    fn actions(&self) -> Vec<String>;

    /// Names of the conditions this resource type can evaluate.
    fn condition_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Evaluate a named condition for `subject`.
    ///
    /// A condition the resource does not define must fail, not pass: a rule
    /// referencing an unknown condition never grants access.
    fn evaluate_condition(&self, subject: &Subject, condition: &str) -> bool {
        let _ = (subject, condition);
        false
    }
}

/// Access-controlled domain entity.
///
/// Entities are identified as `m:{name}` for the type and `m:{name}.{key}`
/// for a specific instance, and carry the create/read/update/delete actions
/// plus any declared extras.
///
/// # Example
///
/// ```
/// use warden_rules::{EntityResource, Resource};
///
/// let order = EntityResource::new("order").with_key("42");
/// assert_eq!(order.resource_id(), "m:order.42");
/// assert!(order.actions().contains(&"update".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityResource {
    name: String,
    key: Option<String>,
    extra_actions: Vec<String>,
}

impl EntityResource {
    /// Create an entity resource for a type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            extra_actions: Vec::new(),
        }
    }

    /// Narrow to a specific instance.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Declare an action beyond the entity defaults.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.extra_actions.push(action.into());
        self
    }
}

impl Resource for EntityResource {
    fn resource_id(&self) -> String {
        match &self.key {
            Some(key) => format!("m:{}.{}", self.name, key),
            None => format!("m:{}", self.name),
        }
    }

    fn actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self.extra_actions.clone();
        actions.extend(ENTITY_ACTIONS.iter().map(|action| action.to_string()));
        actions
    }
}

/// Request-handler resource.
///
/// Handlers are identified as `c:{name}` (e.g. `c:admin.users`), declare
/// the actions they dispatch, and report the action currently being
/// performed so checks can omit an explicit action.
///
/// # Example
///
/// ```
/// use warden_rules::{ControllerResource, Resource};
///
/// let users = ControllerResource::new("admin.users")
///     .with_actions(["index", "edit"])
///     .with_current_action("edit");
///
/// assert_eq!(users.resource_id(), "c:admin.users");
/// assert_eq!(users.default_action(), Some("edit".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerResource {
    name: String,
    actions: Vec<String>,
    current_action: Option<String>,
}

impl ControllerResource {
    /// Create a handler resource.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
            current_action: None,
        }
    }

    /// Declare the actions this handler dispatches.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the action currently being performed.
    pub fn with_current_action(mut self, action: impl Into<String>) -> Self {
        self.current_action = Some(action.into());
        self
    }
}

impl Resource for ControllerResource {
    fn resource_id(&self) -> String {
        format!("c:{}", self.name)
    }

    fn default_action(&self) -> Option<String> {
        self.current_action.clone()
    }

    fn actions(&self) -> Vec<String> {
        self.actions.clone()
    }
}
