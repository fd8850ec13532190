//! Rule persistence boundary
//!
//! This module defines the [`RuleStore`] trait the engine and
//! administration depend on, the [`RuleCriteria`] used to select stored
//! rules, and an in-memory backend for single-process applications and
//! testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use warden_rules::Rule;

use crate::error::AclResult;

/// Role scoping for store queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleScope {
    /// Do not filter by role.
    #[default]
    Any,

    /// Rules that apply to everyone (no role attached).
    Everyone,

    /// Rules attached to a specific role.
    Role(Uuid),
}

impl RoleScope {
    /// Scope for an optional role id (`None` selects the everyone rules).
    pub fn from_role_id(role_id: Option<Uuid>) -> Self {
        match role_id {
            Some(id) => RoleScope::Role(id),
            None => RoleScope::Everyone,
        }
    }

    /// Check whether a rule falls inside this scope.
    pub fn matches(&self, rule: &Rule) -> bool {
        match self {
            RoleScope::Any => true,
            RoleScope::Everyone => rule.role_id.is_none(),
            RoleScope::Role(id) => rule.role_id == Some(*id),
        }
    }
}

/// Criteria selecting stored rules for deletion or lookup.
///
/// An unset field is not applied as a filter. The resource filter matches
/// exactly, or also strict descendants (`pattern.%`) when
/// `include_descendants` is set, which is how a broader grant finds the
/// narrower rules it shadows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCriteria {
    /// Role scope filter.
    pub scope: RoleScope,

    /// Resource pattern filter.
    pub resource: Option<String>,

    /// Extend the resource filter to strict descendants.
    pub include_descendants: bool,

    /// Action filter.
    pub action: Option<String>,

    /// Condition filter.
    pub condition: Option<String>,
}

impl RuleCriteria {
    /// Criteria covering a whole role scope.
    pub fn scoped(scope: RoleScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    /// Filter on a resource pattern.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Also match strict descendants of the resource pattern.
    pub fn with_descendants(mut self) -> Self {
        self.include_descendants = true;
        self
    }

    /// Filter on an action.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Filter on a condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Check whether `rule` satisfies every set filter.
    pub fn matches(&self, rule: &Rule) -> bool {
        if !self.scope.matches(rule) {
            return false;
        }

        if let Some(resource) = &self.resource {
            let matched = match rule.resource.as_deref() {
                Some(stored) => {
                    stored == resource
                        || (self.include_descendants
                            && stored
                                .strip_prefix(resource.as_str())
                                .map_or(false, |rest| rest.starts_with('.')))
                }
                None => false,
            };
            if !matched {
                return false;
            }
        }

        if let Some(action) = &self.action {
            if rule.action.as_deref() != Some(action.as_str()) {
                return false;
            }
        }

        if let Some(condition) = &self.condition {
            if rule.condition.as_deref() != Some(condition.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Persistence boundary for access rules.
///
/// Implementations must support the prefix-style resource matching of
/// [`RuleCriteria`] so a broader grant can prune the rules it shadows.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// All rules attached to one of `role_ids`, plus the everyone rules
    /// when `include_everyone` is set.
    async fn rules_for(&self, role_ids: &[Uuid], include_everyone: bool) -> AclResult<Vec<Rule>>;

    /// Persist a new rule.
    async fn insert(&self, rule: Rule) -> AclResult<Rule>;

    /// Delete every rule matching `criteria`, returning the count.
    async fn delete(&self, criteria: &RuleCriteria) -> AclResult<u64>;

    /// Find a single rule matching `criteria`.
    async fn find_one(&self, criteria: &RuleCriteria) -> AclResult<Option<Rule>>;

    /// Delete every rule matching `criteria` and insert `rule` in one
    /// atomic step.
    ///
    /// A concurrent decision check must observe either the old rule set or
    /// the new one, never the window in between. Transactional backends
    /// should run both statements in a single transaction.
    async fn replace(&self, criteria: &RuleCriteria, rule: Rule) -> AclResult<Rule>;
}

/// In-memory rule store.
///
/// This is suitable for single-process applications and testing. Durable
/// deployments implement [`RuleStore`] over their database.
#[cfg(feature = "memory")]
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Arc<RwLock<Vec<Rule>>>,
}

#[cfg(feature = "memory")]
impl MemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rules.
    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    /// Check if the store holds no rules.
    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }
}

#[cfg(feature = "memory")]
#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn rules_for(&self, role_ids: &[Uuid], include_everyone: bool) -> AclResult<Vec<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|rule| match rule.role_id {
                None => include_everyone,
                Some(id) => role_ids.contains(&id),
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, rule: Rule) -> AclResult<Rule> {
        let mut rules = self.rules.write().await;
        rules.push(rule.clone());
        Ok(rule)
    }

    async fn delete(&self, criteria: &RuleCriteria) -> AclResult<u64> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|rule| !criteria.matches(rule));
        Ok((before - rules.len()) as u64)
    }

    async fn find_one(&self, criteria: &RuleCriteria) -> AclResult<Option<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules.iter().find(|rule| criteria.matches(rule)).cloned())
    }

    async fn replace(&self, criteria: &RuleCriteria, rule: Rule) -> AclResult<Rule> {
        // One write guard covers both steps; readers never observe the gap
        // between the prune and the insert.
        let mut rules = self.rules.write().await;
        rules.retain(|existing| !criteria.matches(existing));
        rules.push(rule.clone());
        Ok(rule)
    }
}
