//! Rule administration
//!
//! Grant and revoke mutate the rule store and keep the rule set tidy:
//! granting a broader rule deletes the narrower rules it shadows, and every
//! mutation invalidates the rule cache so the next check observes it.

use std::sync::Arc;

use warden_rules::Rule;

use crate::cache::RuleCache;
use crate::error::{AclError, AclResult};
use crate::identity::IdentityProvider;
use crate::store::{RoleScope, RuleCriteria, RuleStore};

/// Scope and filters for a grant or revoke.
///
/// # Example
///
/// ```
/// use warden_engine::RuleSpec;
///
/// let spec = RuleSpec::role("editor")
///     .with_resource("m:post")
///     .with_action("update");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSpec {
    /// Role name; `None` targets the everyone scope.
    pub role: Option<String>,

    /// Resource prefix.
    pub resource: Option<String>,

    /// Action name.
    pub action: Option<String>,

    /// Condition name.
    pub condition: Option<String>,

    /// Description stored with a granted rule.
    pub description: Option<String>,
}

impl RuleSpec {
    /// Spec targeting everyone, including unauthenticated callers.
    pub fn everyone() -> Self {
        Self::default()
    }

    /// Spec targeting a named role.
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            role: Some(name.into()),
            ..Self::default()
        }
    }

    /// Restrict to a resource prefix.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Restrict to an action.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Require a named condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reject structurally invalid field values. Absence is expressed with
    /// `None`, never with an empty string.
    fn validate(&self) -> AclResult<()> {
        for (field, value) in [
            ("role", &self.role),
            ("resource", &self.resource),
            ("action", &self.action),
            ("condition", &self.condition),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(AclError::InvalidRule(format!("{field} must not be blank")));
                }
            }
        }
        Ok(())
    }
}

/// Grant/revoke operations over the rule store.
pub struct RuleAdmin {
    store: Arc<dyn RuleStore>,
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<RuleCache>,
}

impl RuleAdmin {
    /// Create an administration handle sharing the engine's cache.
    pub fn new(
        store: Arc<dyn RuleStore>,
        identity: Arc<dyn IdentityProvider>,
        cache: Arc<RuleCache>,
    ) -> Self {
        Self {
            store,
            identity,
            cache,
        }
    }

    /// Grant access per `spec` and return the stored rule.
    ///
    /// Rules shadowed by the new grant are deleted in the same store
    /// operation: rules in the same role scope whose resource equals the
    /// new pattern or is a strict descendant of it, further filtered by
    /// the new action and condition when those are set. A grant with no
    /// resource pattern replaces every rule in the role scope. A narrower
    /// rule carrying a condition is still deleted by a broader
    /// unconditional grant; the store never keeps both.
    pub async fn grant(&self, spec: RuleSpec) -> AclResult<Rule> {
        spec.validate()?;

        let role_id = match &spec.role {
            Some(name) => {
                let role = self
                    .identity
                    .role_by_name(name)
                    .await?
                    .ok_or_else(|| AclError::UnknownRole(name.clone()))?;
                Some(role.id)
            }
            None => None,
        };

        let mut rule = Rule::new(role_id);
        rule.resource = spec.resource.clone();
        rule.action = spec.action.clone();
        rule.condition = spec.condition.clone();
        rule.description = spec.description.clone();

        let mut criteria = RuleCriteria::scoped(RoleScope::from_role_id(role_id));
        if let Some(resource) = &spec.resource {
            criteria = criteria.with_resource(resource.clone()).with_descendants();
        }
        if let Some(action) = &spec.action {
            criteria = criteria.with_action(action.clone());
        }
        if let Some(condition) = &spec.condition {
            criteria = criteria.with_condition(condition.clone());
        }

        let rule = self.store.replace(&criteria, rule).await?;
        self.cache.invalidate().await;

        tracing::info!(
            rule_id = %rule.id,
            role = spec.role.as_deref().unwrap_or("everyone"),
            resource = rule.resource.as_deref().unwrap_or("*"),
            action = rule.action.as_deref().unwrap_or("*"),
            "access rule granted"
        );

        Ok(rule)
    }

    /// Revoke access per `spec`.
    ///
    /// An unknown named role is a no-op, not an error. Without a resource
    /// filter every rule in the role scope is removed; with one, the
    /// action and condition filters narrow the match further. Revoking
    /// something that does not exist has no effect.
    pub async fn revoke(&self, spec: RuleSpec) -> AclResult<()> {
        let scope = match &spec.role {
            Some(name) => match self.identity.role_by_name(name).await? {
                Some(role) => RoleScope::Role(role.id),
                None => return Ok(()),
            },
            None => RoleScope::Everyone,
        };

        let mut criteria = RuleCriteria::scoped(scope);
        if let Some(resource) = &spec.resource {
            criteria.resource = Some(resource.clone());
            criteria.action = spec.action.clone();
            criteria.condition = spec.condition.clone();
        }

        let removed = self.store.delete(&criteria).await?;
        self.cache.invalidate().await;

        tracing::info!(
            removed,
            role = spec.role.as_deref().unwrap_or("everyone"),
            resource = spec.resource.as_deref().unwrap_or("*"),
            "access rules revoked"
        );

        Ok(())
    }

    /// Exact rule lookup for administrative tooling.
    pub async fn find_rule(&self, spec: &RuleSpec) -> AclResult<Option<Rule>> {
        let scope = match &spec.role {
            Some(name) => match self.identity.role_by_name(name).await? {
                Some(role) => RoleScope::Role(role.id),
                None => return Ok(None),
            },
            None => RoleScope::Everyone,
        };

        let criteria = RuleCriteria {
            scope,
            resource: spec.resource.clone(),
            include_descendants: false,
            action: spec.action.clone(),
            condition: spec.condition.clone(),
        };

        self.store.find_one(&criteria).await
    }
}
