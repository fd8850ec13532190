//! Access decision engine
//!
//! This module answers "may this subject perform this action on this
//! resource?". The answer is a typed [`Decision`], never an exception
//! path: a denial tells the caller whether authenticating could help,
//! and a store failure is an error, not a deny.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use warden_rules::{Resource, Subject};

use crate::cache::RuleCache;
use crate::error::{AclError, AclResult};
use crate::identity::IdentityProvider;

/// Why an access check denied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Subject is anonymous and no rule matched; the caller can prompt for
    /// authentication instead of showing a blanket denial.
    Unauthenticated,

    /// Subject is authenticated and no rule matched.
    Forbidden,
}

/// A denied access check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Denial {
    /// Denial kind.
    pub kind: DenialKind,

    /// Identifier of the requested resource.
    pub resource: String,

    /// Requested action, if one was resolved.
    pub action: Option<String>,
}

impl Denial {
    /// Human-readable denial reason.
    pub fn message(&self) -> String {
        let what = match &self.action {
            Some(action) => format!("{} {}", action, self.resource),
            None => format!("access {}", self.resource),
        };
        match self.kind {
            DenialKind::Unauthenticated => format!("you need to log in to {what}"),
            DenialKind::Forbidden => format!("you do not have permission to {what}"),
        }
    }

    /// Get HTTP status code for this denial.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            DenialKind::Unauthenticated => 401,
            DenialKind::Forbidden => 403,
        }
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    /// A rule matched; access is allowed.
    Granted,

    /// No rule matched.
    Denied(Denial),
}

impl Decision {
    /// Check whether access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }

    /// The denial, if access was denied.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Granted => None,
            Decision::Denied(denial) => Some(denial),
        }
    }
}

/// Evaluates (subject, resource, action) triples against the cached rules.
///
/// Read-only with respect to the rule store; the only side effect of a
/// check is cache population.
pub struct AccessEngine {
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<RuleCache>,
}

impl AccessEngine {
    /// Create an engine over an identity provider and a shared rule cache.
    pub fn new(identity: Arc<dyn IdentityProvider>, cache: Arc<RuleCache>) -> Self {
        Self { identity, cache }
    }

    /// Check whether the current subject may perform `action` on
    /// `resource`.
    ///
    /// With `action = None` the resource's default action is used,
    /// permitting resources to self-describe the operation implied by the
    /// current call context.
    pub async fn check(&self, resource: &dyn Resource, action: Option<&str>) -> AclResult<Decision> {
        let subject = self.identity.current_subject().await;
        self.check_subject(&subject, resource, action).await
    }

    /// Check an explicit subject instead of resolving the current one.
    pub async fn check_subject(
        &self,
        subject: &Subject,
        resource: &dyn Resource,
        action: Option<&str>,
    ) -> AclResult<Decision> {
        let action = match action {
            Some(action) => Some(action.to_string()),
            None => resource.default_action(),
        };

        let index = self.cache.load(subject).await?;

        // Disjunctive semantics: the first satisfying rule grants.
        for rule in index.candidates(action.as_deref()) {
            if rule.allows(resource, action.as_deref(), subject) {
                return Ok(Decision::Granted);
            }
        }

        let denial = Denial {
            kind: if subject.is_anonymous() {
                DenialKind::Unauthenticated
            } else {
                DenialKind::Forbidden
            },
            resource: resource.resource_id(),
            action,
        };

        tracing::debug!(
            resource = %denial.resource,
            action = denial.action.as_deref().unwrap_or("-"),
            kind = ?denial.kind,
            "access denied"
        );

        Ok(Decision::Denied(denial))
    }

    /// Boolean convenience wrapper around [`check`](Self::check).
    ///
    /// Store failures still propagate as errors; only a genuine denial
    /// maps to `false`.
    pub async fn allowed(&self, resource: &dyn Resource, action: Option<&str>) -> AclResult<bool> {
        Ok(self.check(resource, action).await?.is_granted())
    }

    /// Check with a deadline.
    ///
    /// On expiry the caller receives [`AclError::Timeout`], never a
    /// partial decision.
    pub async fn check_with_deadline(
        &self,
        resource: &dyn Resource,
        action: Option<&str>,
        deadline: Duration,
    ) -> AclResult<Decision> {
        match tokio::time::timeout(deadline, self.check(resource, action)).await {
            Ok(decision) => decision,
            Err(_) => Err(AclError::Timeout),
        }
    }
}
