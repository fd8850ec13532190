//! Access rules and the matching algorithm
//!
//! A [`Rule`] is a stored permissive statement: role `R` (or everyone) may
//! perform action `A` (or any) on resources under prefix `P` (or any),
//! provided condition `C` (or none) holds. There are no deny rules; any
//! satisfying rule is sufficient, so evaluation order affects performance
//! only, never the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::Resource;
use crate::subject::Subject;

/// A stored permissive access rule.
///
/// Immutable once loaded: rules are created by a grant, deleted by a
/// revoke, and never edited in place.
///
/// # Example
///
/// ```
/// use warden_rules::{EntityResource, Rule, Subject};
///
/// // Everyone may read anything under m:post.
/// let rule = Rule::new(None).with_resource("m:post").with_action("read");
///
/// let post = EntityResource::new("post").with_key("7");
/// assert!(rule.allows(&post, Some("read"), &Subject::Anonymous));
/// assert!(!rule.allows(&post, Some("delete"), &Subject::Anonymous));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Surrogate id.
    pub id: Uuid,

    /// Role this rule applies to. `None` means everyone, including
    /// unauthenticated callers.
    pub role_id: Option<Uuid>,

    /// Resource prefix this rule covers. `None` matches every resource.
    pub resource: Option<String>,

    /// Action this rule permits. `None` matches every action.
    pub action: Option<String>,

    /// Named condition the resource must evaluate to true for the subject.
    pub condition: Option<String>,

    /// Human-readable note for administrators.
    pub description: Option<String>,

    /// Creation timestamp.
    pub created: DateTime<Utc>,

    /// Last-update timestamp.
    pub updated: DateTime<Utc>,
}

impl Rule {
    /// Create a rule for a role scope (`None` targets everyone).
    pub fn new(role_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            role_id,
            resource: None,
            action: None,
            condition: None,
            description: None,
            created: now,
            updated: now,
        }
    }

    /// Restrict the rule to a resource prefix.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Restrict the rule to an action.
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

    /// Check whether this rule authorizes `action` on `resource` for
    /// `subject`.
    ///
    /// With `action = None` the resource's own default action is consulted,
    /// letting a resource describe the operation implied by the current
    /// call context. The role scope is not examined here: candidate rules
    /// are already restricted to the subject's roles when loaded.
    pub fn allows(&self, resource: &dyn Resource, action: Option<&str>, subject: &Subject) -> bool {
        let action = match action {
            Some(action) => Some(action.to_string()),
            None => resource.default_action(),
        };

        // A rule with a specific action only ever matches that action.
        if let Some(rule_action) = &self.action {
            if action.as_deref() != Some(rule_action.as_str()) {
                return false;
            }
        }

        if let Some(pattern) = self.resource.as_deref() {
            if !resource_matches(pattern, &resource.resource_id()) {
                return false;
            }
        }

        if let Some(condition) = &self.condition {
            if !resource.evaluate_condition(subject, condition) {
                return false;
            }
        }

        true
    }
}

/// Check whether `pattern` covers `resource_id` in the dot hierarchy.
///
/// The identifier is compared against the pattern, then truncated at its
/// last `.` and compared again, until an exact match is found or no
/// separator remains. A rule on `m:order` therefore covers `m:order.42`.
pub fn resource_matches(pattern: &str, resource_id: &str) -> bool {
    let mut candidate = resource_id;
    loop {
        if candidate == pattern {
            return true;
        }
        match candidate.rfind('.') {
            Some(pos) => candidate = &candidate[..pos],
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ControllerResource, EntityResource};
    use crate::subject::Role;

    struct Post {
        published: bool,
    }

    impl Resource for Post {
        fn resource_id(&self) -> String {
            "m:post.7".to_string()
        }

        fn actions(&self) -> Vec<String> {
            vec!["read".to_string(), "update".to_string()]
        }

        fn condition_names(&self) -> Vec<String> {
            vec!["published".to_string()]
        }

        fn evaluate_condition(&self, _subject: &Subject, condition: &str) -> bool {
            match condition {
                "published" => self.published,
                _ => false,
            }
        }
    }

    #[test]
    fn test_resource_matches_exact() {
        assert!(resource_matches("m:post", "m:post"));
        assert!(resource_matches("c:admin.users", "c:admin.users"));
    }

    #[test]
    fn test_resource_matches_ancestor() {
        assert!(resource_matches("m:post", "m:post.7"));
        assert!(resource_matches("c:admin", "c:admin.users.7"));
    }

    #[test]
    fn test_resource_matches_rejects_non_prefix() {
        assert!(!resource_matches("m:post.7", "m:post"));
        assert!(!resource_matches("m:order", "m:post.7"));
        // Segment boundaries matter; string prefixes are not enough.
        assert!(!resource_matches("m:post", "m:poster"));
    }

    #[test]
    fn test_rule_without_resource_matches_everything() {
        let rule = Rule::new(None);
        let post = EntityResource::new("post").with_key("7");
        let users = ControllerResource::new("admin.users");

        assert!(rule.allows(&post, Some("read"), &Subject::Anonymous));
        assert!(rule.allows(&users, Some("index"), &Subject::Anonymous));
        assert!(rule.allows(&post, None, &Subject::Anonymous));
    }

    #[test]
    fn test_rule_action_must_match() {
        let rule = Rule::new(None).with_resource("m:post").with_action("update");
        let post = EntityResource::new("post").with_key("7");

        assert!(rule.allows(&post, Some("update"), &Subject::Anonymous));
        assert!(!rule.allows(&post, Some("delete"), &Subject::Anonymous));
        // No requested action and no resource default: a specific-action
        // rule cannot match.
        assert!(!rule.allows(&post, None, &Subject::Anonymous));
    }

    #[test]
    fn test_rule_uses_resource_default_action() {
        let rule = Rule::new(None)
            .with_resource("c:admin.users")
            .with_action("edit");
        let users = ControllerResource::new("admin.users")
            .with_actions(["index", "edit"])
            .with_current_action("edit");

        assert!(rule.allows(&users, None, &Subject::Anonymous));
    }

    #[test]
    fn test_rule_condition_gates_access() {
        let rule = Rule::new(None)
            .with_resource("m:post")
            .with_action("read")
            .with_condition("published");

        let subject = Subject::authenticated(Uuid::now_v7(), vec![Role::new("reader")]);

        let hidden = Post { published: false };
        assert!(!rule.allows(&hidden, Some("read"), &subject));

        let published = Post { published: true };
        assert!(published.evaluate_condition(&subject, "published"));
        assert!(rule.allows(&published, Some("read"), &subject));
    }

    #[test]
    fn test_rule_unknown_condition_fails_closed() {
        let rule = Rule::new(None)
            .with_resource("m:post")
            .with_condition("frozen");
        let post = Post { published: true };

        assert!(!rule.allows(&post, Some("read"), &Subject::Anonymous));
    }

    #[test]
    fn test_rule_builder() {
        let role = Role::new("editor");
        let rule = Rule::new(Some(role.id))
            .with_resource("m:post")
            .with_action("update")
            .with_condition("published")
            .with_description("editors may update published posts");

        assert_eq!(rule.role_id, Some(role.id));
        assert_eq!(rule.resource.as_deref(), Some("m:post"));
        assert_eq!(rule.action.as_deref(), Some("update"));
        assert_eq!(rule.condition.as_deref(), Some("published"));
        assert!(rule.description.is_some());
    }

    #[test]
    fn test_rule_serde_round_trip() {
        let rule = Rule::new(None).with_resource("m:post").with_action("read");

        let json = serde_json::to_string(&rule).unwrap();
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }
}
