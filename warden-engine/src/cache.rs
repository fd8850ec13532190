//! Rule cache
//!
//! Lazily-built, process-wide index of the rules relevant to a subject's
//! role set, bucketed by action. The cache is a pure performance layer:
//! its contents are always reconstructible from the rule store and it is
//! invalidated by every grant or revoke.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use warden_rules::{Rule, Subject};

use crate::error::AclResult;
use crate::store::RuleStore;

/// Rules bucketed by action for fast candidate lookup.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    /// Rules with a specific action, keyed by that action.
    buckets: HashMap<String, Vec<Rule>>,
    /// Rules with no action, applicable to any action.
    any_action: Vec<Rule>,
}

impl RuleIndex {
    /// Build an index from a flat rule list.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut index = Self::default();
        for rule in rules {
            match rule.action.clone() {
                Some(action) => index.buckets.entry(action).or_default().push(rule),
                None => index.any_action.push(rule),
            }
        }
        index
    }

    /// Candidate rules for an action: its bucket followed by the any-action
    /// bucket.
    ///
    /// No ordering contract holds inside a bucket; matching is disjunctive,
    /// so order never changes the outcome.
    pub fn candidates(&self, action: Option<&str>) -> impl Iterator<Item = &Rule> {
        let bucket = action
            .and_then(|action| self.buckets.get(action))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        bucket.iter().chain(self.any_action.iter())
    }

    /// Total number of indexed rules.
    pub fn len(&self) -> usize {
        self.any_action.len() + self.buckets.values().map(Vec::len).sum::<usize>()
    }

    /// Check if the index holds no rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct CacheState {
    /// Bumped on every invalidation; guards in-flight builds.
    epoch: u64,
    /// Indexes keyed by sorted role-id set.
    indexes: HashMap<Vec<Uuid>, Arc<RuleIndex>>,
}

/// Process-wide lazy rule cache, keyed per distinct role set.
///
/// Indexes are immutable once published: a rebuild happens off to the side
/// and lands as a single map insert, so concurrent readers observe either
/// a fully-valid old index or a fully-valid new one, never a partial
/// rebuild.
pub struct RuleCache {
    store: Arc<dyn RuleStore>,
    state: RwLock<CacheState>,
}

impl std::fmt::Debug for RuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleCache").finish_non_exhaustive()
    }
}

impl RuleCache {
    /// Create a cache over `store`.
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Load the rule index for `subject`, querying the store on first use
    /// or after an invalidation.
    ///
    /// A store failure propagates and leaves previously cached indexes
    /// untouched; it is never treated as an empty rule set.
    pub async fn load(&self, subject: &Subject) -> AclResult<Arc<RuleIndex>> {
        let key = subject.role_ids();

        let epoch = {
            let state = self.state.read().await;
            if let Some(index) = state.indexes.get(&key) {
                return Ok(index.clone());
            }
            state.epoch
        };

        let rules = self.store.rules_for(&key, true).await?;
        let index = Arc::new(RuleIndex::from_rules(rules));

        tracing::debug!(roles = key.len(), rules = index.len(), "rule index rebuilt");

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            // Invalidated while building; serve the fresh data but do not
            // publish a snapshot that predates the invalidation.
            return Ok(index);
        }

        // First publication for this key wins between racing builds.
        Ok(state.indexes.entry(key).or_insert(index).clone())
    }

    /// Drop every cached index. The next load per role set queries the
    /// store again. Also callable by operators after out-of-band rule
    /// edits.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.indexes.clear();
        tracing::debug!(epoch = state.epoch, "rule cache invalidated");
    }
}
