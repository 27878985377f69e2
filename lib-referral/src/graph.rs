//! The referral graph: one immutable referrer per user.
//!
//! Write path is registration-only (`set_referrer`, once per user,
//! cycle-checked). Read paths are the upward ancestor walk used by
//! commission distribution and a lazy downward BFS for network views.

use crate::errors::{ReferralError, ReferralResult};
use chrono::{DateTime, Utc};
use lib_types::AccountId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::info;

/// One user's link to their direct referrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralEdge {
    pub user_id: AccountId,
    pub referrer_id: AccountId,
    pub created_at: DateTime<Utc>,
}

/// Storage operations required by the referral graph
pub trait ReferralStore: Send + Sync {
    /// The user's edge to their direct referrer, if any
    fn referrer(&self, user_id: AccountId) -> ReferralResult<Option<ReferralEdge>>;

    /// Persist an edge. Fails with `AlreadySet` if the user has one.
    fn insert(&self, edge: ReferralEdge) -> ReferralResult<()>;

    /// Direct referees of a user, in registration order
    fn children(&self, user_id: AccountId) -> ReferralResult<Vec<AccountId>>;
}

/// In-memory referral store: parent map plus child adjacency
#[derive(Debug, Default)]
pub struct MemoryReferralStore {
    parents: RwLock<HashMap<AccountId, ReferralEdge>>,
    children: RwLock<HashMap<AccountId, Vec<AccountId>>>,
}

impl MemoryReferralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReferralStore for MemoryReferralStore {
    fn referrer(&self, user_id: AccountId) -> ReferralResult<Option<ReferralEdge>> {
        Ok(self.parents.read().get(&user_id).cloned())
    }

    fn insert(&self, edge: ReferralEdge) -> ReferralResult<()> {
        let mut parents = self.parents.write();
        if parents.contains_key(&edge.user_id) {
            return Err(ReferralError::AlreadySet(edge.user_id));
        }
        self.children
            .write()
            .entry(edge.referrer_id)
            .or_default()
            .push(edge.user_id);
        parents.insert(edge.user_id, edge);
        Ok(())
    }

    fn children(&self, user_id: AccountId) -> ReferralResult<Vec<AccountId>> {
        Ok(self.children.read().get(&user_id).cloned().unwrap_or_default())
    }
}

/// Forest of referral edges with cycle-checked writes
pub struct ReferralGraph {
    store: Arc<dyn ReferralStore>,
}

impl ReferralGraph {
    pub fn new(store: Arc<dyn ReferralStore>) -> Self {
        Self { store }
    }

    /// Assign a user's referrer, once, at registration.
    ///
    /// Fails with `AlreadySet` on any later call for the same user and with
    /// `CycleDetected` if `referrer_id` is the user themself or already in
    /// the user's downline. The normal registration flow cannot produce a
    /// cycle (the referrer predates the user), so the check is a write-time
    /// guard against corrupted input.
    pub fn set_referrer(
        &self,
        user_id: AccountId,
        referrer_id: AccountId,
        now: DateTime<Utc>,
    ) -> ReferralResult<ReferralEdge> {
        if self.store.referrer(user_id)?.is_some() {
            return Err(ReferralError::AlreadySet(user_id));
        }
        if referrer_id == user_id || self.is_ancestor(user_id, referrer_id)? {
            return Err(ReferralError::CycleDetected {
                user: user_id,
                referrer: referrer_id,
            });
        }

        let edge = ReferralEdge {
            user_id,
            referrer_id,
            created_at: now,
        };
        self.store.insert(edge.clone())?;
        info!(user = %user_id, referrer = %referrer_id, "referrer assigned");
        Ok(edge)
    }

    /// Upline of a user, nearest-first, at most `max_depth` deep.
    ///
    /// Short chains return what exists; the depth cap also defends the walk
    /// against a corrupted (cyclic) store.
    pub fn ancestors(&self, user_id: AccountId, max_depth: usize) -> ReferralResult<Vec<AccountId>> {
        let mut chain = Vec::new();
        let mut current = user_id;
        while chain.len() < max_depth {
            match self.store.referrer(current)? {
                Some(edge) => {
                    chain.push(edge.referrer_id);
                    current = edge.referrer_id;
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// Direct referees of a user
    pub fn direct_referrals(&self, user_id: AccountId) -> ReferralResult<Vec<AccountId>> {
        self.store.children(user_id)
    }

    /// Lazy breadth-first walk of a user's entire downline, excluding the
    /// user. Restartable: each call starts a fresh traversal. Not used by
    /// the commission path.
    pub fn descendants(&self, user_id: AccountId) -> Descendants<'_> {
        let (queue, error) = match self.store.children(user_id) {
            Ok(children) => (children.into(), None),
            Err(e) => (VecDeque::new(), Some(e)),
        };
        let mut seen = HashSet::from([user_id]);
        seen.extend(queue.iter().copied());
        Descendants {
            store: self.store.as_ref(),
            queue,
            seen,
            error,
        }
    }

    /// The downline grouped by level: index 0 holds direct referees, index 1
    /// their referees, and so on, to at most `max_depth` levels.
    pub fn network_by_level(
        &self,
        user_id: AccountId,
        max_depth: usize,
    ) -> ReferralResult<Vec<Vec<AccountId>>> {
        let mut levels = Vec::new();
        let mut frontier = vec![user_id];
        for _ in 0..max_depth {
            let mut next = Vec::new();
            for user in &frontier {
                next.extend(self.store.children(*user)?);
            }
            if next.is_empty() {
                break;
            }
            levels.push(next.clone());
            frontier = next;
        }
        Ok(levels)
    }

    /// Whether `candidate` appears anywhere in `root`'s downline
    fn is_ancestor(&self, root: AccountId, candidate: AccountId) -> ReferralResult<bool> {
        for descendant in self.descendants(root) {
            if descendant? == candidate {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Lazy BFS over a downline; yields each descendant once.
///
/// Children are fetched only as their parent is yielded, so iteration cost
/// tracks how far the caller walks, not the size of the subtree.
pub struct Descendants<'a> {
    store: &'a dyn ReferralStore,
    queue: VecDeque<AccountId>,
    seen: HashSet<AccountId>,
    error: Option<ReferralError>,
}

impl Iterator for Descendants<'_> {
    type Item = ReferralResult<AccountId>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        let current = self.queue.pop_front()?;
        match self.store.children(current) {
            Ok(children) => {
                for child in children {
                    if self.seen.insert(child) {
                        self.queue.push_back(child);
                    }
                }
            }
            // Yield the node now, surface the fetch error on the next call.
            Err(e) => self.error = Some(e),
        }
        Some(Ok(current))
    }
}
