//! Thread-safe handle over a [`ReviewRegistry`].
//!
//! One lock guards the whole registry, so each call observes and leaves a
//! consistent state: mutations hold the write lock from authorization to
//! event emission, queries hold the read lock.

use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use review_access::{Identity, Role};

use crate::events::{AuditLog, EventSink};
use crate::registry::ReviewRegistry;
use crate::snapshot::RegistrySnapshot;
use crate::types::{Result, Review, ReviewId};

/// Cloneable, shareable registry handle.
pub struct SharedReviewRegistry<S: EventSink = AuditLog> {
    inner: Arc<RwLock<ReviewRegistry<S>>>,
}

impl<S: EventSink> Clone for SharedReviewRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EventSink> SharedReviewRegistry<S> {
    /// Wrap a registry.
    pub fn new(registry: ReviewRegistry<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub async fn create(&self, caller: &Identity, review: Review) -> Result<ReviewId> {
        self.inner.write().await.create(caller, review)
    }

    pub async fn delete(&self, caller: &Identity, id: ReviewId) -> Result<()> {
        self.inner.write().await.delete(caller, id)
    }

    /// Current metadata hash of review `id`.
    pub async fn read(&self, id: ReviewId) -> Result<String> {
        self.inner.read().await.read(id).map(str::to_owned)
    }

    pub async fn get_review(&self, id: ReviewId) -> Result<Review> {
        self.inner.read().await.get_review(id).cloned()
    }

    pub async fn update(
        &self,
        caller: &Identity,
        id: ReviewId,
        metadata_hash: impl Into<String>,
    ) -> Result<()> {
        self.inner.write().await.update(caller, id, metadata_hash)
    }

    pub async fn transfer(&self, caller: &Identity, id: ReviewId, to: &Identity) -> Result<()> {
        self.inner.write().await.transfer(caller, id, to)
    }

    pub async fn approve(
        &self,
        caller: &Identity,
        id: ReviewId,
        approved: Option<&Identity>,
    ) -> Result<()> {
        self.inner.write().await.approve(caller, id, approved)
    }

    pub async fn set_approval_for_all(
        &self,
        caller: &Identity,
        operator: &Identity,
        approved: bool,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .set_approval_for_all(caller, operator, approved)
    }

    pub async fn owner_of(&self, id: ReviewId) -> Result<Identity> {
        self.inner.read().await.owner_of(id).cloned()
    }

    pub async fn enumerate_all(&self) -> Vec<ReviewId> {
        self.inner.read().await.enumerate_all()
    }

    pub async fn enumerate_by_owner(&self, owner: &Identity) -> BTreeSet<ReviewId> {
        self.inner.read().await.enumerate_by_owner(owner)
    }

    pub async fn grant_role(
        &self,
        caller: &Identity,
        role: Role,
        account: &Identity,
    ) -> Result<bool> {
        self.inner.write().await.grant_role(caller, role, account)
    }

    pub async fn revoke_role(
        &self,
        caller: &Identity,
        role: Role,
        account: &Identity,
    ) -> Result<bool> {
        self.inner.write().await.revoke_role(caller, role, account)
    }

    pub async fn renounce_role(&self, caller: &Identity, role: Role) -> bool {
        self.inner.write().await.renounce_role(caller, role)
    }

    pub async fn pause(&self, caller: &Identity) -> Result<()> {
        self.inner.write().await.pause(caller)
    }

    pub async fn unpause(&self, caller: &Identity) -> Result<()> {
        self.inner.write().await.unpause(caller)
    }

    pub async fn is_paused(&self) -> bool {
        self.inner.read().await.is_paused()
    }

    pub async fn snapshot(&self) -> Result<RegistrySnapshot> {
        self.inner.read().await.snapshot()
    }

    /// Run a read-only query under the read lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&ReviewRegistry<S>) -> R) -> R {
        f(&*self.inner.read().await)
    }
}
