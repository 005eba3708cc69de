//! Record storage with ownership and enumeration indices.
//!
//! Four tables must always agree:
//!
//! - `records`: identifier to payload
//! - `owners`: identifier to current owner
//! - `all`: every live identifier, ascending (which is mint order, since
//!   identifiers come from a counter that never goes backwards). Kept as a
//!   sorted `Vec`: mint appends, positional lookup is O(1), burn is O(n).
//! - `by_owner`: owner to the identifiers it currently holds
//!
//! Delegation (per-record approvals and owner-wide operators) lives here too
//! so that transfer and burn can clear approvals in the same step.
//!
//! Every mutating method validates first and only then writes, so an `Err`
//! never leaves a table half-updated. Authorization is not checked here.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, error};

use review_access::Identity;

use crate::types::{RegistryError, Result, Review, ReviewId};

/// Identifier-keyed review storage.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    /// Next identifier to hand out
    next_id: ReviewId,
    /// Review payloads
    records: HashMap<ReviewId, Review>,
    /// Current owner of each live identifier
    owners: HashMap<ReviewId, Identity>,
    /// Global index in mint order, sorted ascending
    all: Vec<ReviewId>,
    /// Per-owner index
    by_owner: HashMap<Identity, BTreeSet<ReviewId>>,
    /// Single approved delegate per identifier
    approvals: HashMap<ReviewId, Identity>,
    /// Owner-wide operators
    operators: HashMap<Identity, BTreeSet<Identity>>,
}

/// Raw tables handed to and from [`RecordStore::restore`].
#[derive(Debug, Clone, Default)]
pub struct StoreTables {
    pub next_id: ReviewId,
    pub records: BTreeMap<ReviewId, Review>,
    pub owners: BTreeMap<ReviewId, Identity>,
    pub approvals: BTreeMap<ReviewId, Identity>,
    pub operators: BTreeMap<Identity, BTreeSet<Identity>>,
}

impl RecordStore {
    /// Create an empty store whose first identifier is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier and register `owner` as its holder.
    ///
    /// The counter advances only after the ownership entry and both
    /// enumeration indices are written. [`RegistryError::CapacityExceeded`]
    /// means the identifier space is gone for good; nothing is written.
    pub fn mint(&mut self, owner: &Identity) -> Result<ReviewId> {
        let id = self.next_id;
        let Some(next) = id.checked_add(1) else {
            error!(next_id = id, "Review identifier counter exhausted");
            return Err(RegistryError::CapacityExceeded);
        };

        self.owners.insert(id, owner.clone());
        self.all.push(id);
        self.by_owner.entry(owner.clone()).or_default().insert(id);
        self.next_id = next;

        debug!(review_id = id, owner = %owner, "Minted review identifier");
        Ok(id)
    }

    /// Store the full payload for a minted identifier.
    pub fn set_record(&mut self, id: ReviewId, review: Review) -> Result<()> {
        self.ensure_exists(id)?;
        self.records.insert(id, review);
        Ok(())
    }

    /// Replace the metadata hash, returning the previous one.
    pub fn update_field(&mut self, id: ReviewId, metadata_hash: String) -> Result<String> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        Ok(std::mem::replace(&mut record.metadata_hash, metadata_hash))
    }

    /// Get the payload of a live record.
    pub fn get_record(&self, id: ReviewId) -> Result<&Review> {
        self.records.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Get the current owner of a live record.
    pub fn owner_of(&self, id: ReviewId) -> Result<&Identity> {
        self.owners.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Whether `id` is live.
    pub fn exists(&self, id: ReviewId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Move `id` from `from` to `to`.
    ///
    /// Both per-owner sets change together and the per-record approval is
    /// cleared.
    pub fn transfer_ownership(
        &mut self,
        id: ReviewId,
        from: &Identity,
        to: &Identity,
    ) -> Result<()> {
        let owner = self.owner_of(id)?;
        if owner != from {
            return Err(RegistryError::unauthorized(
                from,
                format!("not the current owner of review {id}"),
            ));
        }

        self.detach_from_owner(id, from);
        self.by_owner.entry(to.clone()).or_default().insert(id);
        self.owners.insert(id, to.clone());
        self.approvals.remove(&id);

        debug!(review_id = id, from = %from, to = %to, "Transferred review ownership");
        Ok(())
    }

    /// Destroy `id`, returning its last owner and payload.
    ///
    /// The identifier is retired: the counter is untouched, so no later
    /// `mint` can return it. O(n) in the number of live records, since the
    /// global index shifts to stay in mint order.
    pub fn burn(&mut self, id: ReviewId) -> Result<(Identity, Option<Review>)> {
        let owner = self.owners.remove(&id).ok_or(RegistryError::NotFound(id))?;

        self.detach_from_owner(id, &owner);
        if let Ok(pos) = self.all.binary_search(&id) {
            self.all.remove(pos);
        }
        self.approvals.remove(&id);
        let review = self.records.remove(&id);

        debug!(review_id = id, owner = %owner, "Burned review");
        Ok((owner, review))
    }

    /// All live identifiers in mint order.
    pub fn enumerate_all(&self) -> Vec<ReviewId> {
        self.all.clone()
    }

    /// Identifiers currently held by `owner`.
    pub fn enumerate_by_owner(&self, owner: &Identity) -> BTreeSet<ReviewId> {
        self.by_owner.get(owner).cloned().unwrap_or_default()
    }

    /// Number of live records held by `owner`.
    pub fn balance_of(&self, owner: &Identity) -> usize {
        self.by_owner.get(owner).map(BTreeSet::len).unwrap_or(0)
    }

    /// Number of live records.
    pub fn total_supply(&self) -> usize {
        self.all.len()
    }

    /// Identifier at `index` in mint order. O(1).
    pub fn token_by_index(&self, index: usize) -> Result<ReviewId> {
        self.all
            .get(index)
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: self.all.len(),
            })
    }

    /// Identifier at `index` among those held by `owner`, ascending.
    ///
    /// Walks the owner's set, so O(`index`).
    pub fn token_of_owner_by_index(&self, owner: &Identity, index: usize) -> Result<ReviewId> {
        let held = self.by_owner.get(owner);
        held.and_then(|ids| ids.iter().nth(index))
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                len: held.map(BTreeSet::len).unwrap_or(0),
            })
    }

    /// Identifier the next successful `mint` will return.
    pub fn next_id(&self) -> ReviewId {
        self.next_id
    }

    /// Set or clear the per-record delegate.
    pub fn set_approval(&mut self, id: ReviewId, approved: Option<&Identity>) -> Result<()> {
        self.ensure_exists(id)?;
        match approved {
            Some(delegate) => {
                self.approvals.insert(id, delegate.clone());
            }
            None => {
                self.approvals.remove(&id);
            }
        }
        Ok(())
    }

    /// Per-record delegate of `id`, if any.
    pub fn get_approved(&self, id: ReviewId) -> Result<Option<&Identity>> {
        self.ensure_exists(id)?;
        Ok(self.approvals.get(&id))
    }

    /// Add or remove `operator` as an owner-wide delegate of `owner`.
    pub fn set_operator(&mut self, owner: &Identity, operator: &Identity, approved: bool) {
        if approved {
            self.operators
                .entry(owner.clone())
                .or_default()
                .insert(operator.clone());
        } else if let Some(ops) = self.operators.get_mut(owner) {
            ops.remove(operator);
            if ops.is_empty() {
                self.operators.remove(owner);
            }
        }
    }

    /// Whether `operator` may act for everything `owner` holds.
    pub fn is_operator(&self, owner: &Identity, operator: &Identity) -> bool {
        self.operators
            .get(owner)
            .map(|ops| ops.contains(operator))
            .unwrap_or(false)
    }

    /// Copy out the persistent tables.
    pub fn tables(&self) -> StoreTables {
        StoreTables {
            next_id: self.next_id,
            records: self.records.iter().map(|(id, r)| (*id, r.clone())).collect(),
            owners: self.owners.iter().map(|(id, o)| (*id, o.clone())).collect(),
            approvals: self.approvals.iter().map(|(id, a)| (*id, a.clone())).collect(),
            operators: self
                .operators
                .iter()
                .map(|(owner, ops)| (owner.clone(), ops.clone()))
                .collect(),
        }
    }

    /// Rebuild a store from persistent tables.
    ///
    /// The enumeration indices are derived from `owners`, never trusted from
    /// outside. Fails if the tables disagree with each other.
    pub fn restore(tables: StoreTables) -> Result<Self> {
        let StoreTables {
            next_id,
            records,
            owners,
            approvals,
            operators,
        } = tables;

        if let Some(id) = owners.keys().find(|id| **id >= next_id) {
            return Err(RegistryError::InvalidSnapshot(format!(
                "review {id} is not below counter {next_id}"
            )));
        }
        if let Some(id) = records.keys().find(|id| !owners.contains_key(id)) {
            return Err(RegistryError::InvalidSnapshot(format!(
                "review {id} has no owner"
            )));
        }
        if let Some(id) = owners.keys().find(|id| !records.contains_key(id)) {
            return Err(RegistryError::InvalidSnapshot(format!(
                "review {id} has an owner but no record"
            )));
        }
        if let Some(id) = approvals.keys().find(|id| !owners.contains_key(id)) {
            return Err(RegistryError::InvalidSnapshot(format!(
                "approval for unknown review {id}"
            )));
        }

        let mut by_owner: HashMap<Identity, BTreeSet<ReviewId>> = HashMap::new();
        for (id, owner) in &owners {
            by_owner.entry(owner.clone()).or_default().insert(*id);
        }

        Ok(Self {
            next_id,
            all: owners.keys().copied().collect(),
            records: records.into_iter().collect(),
            owners: owners.into_iter().collect(),
            by_owner,
            approvals: approvals.into_iter().collect(),
            operators: operators
                .into_iter()
                .filter(|(_, ops)| !ops.is_empty())
                .collect(),
        })
    }

    fn ensure_exists(&self, id: ReviewId) -> Result<()> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id))
        }
    }

    fn detach_from_owner(&mut self, id: ReviewId, owner: &Identity) {
        if let Some(held) = self.by_owner.get_mut(owner) {
            held.remove(&id);
            if held.is_empty() {
                self.by_owner.remove(owner);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn with_next_id(next_id: ReviewId) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }
}
