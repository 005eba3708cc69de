//! Point-in-time export of registry state.
//!
//! Mirrors the persisted layout: counter, records, ownership, delegation,
//! role table and pause flag. Enumeration indices are not exported; they are
//! rebuilt from the ownership table on restore.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use review_access::{Identity, PauseSwitch, Role, RoleRegistry};

use crate::store::{RecordStore, StoreTables};
use crate::types::{RegistryError, Result, Review, ReviewId};

/// Registry tables as plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotState {
    pub next_id: ReviewId,
    pub records: BTreeMap<ReviewId, Review>,
    pub owners: BTreeMap<ReviewId, Identity>,
    pub approvals: BTreeMap<ReviewId, Identity>,
    pub operators: BTreeMap<Identity, BTreeSet<Identity>>,
    pub roles: RoleRegistry,
    pub paused: bool,
}

/// A [`SnapshotState`] sealed with its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub state: SnapshotState,
    /// Hex SHA-256 of the JSON encoding of `state`
    pub digest: String,
}

impl RegistrySnapshot {
    /// Seal `state`.
    pub fn seal(state: SnapshotState) -> Result<Self> {
        let digest = compute_digest(&state)?;
        Ok(Self { state, digest })
    }

    /// Check the digest against the state.
    pub fn verify(&self) -> Result<()> {
        let expected = compute_digest(&self.state)?;
        if expected != self.digest {
            return Err(RegistryError::InvalidSnapshot(format!(
                "digest mismatch: expected {expected}, found {}",
                self.digest
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Verify and split into the components the registry is built from.
    pub(crate) fn into_parts(self) -> Result<(RecordStore, RoleRegistry, PauseSwitch)> {
        self.verify()?;

        let SnapshotState {
            next_id,
            records,
            owners,
            approvals,
            operators,
            roles,
            paused,
        } = self.state;

        if roles.count(Role::Administrator) == 0 {
            return Err(RegistryError::InvalidSnapshot(
                "no identity holds the administrator role".to_string(),
            ));
        }

        let store = RecordStore::restore(StoreTables {
            next_id,
            records,
            owners,
            approvals,
            operators,
        })?;

        Ok((store, roles, PauseSwitch::with_state(paused)))
    }
}

fn compute_digest(state: &SnapshotState) -> Result<String> {
    let bytes = serde_json::to_vec(state)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
