//! Role definitions and membership tracking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::types::{AccessError, Identity, Result};

/// Named capabilities an identity can hold.
///
/// The set is closed: every gated operation names one of these variants
/// rather than a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages membership of every role, itself included
    Administrator,
    /// Creates reviews and edits their metadata
    #[serde(alias = "voter")]
    Creator,
    /// Flips the pause switch
    Moderator,
}

impl Role {
    /// Get string representation for logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "ADMINISTRATOR",
            Self::Creator => "CREATOR",
            Self::Moderator => "MODERATOR",
        }
    }

    /// All roles, administrator first
    pub fn all() -> [Self; 3] {
        [Self::Administrator, Self::Creator, Self::Moderator]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Many-to-many membership between roles and identities.
///
/// Grants and revocations are idempotent and report whether membership
/// actually changed, so callers can decide whether anything is worth
/// auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    members: BTreeMap<Role, BTreeSet<Identity>>,
}

impl RoleRegistry {
    /// Create a registry with no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `identity` to `role`. Returns `false` if it was already a member.
    pub fn grant(&mut self, role: Role, identity: &Identity) -> bool {
        let added = self
            .members
            .entry(role)
            .or_default()
            .insert(identity.clone());

        if !added {
            debug!(role = %role, identity = %identity, "Role already held");
        }
        added
    }

    /// Remove `identity` from `role`. Returns `false` if it was not a member.
    pub fn revoke(&mut self, role: Role, identity: &Identity) -> bool {
        let removed = match self.members.get_mut(&role) {
            Some(holders) => {
                let removed = holders.remove(identity);
                if holders.is_empty() {
                    self.members.remove(&role);
                }
                removed
            }
            None => false,
        };

        if !removed {
            debug!(role = %role, identity = %identity, "Role not held");
        }
        removed
    }

    /// Check whether `identity` holds `role`.
    pub fn has(&self, role: Role, identity: &Identity) -> bool {
        self.members
            .get(&role)
            .map(|holders| holders.contains(identity))
            .unwrap_or(false)
    }

    /// Fail with [`AccessError::MissingRole`] unless `identity` holds `role`.
    pub fn require(&self, role: Role, identity: &Identity) -> Result<()> {
        if self.has(role, identity) {
            Ok(())
        } else {
            Err(AccessError::MissingRole {
                identity: identity.clone(),
                role,
            })
        }
    }

    /// All holders of `role`, in identity order.
    pub fn members(&self, role: Role) -> Vec<Identity> {
        self.members
            .get(&role)
            .map(|holders| holders.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every role `identity` holds.
    pub fn roles_of(&self, identity: &Identity) -> Vec<Role> {
        Role::all()
            .into_iter()
            .filter(|role| self.has(*role, identity))
            .collect()
    }

    /// Number of holders of `role`.
    pub fn count(&self, role: Role) -> usize {
        self.members.get(&role).map(BTreeSet::len).unwrap_or(0)
    }
}
