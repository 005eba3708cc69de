//! Core types shared by the access-control stores.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::roles::Role;

/// A pre-authenticated caller.
///
/// Identities are opaque: the registry only compares them for equality and
/// uses them as ownership and role-membership keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an account reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Error types for access checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Caller lacks the required role
    #[error("{identity} is missing role {role}")]
    MissingRole {
        /// Caller that was checked
        identity: Identity,
        /// Role that was required
        role: Role,
    },

    /// Ownership movement attempted while paused
    #[error("Registry is paused")]
    Paused,
}

pub type Result<T> = std::result::Result<T, AccessError>;
