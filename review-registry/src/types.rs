//! Core types for the review registry.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use review_access::{AccessError, Identity};

/// Identifier of a review record. Assigned once from a monotonic counter.
pub type ReviewId = u64;

/// A website review.
///
/// Every field is an opaque blob to the registry. Only `metadata_hash`
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reviewed domain, e.g. `example.com`
    pub domain_name: String,
    /// Full URL that was reviewed
    pub url: String,
    /// Site category
    pub category: String,
    /// Free-form tag
    pub tag: String,
    /// Safety rating label
    pub safety_rating: String,
    /// Content hash of the off-registry review body
    pub metadata_hash: String,
}

impl Review {
    /// Create a review payload.
    pub fn new(
        domain_name: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
        tag: impl Into<String>,
        safety_rating: impl Into<String>,
        metadata_hash: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            url: url.into(),
            category: category.into(),
            tag: tag.into(),
            safety_rating: safety_rating.into(),
            metadata_hash: metadata_hash.into(),
        }
    }
}

/// Error types for registry operations.
///
/// Every variant is raised before any state is touched, so a failed call
/// leaves the registry exactly as it found it.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Role or ownership precondition failed
    #[error("{identity} is not authorized: {reason}")]
    Unauthorized {
        /// Caller that was rejected
        identity: Identity,
        /// Which precondition failed
        reason: String,
    },

    /// Identifier was never minted or has been deleted
    #[error("Review not found: {0}")]
    NotFound(ReviewId),

    /// Ownership movement attempted while paused
    #[error("Registry is paused")]
    Paused,

    /// Identifier counter cannot advance. Fatal.
    #[error("Review identifier space exhausted")]
    CapacityExceeded,

    /// Identity tried to make itself its own delegate
    #[error("{0} cannot approve itself")]
    SelfApproval(Identity),

    /// Enumeration index past the end
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of entries available
        len: usize,
    },

    /// Snapshot failed validation
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Build an [`RegistryError::Unauthorized`].
    pub fn unauthorized(identity: &Identity, reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            identity: identity.clone(),
            reason: reason.into(),
        }
    }
}

impl From<AccessError> for RegistryError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::MissingRole { identity, role } => Self::Unauthorized {
                identity,
                reason: format!("missing role {role}"),
            },
            AccessError::Paused => Self::Paused,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
