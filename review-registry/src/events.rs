//! Audit events emitted by the registry.
//!
//! Every event is appended once all checks for its call have passed, so a
//! rejected call never leaves one behind. Most are appended after the write;
//! `ReviewUpdated` is appended just before it, carrying the old value. Field
//! order within each variant is part of the contract with downstream indexers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use review_access::{Identity, Role};

use crate::types::ReviewId;

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    /// A review was minted
    ReviewCreated {
        creator: Identity,
        id: ReviewId,
        timestamp: DateTime<Utc>,
    },
    /// A review was destroyed
    ReviewDeleted {
        caller: Identity,
        id: ReviewId,
        timestamp: DateTime<Utc>,
    },
    /// Metadata hash replaced. Carries the value from before the change.
    ReviewUpdated {
        caller: Identity,
        id: ReviewId,
        old_metadata_hash: String,
        new_metadata_hash: String,
        timestamp: DateTime<Utc>,
    },
    /// Ownership moved
    Transfer {
        from: Identity,
        to: Identity,
        id: ReviewId,
        timestamp: DateTime<Utc>,
    },
    /// Per-record delegate set or cleared
    Approval {
        owner: Identity,
        approved: Option<Identity>,
        id: ReviewId,
        timestamp: DateTime<Utc>,
    },
    /// Owner-wide operator set or cleared
    ApprovalForAll {
        owner: Identity,
        operator: Identity,
        approved: bool,
        timestamp: DateTime<Utc>,
    },
    RoleGranted {
        role: Role,
        account: Identity,
        sender: Identity,
        timestamp: DateTime<Utc>,
    },
    RoleRevoked {
        role: Role,
        account: Identity,
        sender: Identity,
        timestamp: DateTime<Utc>,
    },
    Paused {
        account: Identity,
        timestamp: DateTime<Utc>,
    },
    Unpaused {
        account: Identity,
        timestamp: DateTime<Utc>,
    },
}

impl ReviewEvent {
    /// Identity that caused the event.
    pub fn actor(&self) -> &Identity {
        match self {
            Self::ReviewCreated { creator, .. } => creator,
            Self::ReviewDeleted { caller, .. } | Self::ReviewUpdated { caller, .. } => caller,
            Self::Transfer { from, .. } => from,
            Self::Approval { owner, .. } | Self::ApprovalForAll { owner, .. } => owner,
            Self::RoleGranted { sender, .. } | Self::RoleRevoked { sender, .. } => sender,
            Self::Paused { account, .. } | Self::Unpaused { account, .. } => account,
        }
    }

    /// Review the event concerns, if any.
    pub fn review_id(&self) -> Option<ReviewId> {
        match self {
            Self::ReviewCreated { id, .. }
            | Self::ReviewDeleted { id, .. }
            | Self::ReviewUpdated { id, .. }
            | Self::Transfer { id, .. }
            | Self::Approval { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Commit time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ReviewCreated { timestamp, .. }
            | Self::ReviewDeleted { timestamp, .. }
            | Self::ReviewUpdated { timestamp, .. }
            | Self::Transfer { timestamp, .. }
            | Self::Approval { timestamp, .. }
            | Self::ApprovalForAll { timestamp, .. }
            | Self::RoleGranted { timestamp, .. }
            | Self::RoleRevoked { timestamp, .. }
            | Self::Paused { timestamp, .. }
            | Self::Unpaused { timestamp, .. } => *timestamp,
        }
    }

    /// Stable event name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReviewCreated { .. } => "review_created",
            Self::ReviewDeleted { .. } => "review_deleted",
            Self::ReviewUpdated { .. } => "review_updated",
            Self::Transfer { .. } => "transfer",
            Self::Approval { .. } => "approval",
            Self::ApprovalForAll { .. } => "approval_for_all",
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
        }
    }
}

/// Append-only destination for events.
///
/// The registry never reads back from its sink; hosts plug in whatever
/// durable log they have.
pub trait EventSink {
    /// Record one committed event.
    fn append(&mut self, event: ReviewEvent);
}

impl EventSink for Vec<ReviewEvent> {
    fn append(&mut self, event: ReviewEvent) {
        self.push(event);
    }
}

/// An entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Position in this log, starting at 0
    pub sequence: u64,
    /// The event itself
    pub event: ReviewEvent,
}

/// In-memory audit log, oldest first.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Events only, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ReviewEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    /// Most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Entries touching review `id`, oldest first.
    pub fn by_review(&self, id: ReviewId) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.event.review_id() == Some(id))
            .cloned()
            .collect()
    }

    /// Entries caused by `actor`, oldest first.
    pub fn by_actor(&self, actor: &Identity) -> Vec<AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.event.actor() == actor)
            .cloned()
            .collect()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// Get count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EventSink for AuditLog {
    fn append(&mut self, event: ReviewEvent) {
        let entry = AuditEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            sequence: self.entries.len() as u64,
            event,
        };
        self.entries.push(entry);
    }
}
