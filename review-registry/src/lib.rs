//! Review Registry - permissioned, owned website review records
//!
//! Each review is minted with a never-reused identifier, owned by one
//! identity at a time and destroyed for good on delete. Three independent
//! components are composed by a single orchestrator:
//!
//! - [`RoleRegistry`]: creator, moderator and administrator membership
//! - [`PauseSwitch`]: blocks ownership movement while set
//! - [`RecordStore`]: payloads, owners, identifier counter, enumeration
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               ReviewRegistry                  │
//! │   authorize → pause check → mutate → emit     │
//! └───────┬──────────────┬──────────────┬─────────┘
//!         ▼              ▼              ▼
//!  ┌────────────┐ ┌─────────────┐ ┌─────────────┐   ┌───────────┐
//!  │RoleRegistry│ │ PauseSwitch │ │ RecordStore │   │ EventSink │
//!  └────────────┘ └─────────────┘ └─────────────┘   └───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use review_registry::{Identity, Review, ReviewRegistry};
//!
//! let admin = Identity::new("admin");
//! let mut registry = ReviewRegistry::new(&admin);
//!
//! let review = Review::new("example.com", "https://example.com", "site", "safe", "low", "hash1");
//! let id = registry.create(&admin, review).unwrap();
//! assert_eq!(registry.read(id).unwrap(), "hash1");
//! ```

pub mod config;
pub mod events;
pub mod registry;
pub mod shared;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export main types
pub use config::RegistryConfig;
pub use events::{AuditEntry, AuditLog, EventSink, ReviewEvent};
pub use registry::ReviewRegistry;
pub use review_access::{AccessError, Identity, PauseSwitch, Role, RoleRegistry};
pub use shared::SharedReviewRegistry;
pub use snapshot::{RegistrySnapshot, SnapshotState};
pub use store::{RecordStore, StoreTables};
pub use types::*;
