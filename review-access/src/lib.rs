//! Access control for the review registry.
//!
//! Two independent, unchecked stores that the registry orchestrator consults
//! before every mutation:
//!
//! - [`RoleRegistry`]: which identities hold which [`Role`]
//! - [`PauseSwitch`]: the global gate on ownership movement
//!
//! Neither store authorizes its own callers. Deciding *who* may grant a role
//! or flip the switch is the orchestrator's job, done once at its boundary.

pub mod pause;
pub mod roles;
pub mod types;

// Re-export main types
pub use pause::PauseSwitch;
pub use roles::{Role, RoleRegistry};
pub use types::*;
