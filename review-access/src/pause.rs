//! Global pause switch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{AccessError, Result};

/// Process-wide gate on ownership movement.
///
/// Redundant calls are no-ops: `pause` on a paused switch and `unpause` on a
/// running one both return `false` and change nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    /// Create an unpaused switch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a switch in the given state.
    pub fn with_state(paused: bool) -> Self {
        Self { paused }
    }

    /// Set the switch. Returns `true` if the state changed.
    pub fn pause(&mut self) -> bool {
        if self.paused {
            debug!("Already paused");
            return false;
        }
        self.paused = true;
        true
    }

    /// Clear the switch. Returns `true` if the state changed.
    pub fn unpause(&mut self) -> bool {
        if !self.paused {
            debug!("Already unpaused");
            return false;
        }
        self.paused = false;
        true
    }

    /// Whether ownership movement is currently blocked.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fail with [`AccessError::Paused`] while the switch is set.
    pub fn ensure_running(&self) -> Result<()> {
        if self.paused {
            Err(AccessError::Paused)
        } else {
            Ok(())
        }
    }
}
