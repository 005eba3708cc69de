//! ReviewRegistry - the orchestrator over roles, pause switch and records.
//!
//! Every public operation follows the same sequence: authorize, check the
//! pause switch where ownership moves, mutate the [`RecordStore`], then
//! append an event. Nothing is written until every check has passed.

use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use review_access::{Identity, PauseSwitch, Role, RoleRegistry};

use crate::config::RegistryConfig;
use crate::events::{AuditLog, EventSink, ReviewEvent};
use crate::snapshot::{RegistrySnapshot, SnapshotState};
use crate::store::RecordStore;
use crate::types::{RegistryError, Result, Review, ReviewId};

/// Permissioned registry of owned review records.
///
/// Calls are expected to run one at a time. Hosts with concurrent callers
/// should go through [`crate::SharedReviewRegistry`].
#[derive(Debug)]
pub struct ReviewRegistry<S: EventSink = AuditLog> {
    /// Configuration
    config: RegistryConfig,
    /// Role membership
    roles: RoleRegistry,
    /// Ownership movement gate
    pause: PauseSwitch,
    /// Records, owners and indices
    store: RecordStore,
    /// Where committed events go
    sink: S,
}

impl ReviewRegistry<AuditLog> {
    /// Create a registry bootstrapped by `admin`, with default configuration.
    pub fn new(admin: &Identity) -> Self {
        Self::with_config(admin, RegistryConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(admin: &Identity, config: RegistryConfig) -> Self {
        Self::with_sink(admin, config, AuditLog::new())
    }
}

impl<S: EventSink> ReviewRegistry<S> {
    /// Create a registry writing events to `sink`.
    ///
    /// `admin` receives every role: administrator, creator and moderator.
    /// This is the only grant that happens without an administrator caller.
    pub fn with_sink(admin: &Identity, config: RegistryConfig, sink: S) -> Self {
        let mut registry = Self::from_parts(
            config,
            RoleRegistry::new(),
            PauseSwitch::new(),
            RecordStore::new(),
            sink,
        );

        for role in Role::all() {
            if registry.roles.grant(role, admin) {
                registry.emit(ReviewEvent::RoleGranted {
                    role,
                    account: admin.clone(),
                    sender: admin.clone(),
                    timestamp: Utc::now(),
                });
            }
        }

        info!(
            admin = %admin,
            name = %registry.config.name,
            "Initialized review registry"
        );
        registry
    }

    /// Assemble a registry from existing components.
    pub fn from_parts(
        config: RegistryConfig,
        roles: RoleRegistry,
        pause: PauseSwitch,
        store: RecordStore,
        sink: S,
    ) -> Self {
        Self {
            config,
            roles,
            pause,
            store,
            sink,
        }
    }

    /// Rebuild a registry from a verified snapshot.
    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        config: RegistryConfig,
        sink: S,
    ) -> Result<Self> {
        let (store, roles, pause) = snapshot.into_parts()?;
        info!(
            next_id = store.next_id(),
            total_supply = store.total_supply(),
            paused = pause.is_paused(),
            "Restored review registry from snapshot"
        );
        Ok(Self::from_parts(config, roles, pause, store, sink))
    }

    // ========== Records ==========

    /// Mint a review owned by `caller`. Requires [`Role::Creator`].
    ///
    /// Not pause-gated: pausing freezes ownership movement, not curation.
    pub fn create(&mut self, caller: &Identity, review: Review) -> Result<ReviewId> {
        self.require_role(caller, Role::Creator)?;

        let id = self.store.mint(caller)?;
        self.store.set_record(id, review)?;

        info!(review_id = id, creator = %caller, "Created review");
        self.emit(ReviewEvent::ReviewCreated {
            creator: caller.clone(),
            id,
            timestamp: Utc::now(),
        });
        Ok(id)
    }

    /// Destroy review `id`. Caller must be its owner or a delegate.
    pub fn delete(&mut self, caller: &Identity, id: ReviewId) -> Result<()> {
        self.require_owner_or_delegate(caller, id)?;

        let (owner, _) = self.store.burn(id)?;

        info!(review_id = id, caller = %caller, owner = %owner, "Deleted review");
        self.emit(ReviewEvent::ReviewDeleted {
            caller: caller.clone(),
            id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Current metadata hash of review `id`.
    pub fn read(&self, id: ReviewId) -> Result<&str> {
        let review = self.store.get_record(id)?;
        debug!(review_id = id, "Read review");
        Ok(&review.metadata_hash)
    }

    /// Full payload of review `id`.
    pub fn get_review(&self, id: ReviewId) -> Result<&Review> {
        self.store.get_record(id)
    }

    /// Replace the metadata hash of review `id`. Requires [`Role::Creator`].
    ///
    /// Ownership of `id` is not checked: any creator may edit any review.
    /// The event is appended before the write and carries the old value.
    pub fn update(
        &mut self,
        caller: &Identity,
        id: ReviewId,
        metadata_hash: impl Into<String>,
    ) -> Result<()> {
        self.require_role(caller, Role::Creator)?;

        let metadata_hash = metadata_hash.into();
        let old = self.store.get_record(id)?.metadata_hash.clone();

        self.emit(ReviewEvent::ReviewUpdated {
            caller: caller.clone(),
            id,
            old_metadata_hash: old.clone(),
            new_metadata_hash: metadata_hash.clone(),
            timestamp: Utc::now(),
        });
        self.store.update_field(id, metadata_hash)?;

        info!(review_id = id, caller = %caller, old_metadata_hash = %old, "Updated review");
        Ok(())
    }

    // ========== Ownership ==========

    /// Move review `id` to `to`. Caller must be its owner or a delegate and
    /// the registry must not be paused.
    pub fn transfer(&mut self, caller: &Identity, id: ReviewId, to: &Identity) -> Result<()> {
        let owner = self.require_owner_or_delegate(caller, id)?;

        if let Err(err) = self.pause.ensure_running() {
            warn!(review_id = id, caller = %caller, "Transfer rejected while paused");
            return Err(err.into());
        }

        self.store.transfer_ownership(id, &owner, to)?;

        info!(review_id = id, from = %owner, to = %to, caller = %caller, "Transferred review");
        self.emit(ReviewEvent::Transfer {
            from: owner,
            to: to.clone(),
            id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Set or clear the per-record delegate of `id`.
    ///
    /// Caller must be the owner or one of its operators. The approval is
    /// dropped automatically on transfer and delete.
    pub fn approve(
        &mut self,
        caller: &Identity,
        id: ReviewId,
        approved: Option<&Identity>,
    ) -> Result<()> {
        let owner = self.store.owner_of(id)?.clone();
        if *caller != owner && !self.store.is_operator(&owner, caller) {
            warn!(review_id = id, caller = %caller, "Approve denied");
            return Err(RegistryError::unauthorized(
                caller,
                format!("not the owner or an operator for review {id}"),
            ));
        }
        if approved == Some(&owner) {
            return Err(RegistryError::SelfApproval(owner));
        }

        self.store.set_approval(id, approved)?;

        debug!(review_id = id, owner = %owner, "Updated review approval");
        self.emit(ReviewEvent::Approval {
            owner,
            approved: approved.cloned(),
            id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Let `operator` act for every review `caller` holds, or stop it.
    pub fn set_approval_for_all(
        &mut self,
        caller: &Identity,
        operator: &Identity,
        approved: bool,
    ) -> Result<()> {
        if caller == operator {
            return Err(RegistryError::SelfApproval(caller.clone()));
        }

        self.store.set_operator(caller, operator, approved);

        debug!(owner = %caller, operator = %operator, approved, "Updated operator approval");
        self.emit(ReviewEvent::ApprovalForAll {
            owner: caller.clone(),
            operator: operator.clone(),
            approved,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Per-record delegate of `id`.
    pub fn get_approved(&self, id: ReviewId) -> Result<Option<&Identity>> {
        self.store.get_approved(id)
    }

    /// Whether `operator` may act for everything `owner` holds.
    pub fn is_approved_for_all(&self, owner: &Identity, operator: &Identity) -> bool {
        self.store.is_operator(owner, operator)
    }

    /// Current owner of `id`.
    pub fn owner_of(&self, id: ReviewId) -> Result<&Identity> {
        self.store.owner_of(id)
    }

    pub fn balance_of(&self, owner: &Identity) -> usize {
        self.store.balance_of(owner)
    }

    pub fn total_supply(&self) -> usize {
        self.store.total_supply()
    }

    pub fn token_by_index(&self, index: usize) -> Result<ReviewId> {
        self.store.token_by_index(index)
    }

    pub fn token_of_owner_by_index(&self, owner: &Identity, index: usize) -> Result<ReviewId> {
        self.store.token_of_owner_by_index(owner, index)
    }

    /// All live reviews in creation order.
    pub fn enumerate_all(&self) -> Vec<ReviewId> {
        self.store.enumerate_all()
    }

    /// Reviews currently held by `owner`.
    pub fn enumerate_by_owner(&self, owner: &Identity) -> BTreeSet<ReviewId> {
        self.store.enumerate_by_owner(owner)
    }

    /// Identifier the next successful `create` will return.
    pub fn next_id(&self) -> ReviewId {
        self.store.next_id()
    }

    // ========== Roles ==========

    /// Grant `role` to `account`. Requires [`Role::Administrator`].
    ///
    /// Returns `false`, with no event, if `account` already held it.
    pub fn grant_role(
        &mut self,
        caller: &Identity,
        role: Role,
        account: &Identity,
    ) -> Result<bool> {
        self.require_role(caller, Role::Administrator)?;

        if !self.roles.grant(role, account) {
            return Ok(false);
        }

        info!(role = %role, account = %account, sender = %caller, "Granted role");
        self.emit(ReviewEvent::RoleGranted {
            role,
            account: account.clone(),
            sender: caller.clone(),
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    /// Revoke `role` from `account`. Requires [`Role::Administrator`].
    ///
    /// Returns `false`, with no event, if `account` did not hold it.
    pub fn revoke_role(
        &mut self,
        caller: &Identity,
        role: Role,
        account: &Identity,
    ) -> Result<bool> {
        self.require_role(caller, Role::Administrator)?;
        Ok(self.drop_role(caller, role, account))
    }

    /// Give up a role `caller` holds. No administrator needed.
    pub fn renounce_role(&mut self, caller: &Identity, role: Role) -> bool {
        self.drop_role(caller, role, caller)
    }

    pub fn has_role(&self, role: Role, account: &Identity) -> bool {
        self.roles.has(role, account)
    }

    pub fn role_members(&self, role: Role) -> Vec<Identity> {
        self.roles.members(role)
    }

    // ========== Pause ==========

    /// Block ownership movement. Requires [`Role::Moderator`]; idempotent.
    pub fn pause(&mut self, caller: &Identity) -> Result<()> {
        self.require_role(caller, Role::Moderator)?;

        if self.pause.pause() {
            info!(account = %caller, "Registry paused");
            self.emit(ReviewEvent::Paused {
                account: caller.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    /// Resume ownership movement. Requires [`Role::Moderator`]; idempotent.
    pub fn unpause(&mut self, caller: &Identity) -> Result<()> {
        self.require_role(caller, Role::Moderator)?;

        if self.pause.unpause() {
            info!(account = %caller, "Registry unpaused");
            self.emit(ReviewEvent::Unpaused {
                account: caller.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    // ========== Misc ==========

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The event sink.
    pub fn events(&self) -> &S {
        &self.sink
    }

    /// Export the persistent state.
    pub fn snapshot(&self) -> Result<RegistrySnapshot> {
        let tables = self.store.tables();
        RegistrySnapshot::seal(SnapshotState {
            next_id: tables.next_id,
            records: tables.records,
            owners: tables.owners,
            approvals: tables.approvals,
            operators: tables.operators,
            roles: self.roles.clone(),
            paused: self.pause.is_paused(),
        })
    }

    /// Authorization check run at the top of role-gated operations.
    fn require_role(&self, caller: &Identity, role: Role) -> Result<()> {
        self.roles.require(role, caller).map_err(|err| {
            warn!(caller = %caller, role = %role, "Role check failed");
            RegistryError::from(err)
        })
    }

    /// Resolve the owner of `id` and check `caller` may act for it.
    fn require_owner_or_delegate(&self, caller: &Identity, id: ReviewId) -> Result<Identity> {
        let owner = self.store.owner_of(id)?;
        let delegated = self.store.get_approved(id)? == Some(caller)
            || self.store.is_operator(owner, caller);

        if caller == owner || delegated {
            Ok(owner.clone())
        } else {
            warn!(review_id = id, caller = %caller, owner = %owner, "Ownership check failed");
            Err(RegistryError::unauthorized(
                caller,
                format!("not the owner or a delegate for review {id}"),
            ))
        }
    }

    fn drop_role(&mut self, sender: &Identity, role: Role, account: &Identity) -> bool {
        if !self.roles.revoke(role, account) {
            return false;
        }

        info!(role = %role, account = %account, sender = %sender, "Revoked role");
        self.emit(ReviewEvent::RoleRevoked {
            role,
            account: account.clone(),
            sender: sender.clone(),
            timestamp: Utc::now(),
        });
        true
    }

    fn emit(&mut self, event: ReviewEvent) {
        self.sink.append(event);
    }
}
