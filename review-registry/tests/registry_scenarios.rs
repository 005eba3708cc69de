//! End-to-end registry scenarios
//!
//! Exercises the public API the way a host would:
//! - identifier allocation across create/delete interleavings
//! - role-gated creation and curation
//! - pause gating of ownership movement
//! - enumeration consistency after mixed operations

use std::collections::{BTreeMap, BTreeSet};

use review_registry::{
    Identity, RegistryError, Review, ReviewEvent, ReviewId, ReviewRegistry, Role,
};

fn example_review(hash: &str) -> Review {
    Review::new(
        "example.com",
        "https://example.com",
        "site",
        "safe",
        "low",
        hash,
    )
}

// =============================================================================
// Identifier allocation
// =============================================================================

#[test]
fn test_lifecycle_walkthrough() {
    let a = Identity::new("A");
    let mut registry = ReviewRegistry::new(&a);

    let id = registry.create(&a, example_review("hash1")).unwrap();
    assert_eq!(id, 0);
    assert_eq!(registry.read(0).unwrap(), "hash1");

    registry.update(&a, 0, "hash2").unwrap();
    let updated = registry
        .events()
        .events()
        .find_map(|e| match e {
            ReviewEvent::ReviewUpdated {
                old_metadata_hash,
                new_metadata_hash,
                ..
            } => Some((old_metadata_hash.clone(), new_metadata_hash.clone())),
            _ => None,
        })
        .expect("update event");
    assert_eq!(updated, ("hash1".to_string(), "hash2".to_string()));
    assert_eq!(registry.read(0).unwrap(), "hash2");

    registry.delete(&a, 0).unwrap();
    assert!(matches!(registry.read(0), Err(RegistryError::NotFound(0))));

    let next = registry.create(&a, example_review("hash3")).unwrap();
    assert_eq!(next, 1);
}

#[test]
fn test_ids_strictly_increase_across_deletes() {
    let a = Identity::new("A");
    let mut registry = ReviewRegistry::new(&a);

    let mut minted: Vec<ReviewId> = Vec::new();
    for round in 0..20u64 {
        let id = registry
            .create(&a, example_review(&format!("h{round}")))
            .unwrap();
        if let Some(prev) = minted.last() {
            assert!(id > *prev);
        }
        minted.push(id);

        // Delete every third review, including the most recent one.
        if round % 3 == 0 {
            registry.delete(&a, id).unwrap();
        }
    }

    let unique: BTreeSet<_> = minted.iter().copied().collect();
    assert_eq!(unique.len(), minted.len());
    assert_eq!(registry.next_id(), 20);
}

#[test]
fn test_unauthorized_create_consumes_no_id() {
    let a = Identity::new("A");
    let b = Identity::new("B");
    let mut registry = ReviewRegistry::new(&a);

    registry.create(&a, example_review("first")).unwrap();
    let events_before = registry.events().len();

    let err = registry.create(&b, example_review("nope")).unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized { .. }));
    assert_eq!(registry.events().len(), events_before);

    assert_eq!(registry.create(&a, example_review("second")).unwrap(), 1);
}

#[test]
fn test_create_delete_read_not_found() {
    let a = Identity::new("A");
    let mut registry = ReviewRegistry::new(&a);

    let id = registry.create(&a, example_review("h")).unwrap();
    registry.delete(&a, id).unwrap();

    assert!(matches!(registry.read(id), Err(RegistryError::NotFound(_))));
    assert!(matches!(registry.owner_of(id), Err(RegistryError::NotFound(_))));
    assert!(matches!(
        registry.update(&a, id, "again"),
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.delete(&a, id),
        Err(RegistryError::NotFound(_))
    ));
}

// =============================================================================
// Curation and pause
// =============================================================================

#[test]
fn test_update_nonexistent_emits_nothing() {
    let a = Identity::new("A");
    let mut registry = ReviewRegistry::new(&a);
    let before = registry.events().len();

    assert!(matches!(
        registry.update(&a, 5, "h"),
        Err(RegistryError::NotFound(5))
    ));
    assert_eq!(registry.events().len(), before);
}

// Any creator may edit any review's metadata; ownership is not consulted.
#[test]
fn test_cross_owner_metadata_edit_is_allowed() {
    let a = Identity::new("A");
    let c = Identity::new("C");
    let mut registry = ReviewRegistry::new(&a);
    registry.grant_role(&a, Role::Creator, &c).unwrap();

    let owned_by_a = registry.create(&a, example_review("h")).unwrap();
    registry.update(&c, owned_by_a, "by-c").unwrap();
    assert_eq!(registry.read(owned_by_a).unwrap(), "by-c");

    // Deleting still requires ownership.
    assert!(matches!(
        registry.delete(&c, owned_by_a),
        Err(RegistryError::Unauthorized { .. })
    ));
}

#[test]
fn test_transfer_blocked_while_paused() {
    let a = Identity::new("A");
    let b = Identity::new("B");
    let mut registry = ReviewRegistry::new(&a);
    let id = registry.create(&a, example_review("h")).unwrap();

    registry.pause(&a).unwrap();
    assert!(matches!(
        registry.transfer(&a, id, &b),
        Err(RegistryError::Paused)
    ));

    registry.unpause(&a).unwrap();
    registry.transfer(&a, id, &b).unwrap();
    assert_eq!(registry.owner_of(id).unwrap(), &b);
}

#[test]
fn test_role_grant_twice_is_noop() {
    let a = Identity::new("A");
    let b = Identity::new("B");
    let mut registry = ReviewRegistry::new(&a);

    registry.grant_role(&a, Role::Moderator, &b).unwrap();
    let holders = registry.role_members(Role::Moderator).len();
    assert!(!registry.grant_role(&a, Role::Moderator, &b).unwrap());
    assert_eq!(registry.role_members(Role::Moderator).len(), holders);

    assert!(!registry.revoke_role(&a, Role::Creator, &b).unwrap());
}

// =============================================================================
// Enumeration consistency
// =============================================================================

#[test]
fn test_enumeration_matches_ownership_after_mixed_operations() {
    let a = Identity::new("A");
    let b = Identity::new("B");
    let c = Identity::new("C");
    let mut registry = ReviewRegistry::new(&a);
    registry.grant_role(&a, Role::Creator, &b).unwrap();
    registry.set_approval_for_all(&b, &c, true).unwrap();

    let mut ids = Vec::new();
    for i in 0..12 {
        let creator = if i % 2 == 0 { &a } else { &b };
        ids.push(registry.create(creator, example_review(&format!("h{i}"))).unwrap());
    }

    registry.transfer(&a, ids[0], &c).unwrap();
    registry.transfer(&c, ids[1], &a).unwrap();
    registry.transfer(&a, ids[2], &b).unwrap();
    registry.delete(&c, ids[3]).unwrap();
    registry.delete(&a, ids[4]).unwrap();
    registry.transfer(&c, ids[0], &b).unwrap();

    let mut expected: BTreeMap<Identity, BTreeSet<ReviewId>> = BTreeMap::new();
    for id in registry.enumerate_all() {
        let owner = registry.owner_of(id).unwrap().clone();
        expected.entry(owner).or_default().insert(id);
    }

    for identity in [&a, &b, &c] {
        let listed = registry.enumerate_by_owner(identity);
        assert_eq!(
            listed,
            expected.get(identity).cloned().unwrap_or_default(),
            "enumeration mismatch for {identity}"
        );
        assert_eq!(registry.balance_of(identity), listed.len());
    }

    let all = registry.enumerate_all();
    assert_eq!(all.len(), 10);
    assert!(all.windows(2).all(|w| w[0] < w[1]));
    assert!(!all.contains(&ids[3]));
    assert!(!all.contains(&ids[4]));
}

#[test]
fn test_snapshot_survives_json_roundtrip() {
    let a = Identity::new("A");
    let b = Identity::new("B");
    let mut registry = ReviewRegistry::new(&a);
    for i in 0..3 {
        registry.create(&a, example_review(&format!("h{i}"))).unwrap();
    }
    registry.transfer(&a, 1, &b).unwrap();
    registry.delete(&a, 0).unwrap();

    let json = registry.snapshot().unwrap().to_json().unwrap();
    let snapshot = review_registry::RegistrySnapshot::from_json(&json).unwrap();
    let mut restored = ReviewRegistry::from_snapshot(
        snapshot,
        registry.config().clone(),
        review_registry::AuditLog::new(),
    )
    .unwrap();

    assert_eq!(restored.enumerate_all(), registry.enumerate_all());
    assert_eq!(restored.enumerate_by_owner(&b), registry.enumerate_by_owner(&b));
    assert_eq!(restored.create(&a, example_review("next")).unwrap(), 3);
}
