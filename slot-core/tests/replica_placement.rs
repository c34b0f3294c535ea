//! Replica placement guardrail tests
//!
//! Every active replica must land inside the scheme's slot space, CRDSA
//! replicas of one user must be distinct, and MF-CRDSA replicas must each sit
//! in their own time block.

use std::collections::HashSet;

use slotsim_core::scheme::block_size;
use slotsim_core::{
    seeded_rng, FrameArena, PowerDistribution, PowerStrategy, Scheme, TimeSlotGenerator,
};

fn placements(scheme: &Scheme, nslots: usize, users: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut arena = FrameArena::for_scheme(scheme, nslots);
    let mut rng = seeded_rng(seed);
    let frame = arena
        .build(
            scheme,
            PowerStrategy::SamePower,
            &PowerDistribution::default(),
            users,
            &mut rng,
        )
        .unwrap();
    frame
        .users()
        .map(|u| u.active().map(|r| r.slot).collect())
        .collect()
}

#[test]
fn crdsa_replicas_are_distinct_and_in_range() {
    for seed in 0..20 {
        for slots in placements(&Scheme::crdsa(3), 10, 50, seed) {
            assert_eq!(slots.len(), 3);
            assert!(slots.iter().all(|s| (1..=10).contains(s)));
            let unique: HashSet<_> = slots.iter().collect();
            assert_eq!(unique.len(), 3, "duplicate slot in {slots:?}");
        }
    }
}

#[test]
fn crdsa_fills_every_slot_when_replicas_equal_slots() {
    for slots in placements(&Scheme::crdsa(4), 4, 10, 1) {
        let mut sorted = slots.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }
}

#[test]
fn mf_crdsa_sequential_blocks_hold_one_replica_each() {
    let block = block_size(12, 4).unwrap();
    assert_eq!(block, 3);
    for slots in placements(&Scheme::mf_crdsa(3, 4), 12, 100, 7) {
        for (i, slot) in slots.iter().enumerate() {
            let first = i * block + 1;
            assert!(
                (first..first + block).contains(slot),
                "replica {i} at slot {slot} outside block {}",
                i + 1
            );
        }
    }
}

#[test]
fn mf_crdsa_random_blocks_are_distinct() {
    let scheme = Scheme::MfCrdsa {
        max_replicas: 2,
        n_time_slots: 5,
        time_slot_generator: TimeSlotGenerator::Random,
    };
    let mut seen_blocks = HashSet::new();
    for slots in placements(&scheme, 20, 200, 3) {
        let blocks: Vec<usize> = slots.iter().map(|s| (s - 1) / 4 + 1).collect();
        assert_ne!(blocks[0], blocks[1]);
        assert!(blocks.iter().all(|b| (1..=5).contains(b)));
        seen_blocks.extend(blocks);
    }
    assert_eq!(seen_blocks.len(), 5);
}

#[test]
fn mf_crdsa_fixed_blocks_are_honoured() {
    let scheme = Scheme::MfCrdsa {
        max_replicas: 2,
        n_time_slots: 4,
        time_slot_generator: TimeSlotGenerator::Fixed(vec![4, 2]),
    };
    for slots in placements(&scheme, 8, 50, 5) {
        assert!((7..=8).contains(&slots[0]));
        assert!((3..=4).contains(&slots[1]));
    }
}

#[test]
fn ra4step_single_replica_over_virtual_slots() {
    let scheme = Scheme::ra4step(5, 2, 3, false);
    let mut covered = HashSet::new();
    for slots in placements(&scheme, 0, 500, 11) {
        assert_eq!(slots.len(), 1);
        assert!((1..=15).contains(&slots[0]));
        covered.insert(slots[0]);
    }
    assert_eq!(covered.len(), 15);
}

#[test]
fn identical_seeds_place_identically() {
    let scheme = Scheme::crdsa(2);
    assert_eq!(placements(&scheme, 30, 40, 99), placements(&scheme, 30, 40, 99));
}
