//! Property-based checks for angle reflection and wing partitioning

use proptest::prelude::*;

use rig_symmetry::rig::angle::{nearest_equivalent, projected_angle, same_direction};
use rig_symmetry::rig::wings::{partition_closed, partition_open, WingPartition};

const TOLERANCE: f64 = 1e-6;

/// Every index in `0..len` appears exactly once across the partition and
/// the `extra` indices
fn covers_exactly(partition: &WingPartition, extra: &[usize], len: usize) -> bool {
    let mut seen = vec![0usize; len];
    for &index in partition
        .wing0
        .iter()
        .chain(&partition.wing1)
        .chain(partition.remainder.iter())
        .chain(extra)
    {
        if index >= len {
            return false;
        }
        seen[index] += 1;
    }
    seen.iter().all(|&count| count == 1)
}

// ============================================================================
// Angles
// ============================================================================

proptest! {
    #[test]
    fn reflection_negates_direction(value in -1080.0f64..1080.0) {
        prop_assert!(same_direction(projected_angle(value, false), -value, TOLERANCE));
        prop_assert!(same_direction(projected_angle(value, true), 180.0 - value, TOLERANCE));
    }

    #[test]
    fn reflecting_twice_restores_direction(value in -1080.0f64..1080.0, rotate180 in any::<bool>()) {
        let twice = projected_angle(projected_angle(value, rotate180), rotate180);
        prop_assert!(same_direction(twice, value, TOLERANCE));
    }

    #[test]
    fn nearest_equivalent_stays_within_half_turn(
        original in -1080.0f64..1080.0,
        projection in -1080.0f64..1080.0,
    ) {
        let result = nearest_equivalent(original, projection);
        prop_assert!((result - original).abs() <= 180.0 + TOLERANCE);
        prop_assert!(same_direction(result, projection + 180.0, TOLERANCE));
    }
}

// ============================================================================
// Wings
// ============================================================================

proptest! {
    #[test]
    fn open_partition_pairs_from_both_ends(len in 1usize..64) {
        let partition = partition_open(len);
        prop_assert_eq!(partition.wing0.len(), len / 2);
        prop_assert_eq!(partition.wing1.len(), len / 2);
        prop_assert!(covers_exactly(&partition, &[], len));
        for (prime, opp) in partition.pairs() {
            prop_assert_eq!(prime + opp, len - 1);
        }
    }

    #[test]
    fn closed_partition_around_one_anchor(len in 2usize..48, seed in 0usize..1000) {
        let joint = len - 1;
        let anchor = seed % joint;
        let partition = partition_closed(len, &[anchor]).unwrap();

        prop_assert_eq!(partition.wing0.len(), partition.wing1.len());
        prop_assert!(covers_exactly(&partition, &[anchor, joint], len));
    }

    #[test]
    fn closed_partition_between_neighbours(len in 3usize..48, seed in 0usize..1000) {
        let ring = len - 1;
        let first = seed % ring;
        let second = (first + ring - 1) % ring;
        let partition = partition_closed(len, &[first, second]).unwrap();

        prop_assert_eq!(partition.wing0.first().copied(), Some(first));
        prop_assert_eq!(partition.wing1.first().copied(), Some(second));
        prop_assert!(covers_exactly(&partition, &[ring], len));
    }
}
