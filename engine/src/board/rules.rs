use crate::tile::Tile;

pub const SEED_LOW: u32 = 2;
pub const SEED_HIGH: u32 = 3;
/// Result of merging the two seeds, and the first value that merges with itself.
pub const PRIME_MERGE: u32 = 5;

fn is_seed_pair(a: u32, b: u32) -> bool {
    (a == SEED_LOW && b == SEED_HIGH) || (a == SEED_HIGH && b == SEED_LOW)
}

/// Whether `moving` may merge into the stationary `target`.
pub fn can_merge(moving: &Tile, target: &Tile) -> bool {
    !target.locked && values_merge(moving.value(), target.value())
}

/// Value-only part of the merge rule. Seeds never merge with themselves.
pub fn values_merge(a: u32, b: u32) -> bool {
    is_seed_pair(a, b) || (a == b && a >= PRIME_MERGE)
}

/// Value carried by the stationary tile after a merge.
pub fn merged_value(moving: u32, stationary: u32) -> u32 {
    if is_seed_pair(moving, stationary) {
        PRIME_MERGE
    } else {
        stationary.saturating_mul(2)
    }
}

/// Points awarded for a merge: twice the resulting value.
pub fn merge_points(result: u32) -> u64 {
    u64::from(result) * 2
}

/// The other seed value. Anything else maps to itself.
pub fn opposite_seed(value: u32) -> u32 {
    match value {
        SEED_LOW => SEED_HIGH,
        SEED_HIGH => SEED_LOW,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use primes_common::models::Pos;

    use super::*;
    use crate::config::TileStyles;

    fn tile(value: u32) -> Tile {
        Tile::new(value, Pos::new(0, 0), &TileStyles::default())
    }

    #[test]
    fn seeds_merge_only_with_each_other() {
        assert!(values_merge(2, 3));
        assert!(values_merge(3, 2));
        assert!(!values_merge(2, 2));
        assert!(!values_merge(3, 3));
        assert!(!values_merge(2, 5));
        assert!(!values_merge(3, 5));
    }

    #[test]
    fn doubling_starts_at_five() {
        assert!(values_merge(5, 5));
        assert!(values_merge(40, 40));
        assert!(!values_merge(5, 10));
    }

    #[test]
    fn seed_pair_yields_five() {
        assert_eq!(merged_value(2, 3), 5);
        assert_eq!(merged_value(3, 2), 5);
        assert_eq!(merge_points(5), 10);
    }

    #[test]
    fn equal_pair_doubles_and_scores_four_times_value() {
        for v in [5, 10, 20, 640] {
            let result = merged_value(v, v);
            assert_eq!(result, 2 * v);
            assert_eq!(merge_points(result), 4 * u64::from(v));
        }
    }

    #[test]
    fn locked_target_never_merges() {
        let moving = tile(5);
        let mut target = tile(5);
        assert!(can_merge(&moving, &target));
        assert!(can_merge(&target, &moving));

        target.locked = true;
        assert!(!can_merge(&moving, &target));

        let mut seed = tile(2);
        seed.locked = true;
        assert!(!can_merge(&tile(3), &seed));
        assert!(can_merge(&seed, &tile(3)));
    }

    #[test]
    fn opposite_seed_swaps() {
        assert_eq!(opposite_seed(2), 3);
        assert_eq!(opposite_seed(3), 2);
        assert_eq!(opposite_seed(5), 5);
    }
}
