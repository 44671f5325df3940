//! Tests for `TileBitset` operations including set operations and iteration

#[cfg(test)]
mod tests {
    use tilecollapse::algorithm::bitset::{BITSET_CAPACITY, TileBitset};

    // Verifies new TileBitset is empty with count 0
    // Verified by initializing bitset with all bits set to 1
    #[test]
    fn test_new_bitset() {
        let bitset = TileBitset::new();
        assert_eq!(bitset.count(), 0);
        assert!(bitset.is_empty());
        assert_eq!(bitset.first(), None);
    }

    // Tests insertion and containment checking
    // Verified by removing the bit-setting logic from insert method
    #[test]
    fn test_insert_and_contains() {
        let mut bitset = TileBitset::new();
        bitset.insert(5);
        assert!(bitset.contains(5));
        assert!(!bitset.contains(3));
        assert_eq!(bitset.count(), 1);

        bitset.remove(5);
        assert!(bitset.is_empty());
    }

    // Tests full domains for the boundary sizes
    // Verified by using `1 << n` without the capacity special case
    #[test]
    fn test_full_sets_lowest_bits() {
        assert!(TileBitset::full(0).is_empty());
        assert_eq!(TileBitset::full(3).to_vec(), vec![0, 1, 2]);
        assert_eq!(TileBitset::full(BITSET_CAPACITY).count(), BITSET_CAPACITY);
        assert!(TileBitset::full(BITSET_CAPACITY).contains(127));
    }

    // Tests indices beyond capacity are ignored
    // Verified by removing the capacity check in insert
    #[test]
    fn test_out_of_range_indices_ignored() {
        let mut bitset = TileBitset::new();
        bitset.insert(BITSET_CAPACITY);
        assert!(bitset.is_empty());
        assert!(!bitset.contains(200));
        assert!(TileBitset::single(BITSET_CAPACITY).is_empty());
        assert_eq!(TileBitset::single(127).first(), Some(127));
    }

    // Tests intersection of two bitsets returns correct elements
    // Verified by changing intersection operation to union operation
    #[test]
    fn test_intersection() {
        let set1: TileBitset = [1, 3, 5].into_iter().collect();
        let set2: TileBitset = [3, 5, 7].into_iter().collect();

        assert_eq!(set1.intersection(&set2).to_vec(), vec![3, 5]);

        let mut in_place = set1;
        in_place.intersect_with(&set2);
        assert_eq!(in_place, set1.intersection(&set2));
    }

    // Tests union adds all members of the other set
    // Verified by replacing OR with XOR
    #[test]
    fn test_union_with() {
        let mut set: TileBitset = [0, 64].into_iter().collect();
        set.union_with(&[64, 127].into_iter().collect());
        assert_eq!(set.to_vec(), vec![0, 64, 127]);
    }

    // Tests iteration is ascending and reports an exact length
    // Verified by clearing the highest bit instead of the lowest
    #[test]
    fn test_iter_ascending_exact_size() {
        let set: TileBitset = [100, 2, 65, 0].into_iter().collect();
        let iter = set.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.collect::<Vec<_>>(), vec![0, 2, 65, 100]);
        assert_eq!(set.first(), Some(0));
        assert_eq!(set.iter().max(), Some(100));
    }

    // Tests display lists count and members
    #[test]
    fn test_display() {
        let set: TileBitset = [1, 4].into_iter().collect();
        assert_eq!(set.to_string(), "TileBitset(2 tiles: [1, 4])");
    }
}
