use frontier::{leaf_hash, pair_hash, Frontier, FrontierEntry, FrontierError, Hash32, ENTRY_SIZE};
use rand::{Rng, RngCore};

/// Largest power of two strictly less than n.
fn split_point(n: usize) -> usize {
    let mut k = 1;
    while k < n {
        k <<= 1;
    }
    k >> 1
}

/// Reference Merkle head over pre-hashed leaves, straight from the
/// recursive definition: split at the largest power of two below the
/// length, older half on the left.
fn merkle_tree_head(leaves: &[Hash32]) -> Hash32 {
    if leaves.len() == 1 {
        return leaves[0];
    }

    let k = split_point(leaves.len());
    let left = merkle_tree_head(&leaves[..k]);
    let right = merkle_tree_head(&leaves[k..]);
    pair_hash(&left, &right)
}

#[test]
fn test_size_and_head_match_reference() {
    let mut f = Frontier::new();
    let mut leaves: Vec<Hash32> = Vec::new();

    for i in 0u64..100 {
        let blob = i.to_be_bytes();
        leaves.push(leaf_hash(&blob));
        f.add(&blob);

        assert_eq!(f.size(), i + 1, "incorrect size after {} adds", i + 1);

        let expected = merkle_tree_head(&leaves);
        let head = f.head().expect("non-empty frontier has a head");
        assert_eq!(
            hex::encode(head),
            hex::encode(expected),
            "incorrect head after {} adds",
            i + 1
        );
    }
}

#[test]
fn test_invariants_after_every_add() {
    let mut rng = rand::thread_rng();
    let mut f = Frontier::new();

    for n in 1u64..=256 {
        let mut blob = vec![0u8; rng.gen_range(0..64)];
        rng.fill_bytes(&mut blob);
        f.add(&blob);

        let entries = f.entries();

        // One entry per set bit, sizes strictly decreasing powers of two,
        // summing to the number of leaves appended.
        assert_eq!(entries.len() as u32, n.count_ones());
        assert_eq!(entries.iter().map(|e| e.subtree_size).sum::<u64>(), n);
        for pair in entries.windows(2) {
            assert!(pair[0].subtree_size > pair[1].subtree_size);
        }
        for entry in entries {
            assert!(entry.subtree_size.is_power_of_two());
        }
    }
}

#[test]
fn test_empty_frontier() {
    let f = Frontier::new();
    assert_eq!(f.size(), 0);
    assert!(f.is_empty());
    assert!(f.head().is_none());
    assert_eq!(f.marshal().len(), 0);
}

#[test]
fn test_single_leaf_head_is_leaf_hash() {
    let mut f = Frontier::new();
    f.add(b"only");

    assert_eq!(f.head(), Some(leaf_hash(b"only")));
    assert_eq!(f.entries().len(), 1);
    assert_eq!(f.entries()[0].subtree_size, 1);
}

#[test]
fn test_merge_order_is_older_left() {
    let mut f = Frontier::new();
    f.add(b"first");
    f.add(b"second");

    let expected = pair_hash(&leaf_hash(b"first"), &leaf_hash(b"second"));
    assert_eq!(f.entries().len(), 1);
    assert_eq!(f.entries()[0].subtree_size, 2);
    assert_eq!(f.entries()[0].value, expected);

    f.add(b"third");
    assert_eq!(f.entries().len(), 2);
    assert_eq!(f.head(), Some(pair_hash(&expected, &leaf_hash(b"third"))));
}

#[test]
fn test_marshal_roundtrip() {
    let mut f = Frontier::new();
    for i in 0u64..13 {
        f.add(&i.to_le_bytes());
    }

    let buf = f.marshal();
    assert_eq!(buf.len(), f.len() * ENTRY_SIZE);

    let restored = Frontier::unmarshal(&buf).unwrap();
    assert_eq!(restored, f);
    assert_eq!(restored.size(), 13);
    assert_eq!(restored.head(), f.head());
}

#[test]
fn test_marshal_layout() {
    let mut f = Frontier::new();
    f.add(b"a");
    f.add(b"b");
    f.add(b"c");

    // Entries (2, H(H(a), H(b))) then (1, H(c)).
    let buf = f.marshal();
    assert_eq!(buf.len(), 2 * ENTRY_SIZE);
    assert_eq!(&buf[..8], &2u64.to_be_bytes());
    assert_eq!(&buf[8..40], &pair_hash(&leaf_hash(b"a"), &leaf_hash(b"b")));
    assert_eq!(&buf[40..48], &1u64.to_be_bytes());
    assert_eq!(&buf[48..], &leaf_hash(b"c"));
}

#[test]
fn test_unmarshal_rejects_partial_entries() {
    for bad_len in [1, 8, 39, 41, 79] {
        let buf = vec![0u8; bad_len];
        assert!(
            matches!(Frontier::unmarshal(&buf), Err(FrontierError::Malformed(n)) if n == bad_len),
            "length {bad_len} should be rejected"
        );
    }
}

#[test]
fn test_from_entries_validates_order() {
    let entry = |size: u64| FrontierEntry {
        subtree_size: size,
        value: leaf_hash(&size.to_be_bytes()),
    };

    assert!(Frontier::from_entries(vec![entry(4), entry(2), entry(1)]).is_ok());
    assert!(matches!(
        Frontier::from_entries(vec![entry(2), entry(4)]),
        Err(FrontierError::OutOfOrder)
    ));
    assert!(matches!(
        Frontier::from_entries(vec![entry(2), entry(2)]),
        Err(FrontierError::OutOfOrder)
    ));
    assert!(matches!(
        Frontier::from_entries(vec![entry(6), entry(1)]),
        Err(FrontierError::NotPowerOfTwo(6))
    ));
}
