//! Property tests for the bounded-disruption guarantee.

use corelib::HashRing;
use proptest::prelude::*;

fn node_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("10.0.0.{}:9091", i + 1)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Adding one node only moves keys onto that node.
    #[test]
    fn adding_a_node_only_moves_keys_to_it(
        base in 2usize..8,
        keys in prop::collection::vec(any::<u64>(), 500),
    ) {
        let names = node_names(base + 1);
        let before = HashRing::build(&names[..base]);
        let after = HashRing::build(&names);
        let newcomer = &names[base];

        let mut moved = 0usize;
        for key in &keys {
            let key = key.to_string();
            let old = before.lookup(&key).unwrap();
            let new = after.lookup(&key).unwrap();
            if old != new {
                prop_assert_eq!(new.as_str(), newcomer.as_str());
                moved += 1;
            }
        }
        prop_assert!(moved * 2 < keys.len(), "moved {} of {}", moved, keys.len());
    }

    /// Removing one node only moves the keys it owned.
    #[test]
    fn removing_a_node_only_moves_its_keys(
        count in 3usize..8,
        victim in 0usize..3,
        keys in prop::collection::vec("[a-z]{1,12}", 300),
    ) {
        let names = node_names(count);
        let full = HashRing::build(&names);
        let mut reduced = full.clone();
        prop_assert!(reduced.remove_node(&names[victim]));

        for key in &keys {
            let old = full.lookup(key).unwrap();
            let new = reduced.lookup(key).unwrap();
            if old.as_str() != names[victim] {
                prop_assert_eq!(old, new);
            }
        }
    }

    /// A non-empty ring routes every key.
    #[test]
    fn non_empty_ring_covers_every_key(key in any::<Vec<u8>>(), count in 1usize..5) {
        let ring = HashRing::build(node_names(count));
        prop_assert!(ring.lookup(&key).is_some());
    }
}
