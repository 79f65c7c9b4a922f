//! Property-based tests for shard routing and weave appends.

use proptest::prelude::*;
use weave_core::WeaveConfig;

use crate::{shard_keys, ShardId, Weave};

fn arb_config() -> impl Strategy<Value = WeaveConfig> {
    (1usize..=2, 1usize..=4).prop_map(|(prefix, cross)| WeaveConfig::new(prefix, cross))
}

fn arb_entry() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 2..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Keys are sorted, unique, in range and no more than the window count
    #[test]
    fn prop_shard_keys_well_formed(
        config in arb_config(),
        entry in prop::collection::vec(any::<u8>(), 0..16)
    ) {
        match shard_keys(&config, &entry) {
            Ok(keys) => {
                prop_assert!(entry.len() >= config.min_entry_len());
                prop_assert!(!keys.is_empty());
                prop_assert!(keys.len() <= config.num_cross_trees);
                for window in keys.windows(2) {
                    prop_assert!(window[0] < window[1]);
                }
                for key in &keys {
                    prop_assert!(key.index() < config.num_trees().unwrap());
                }
            }
            Err(_) => prop_assert!(entry.len() < config.min_entry_len()),
        }
    }

    /// Every window's prefix appears among the keys
    #[test]
    fn prop_shard_keys_cover_windows(config in arb_config(), entry in arb_entry()) {
        prop_assume!(entry.len() >= config.min_entry_len());
        let keys = shard_keys(&config, &entry).expect("long enough");

        for window in entry[..config.min_entry_len()].chunks(config.prefix_bytes) {
            prop_assert!(keys.contains(&ShardId::from_prefix(window)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Each append grows exactly its derived shards by one
    #[test]
    fn prop_append_grows_derived_shards(entries in prop::collection::vec(arb_entry(), 1..20)) {
        let weave = Weave::new(WeaveConfig::default()).expect("valid config");
        let mut expected = vec![0u64; weave.num_shards()];

        for entry in &entries {
            let receipt = weave.append(entry).expect("append should succeed");
            for &(id, pos) in receipt.shards() {
                prop_assert_eq!(pos, expected[id.index()]);
                expected[id.index()] += 1;
            }
            prop_assert_eq!(
                receipt.shards().iter().map(|(id, _)| *id).collect::<Vec<_>>(),
                weave.shard_keys(entry).expect("long enough")
            );
        }

        let summary = weave.summary().expect("summary should succeed");
        for (idx, len) in expected.iter().enumerate() {
            prop_assert_eq!(summary.as_slice()[idx].len, *len);
        }
        prop_assert_eq!(weave.approx_len(), expected.iter().sum::<u64>());
    }
}
