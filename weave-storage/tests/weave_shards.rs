//! Driver-backed stores as weave shards.

use std::sync::Arc;
use std::thread;

use weave::{ShardId, Weave};
use weave_core::{ErrorCode, WeaveConfig};
use weave_storage::{DriverStore, MemDriver};

fn durable_weave() -> Weave<DriverStore<MemDriver>> {
    Weave::with_stores(WeaveConfig::default(), |_| {
        DriverStore::new(MemDriver::new()).unwrap()
    })
    .unwrap()
}

#[test]
fn durable_and_memory_weaves_agree() {
    let durable = durable_weave();
    let memory = Weave::new(WeaveConfig::default()).unwrap();

    for i in 0u8..40 {
        let entry = [i % 5, i % 7, i];
        durable.append(&entry).unwrap();
        memory.append(&entry).unwrap();
    }

    assert_eq!(durable.summary().unwrap(), memory.summary().unwrap());
    assert_eq!(durable.approx_len(), memory.approx_len());
}

#[test]
fn concurrent_durable_appends() {
    let weave = Arc::new(durable_weave());

    let handles: Vec<_> = (0u8..8)
        .map(|t| {
            let weave = weave.clone();
            thread::spawn(move || {
                for i in 0u8..50 {
                    weave.append(&[t, i % 4, i]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut expected = [0u64; 8];
    for t in 0usize..8 {
        for i in 0usize..50 {
            expected[t] += 1;
            // Coinciding windows are written once.
            if i % 4 != t {
                expected[i % 4] += 1;
            }
        }
    }
    for (t, want) in expected.iter().enumerate() {
        assert_eq!(weave.shard_len(ShardId::new(t as u32)).unwrap(), *want);
    }
    assert_eq!(weave.approx_len(), expected.iter().sum::<u64>());
}

#[test]
fn short_entries_never_reach_a_driver() {
    let weave = durable_weave();
    let err = weave.append(&[9]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(weave.approx_len(), 0);
}
