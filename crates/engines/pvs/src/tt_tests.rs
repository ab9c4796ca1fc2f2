use super::*;
use crate::score::{MATE_BOUND, MAX_PLY, mate_in, mated_in};

fn e2e4() -> Move {
    Move::new(12, 28)
}

#[test]
fn test_packing_round_trip_extremes() {
    for score in [0, 1, -1, MATE_BOUND, -MATE_BOUND, score::MATE, -score::MATE, score::INF, -score::INF] {
        for depth in [-1, 0, 1, 63, 126] {
            let p = Packed::new(Some(e2e4()), score, Some(-31_999), depth, Bound::Lower, 3);
            assert_eq!(p.score(), score);
            assert_eq!(p.depth(), depth);
            assert_eq!(p.eval(), Some(-31_999));
            assert_eq!(p.bound(), Bound::Lower);
            assert_eq!(p.generation(), 3);
            assert_eq!(p.mv(), Some(e2e4()));
        }
    }
    let p = Packed::new(None, -5, None, 4, Bound::Upper, 0);
    assert_eq!(p.mv(), None);
    assert_eq!(p.eval(), None);
}

#[test]
fn test_store_probe_round_trip_across_plies() {
    let tt = TranspositionTable::new(1).unwrap();
    for ply in 0..MAX_PLY {
        let key = 0x9e37_79b9_7f4a_7c15u64.wrapping_mul(ply as u64 + 1);
        for (score, bound) in [
            (mate_in(ply + 3), Bound::Exact),
            (mated_in(ply + 4), Bound::Lower),
            (-MATE_BOUND + 1, Bound::Upper),
            (137, Bound::Exact),
        ] {
            tt.store(key, Some(e2e4()), score, Some(20), 9, bound, ply);
            let hit = tt.probe(key, ply).expect("entry just stored");
            assert_eq!(hit.score, score, "ply {ply}");
            assert_eq!(hit.bound, bound);
            assert_eq!(hit.mv, Some(e2e4()));
            assert_eq!(hit.depth, 9);
            assert!(hit.is_usable(9, score - 1, score + 1) || bound != Bound::Exact);
        }
    }
}

#[test]
fn test_mate_score_transposes_to_other_ply() {
    let tt = TranspositionTable::new(1).unwrap();
    // Mate in 5 plies from a node at ply 4 = mate 9 plies from the root.
    tt.store(42, None, mate_in(9), None, 6, Bound::Exact, 4);
    // Reached again at ply 2: still 5 plies to mate, so 7 from the root.
    assert_eq!(tt.probe(42, 2).map(|h| h.score), Some(mate_in(7)));
}

#[test]
fn test_usability() {
    let hit = TtHit {
        mv: None,
        score: 50,
        eval: None,
        depth: 5,
        bound: Bound::Upper,
    };
    assert!(hit.is_usable(5, 60, 100));
    assert!(!hit.is_usable(5, 40, 100));
    assert!(!hit.is_usable(6, 60, 100));

    let lower = TtHit {
        bound: Bound::Lower,
        ..hit
    };
    assert!(lower.is_usable(3, -100, 50));
    assert!(!lower.is_usable(3, -100, 51));
}

#[test]
fn test_same_key_keeps_deeper_result() {
    let tt = TranspositionTable::new(1).unwrap();
    tt.store(7, Some(e2e4()), 30, None, 8, Bound::Lower, 0);
    tt.store(7, None, -10, None, 3, Bound::Upper, 0);
    let hit = tt.probe(7, 0).unwrap();
    assert_eq!((hit.depth, hit.score, hit.bound), (8, 30, Bound::Lower));

    // Exact results always overwrite, and inherit the old move.
    tt.store(7, None, 12, None, 2, Bound::Exact, 0);
    let hit = tt.probe(7, 0).unwrap();
    assert_eq!((hit.depth, hit.score, hit.bound), (2, 12, Bound::Exact));
    assert_eq!(hit.mv, Some(e2e4()));
}

#[test]
fn test_shallow_result_fills_missing_move() {
    let tt = TranspositionTable::new(1).unwrap();
    tt.store(9, None, 0, None, 10, Bound::Upper, 0);
    let d2d4 = Move::new(11, 27);
    tt.store(9, Some(d2d4), 40, None, 2, Bound::Lower, 0);
    let hit = tt.probe(9, 0).unwrap();
    assert_eq!(hit.depth, 10);
    assert_eq!(hit.mv, Some(d2d4));
}

#[test]
fn test_bucket_replaces_shallowest() {
    let tt = TranspositionTable::new(1).unwrap();
    let buckets = tt.buckets.len() as u64;
    // Keys below 2^32 fold to themselves, so these share one bucket.
    let keys: Vec<u64> = (0..5).map(|i| 3 + i * buckets).collect();
    for (i, &key) in keys[..4].iter().enumerate() {
        tt.store(key, None, 0, None, 10 + i as i32, Bound::Exact, 0);
    }
    tt.store(keys[4], None, 0, None, 1, Bound::Exact, 0);

    assert!(tt.probe(keys[0], 0).is_none(), "depth 10 entry was shallowest");
    for &key in &keys[1..] {
        assert!(tt.probe(key, 0).is_some());
    }
}

#[test]
fn test_old_generation_is_replaced_first() {
    let mut tt = TranspositionTable::new(1).unwrap();
    let buckets = tt.buckets.len() as u64;
    let keys: Vec<u64> = (0..5).map(|i| 11 + i * buckets).collect();
    tt.store(keys[0], None, 0, None, 20, Bound::Exact, 0);
    tt.new_search();
    tt.new_search();
    for &key in &keys[1..4] {
        tt.store(key, None, 0, None, 5, Bound::Exact, 0);
    }
    tt.store(keys[4], None, 0, None, 4, Bound::Exact, 0);
    assert!(tt.probe(keys[0], 0).is_none(), "two generations old counts as depth 4");
}

#[test]
fn test_torn_entry_reads_as_miss() {
    let tt = TranspositionTable::new(1).unwrap();
    tt.store(77, Some(e2e4()), 10, None, 4, Bound::Exact, 0);
    let slot = &tt.bucket(77).slots[0];
    // Simulate a racing writer replacing only the data word.
    let other = Packed::new(None, -300, None, 1, Bound::Upper, 0);
    slot.data.store(other.0, Ordering::Relaxed);
    assert!(tt.probe(77, 0).is_none());
}

#[test]
fn test_new_rejects_out_of_range_sizes() {
    assert!(matches!(TranspositionTable::new(0), Err(ConfigError::OutOfRange { .. })));
    assert!(TranspositionTable::new(HASH_MAX_MB + 1).is_err());
    assert_eq!(TranspositionTable::default().size_mb(), HASH_DEFAULT_MB);
}

#[test]
fn test_resize_validates_and_clear_empties() {
    let mut tt = TranspositionTable::new(1).unwrap();
    assert!(tt.resize(0).is_err());
    assert!(tt.resize(HASH_MAX_MB + 1).is_err());
    tt.resize(2).unwrap();
    assert_eq!(tt.size_mb(), 2);

    tt.store(5, None, 1, None, 1, Bound::Exact, 0);
    assert!(tt.probe(5, 0).is_some());
    tt.clear();
    assert!(tt.probe(5, 0).is_none());
    assert_eq!(tt.hashfull(), 0);
}

#[test]
fn test_concurrent_writers_never_corrupt() {
    let tt = TranspositionTable::new(1).unwrap();
    std::thread::scope(|s| {
        for t in 0..4u64 {
            let tt = &tt;
            s.spawn(move || {
                for i in 0..20_000u64 {
                    let key = (i % 64) + 1;
                    tt.store(key, None, (key * 10 + t) as i32, None, (t + 1) as i32, Bound::Exact, 0);
                }
            });
        }
    });
    for key in 1..=64u64 {
        if let Some(hit) = tt.probe(key, 0) {
            assert_eq!(hit.score as u64 / 10, key, "score belongs to another key");
        }
    }
}
