use std::sync::Arc;
use std::thread;

use kvcore_skiplist::{Skiplist, SkiplistError};

#[test]
fn empty_skiplist_reports_not_found() {
    let list = Skiplist::new();
    assert_eq!(list.get(b"missing").unwrap_err(), SkiplistError::NotFound);
    assert!(list.is_empty());
}

#[test]
fn insert_then_get_round_trips() {
    let list = Skiplist::new();
    list.insert(b"k1", b"v1").unwrap();
    list.insert(b"k2", b"v2").unwrap();
    assert_eq!(&*list.get(b"k1").unwrap(), b"v1");
    assert_eq!(&*list.get(b"k2").unwrap(), b"v2");
    assert_eq!(list.len(), 2);
}

#[test]
fn duplicate_insert_is_rejected_and_value_unchanged() {
    let list = Skiplist::new();
    list.insert(b"k", b"first").unwrap();
    assert_eq!(list.insert(b"k", b"second").unwrap_err(), SkiplistError::AlreadyExists);
    assert_eq!(&*list.get(b"k").unwrap(), b"first");
}

#[test]
fn empty_key_is_rejected() {
    let list = Skiplist::new();
    assert_eq!(list.insert(b"", b"v").unwrap_err(), SkiplistError::InvalidArgument);
}

#[test]
fn remove_then_get_reports_not_found() {
    let list = Skiplist::new();
    list.insert(b"k", b"v").unwrap();
    list.remove(b"k").unwrap();
    assert_eq!(list.get(b"k").unwrap_err(), SkiplistError::NotFound);
    assert_eq!(list.len(), 0);
}

#[test]
fn remove_of_absent_key_is_not_found() {
    let list = Skiplist::new();
    assert_eq!(list.remove(b"nope").unwrap_err(), SkiplistError::NotFound);
}

#[test]
fn remove_twice_is_not_found_the_second_time() {
    let list = Skiplist::new();
    list.insert(b"k", b"v").unwrap();
    list.remove(b"k").unwrap();
    assert_eq!(list.remove(b"k").unwrap_err(), SkiplistError::NotFound);
}

#[test]
fn reinsert_after_remove_creates_a_fresh_node() {
    let list = Skiplist::new();
    list.insert(b"k", b"old").unwrap();
    list.remove(b"k").unwrap();
    list.insert(b"k", b"new").unwrap();
    assert_eq!(&*list.get(b"k").unwrap(), b"new");
    assert_eq!(list.len(), 1);
}

#[test]
fn traversal_is_ordered_by_key() {
    let list = Skiplist::new();
    for k in [b"delta", b"alpha", b"charlie", b"bravo"] {
        list.insert(k, b"x").unwrap();
    }
    // Every inserted key is independently retrievable, and none collide.
    for k in [b"alpha", b"bravo", b"charlie", b"delta"] {
        assert!(list.contains(k));
    }
    assert_eq!(list.len(), 4);
}

#[test]
fn key_comparison_is_length_then_bytewise() {
    let list = Skiplist::new();
    list.insert(b"ab", b"short").unwrap();
    list.insert(b"abc", b"long").unwrap();
    assert_eq!(&*list.get(b"ab").unwrap(), b"short");
    assert_eq!(&*list.get(b"abc").unwrap(), b"long");
}

#[test]
fn deterministic_levels_under_a_seeded_rng() {
    let a = Skiplist::with_comparator_seeded(kvcore_skiplist::DefaultComparator, 12, 7);
    let b = Skiplist::with_comparator_seeded(kvcore_skiplist::DefaultComparator, 12, 7);
    for i in 0..200u32 {
        let key = i.to_be_bytes();
        a.insert(&key, b"v").unwrap();
        b.insert(&key, b"v").unwrap();
    }
    for i in 0..200u32 {
        let key = i.to_be_bytes();
        assert_eq!(a.get(&key).unwrap(), b.get(&key).unwrap());
    }
}

#[test]
fn max_level_exhaustion_saturates_rather_than_panics() {
    let list = Skiplist::with_comparator_seeded(kvcore_skiplist::DefaultComparator, 1, 0);
    for i in 0..64u32 {
        list.insert(&i.to_be_bytes(), b"v").unwrap();
    }
    assert_eq!(list.len(), 64);
}

#[test]
fn concurrent_put_and_delete_on_the_same_key_converge() {
    let list = Arc::new(Skiplist::new());
    list.insert(b"x", b"a").unwrap();

    let putter = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for _ in 0..200 {
                match list.remove(b"x") {
                    Ok(()) | Err(SkiplistError::NotFound) | Err(SkiplistError::Busy) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
                match list.insert(b"x", b"a") {
                    Ok(()) | Err(SkiplistError::AlreadyExists) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
        })
    };
    let deleter = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for _ in 0..200 {
                match list.remove(b"x") {
                    Ok(()) | Err(SkiplistError::NotFound) | Err(SkiplistError::Busy) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
        })
    };
    putter.join().unwrap();
    deleter.join().unwrap();

    // Whatever the final state, it must be internally consistent: either
    // present with the expected value, or cleanly absent.
    match list.get(b"x") {
        Ok(value) => assert_eq!(&*value, b"a"),
        Err(SkiplistError::NotFound) => {}
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn concurrent_inserts_of_disjoint_keys_all_land() {
    let list = Arc::new(Skiplist::new());
    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..100u32 {
                    let key = (t * 1000 + i).to_be_bytes();
                    list.insert(&key, b"v").unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(list.len(), 800);
    for t in 0..8u32 {
        for i in 0..100u32 {
            let key = (t * 1000 + i).to_be_bytes();
            assert!(list.contains(&key));
        }
    }
}

#[test]
fn entries_are_returned_in_ascending_key_order_and_omit_tombstones() {
    let list = Skiplist::new();
    for key in [b"d".as_slice(), b"b", b"a", b"c", b"e"] {
        list.insert(key, b"v").unwrap();
    }
    list.remove(b"c").unwrap();

    let entries = list.entries().unwrap();
    let keys: Vec<&[u8]> = entries.iter().map(|(k, _)| k.as_ref()).collect();
    assert_eq!(keys, vec![b"a".as_slice(), b"b", b"d", b"e"]);
}

#[test]
fn concurrent_duplicate_inserts_resolve_to_exactly_one_winner() {
    let list = Arc::new(Skiplist::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || list.insert(b"contested", b"v"))
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    let losses = outcomes
        .iter()
        .filter(|r| matches!(r, Err(SkiplistError::AlreadyExists)))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(losses, 7);
    assert_eq!(list.len(), 1);
}

#[test]
fn a_live_key_past_a_churning_tombstone_is_never_spuriously_missed() {
    // Regression test: `find`/`advance_predecessor` must traverse through
    // Deleted nodes instead of stopping at them. "m" sits lexicographically
    // before "z" and is put/deleted in a tight loop on another thread while
    // this thread repeatedly looks up "z", which is inserted once and never
    // removed. If a reader's level-0 scan stopped at a Deleted "m" still
    // linked on the path (the window between `remove`'s CAS and its splice),
    // `get("z")` would wrongly report `NotFound` even though "z" is live.
    let list = Arc::new(Skiplist::new());
    list.insert(b"z", b"present").unwrap();

    let churner = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for _ in 0..5000 {
                let _ = list.insert(b"m", b"x");
                let _ = list.remove(b"m");
            }
        })
    };

    for _ in 0..5000 {
        assert_eq!(&*list.get(b"z").unwrap(), b"present");
    }
    churner.join().unwrap();
}

#[test]
fn ordered_traversal_survives_concurrent_insert_and_delete_churn() {
    // Spec §8 Scenario F: one thread inserts k0001..k0500 while another
    // deletes k0001..k0250. Afterward, level 0 must yield a strictly
    // ascending sequence of Active keys, all within k0251..k0500.
    let list = Arc::new(Skiplist::new());
    let key_for = |i: u32| format!("k{i:04}").into_bytes();

    let inserter = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for i in 1..=500_u32 {
                list.insert(&key_for(i), b"v").unwrap();
            }
        })
    };
    let deleter = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for i in 1..=250_u32 {
                loop {
                    match list.remove(&key_for(i)) {
                        Ok(()) => break,
                        Err(SkiplistError::NotFound) => {
                            // Not inserted yet; keep trying until it lands.
                            std::thread::yield_now();
                        }
                        Err(SkiplistError::Busy) => std::thread::yield_now(),
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                }
            }
        })
    };
    inserter.join().unwrap();
    deleter.join().unwrap();

    let entries = list.entries().unwrap();
    let keys: Vec<Vec<u8>> = entries.into_iter().map(|(k, _)| k.to_vec()).collect();

    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "level-0 traversal must be strictly ascending");

    for key in &keys {
        let i: u32 = std::str::from_utf8(&key[1..]).unwrap().parse().unwrap();
        assert!((251..=500).contains(&i), "surviving key k{i:04} outside k0251..k0500");
    }
}
