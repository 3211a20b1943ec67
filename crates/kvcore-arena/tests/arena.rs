use kvcore_arena::{AllocatorMode, Arena, ArenaError};

#[test]
fn system_mode_tracks_stats() {
    let arena = Arena::new(AllocatorMode::System);
    let ptr = arena.alloc(64).unwrap();
    let stats = arena.stats();
    assert_eq!(stats.total_allocations, 1);
    assert_eq!(stats.current_usage, 64);
    assert_eq!(stats.peak_usage, 64);

    arena.set_bytes(ptr, 0xAB, 64).unwrap();
    arena.free(ptr).unwrap();
    let stats = arena.stats();
    assert_eq!(stats.total_deallocations, 1);
    assert_eq!(stats.current_usage, 0);
    assert_eq!(stats.peak_usage, 64);
}

#[test]
fn realloc_preserves_contents() {
    let arena = Arena::new(AllocatorMode::System);
    let ptr = arena.alloc(8).unwrap();
    arena.set_bytes(ptr, 7, 8).unwrap();
    let grown = arena.realloc(ptr, 32).unwrap();
    // SAFETY: `grown` is a live 32-byte allocation just returned by `realloc`.
    let bytes = unsafe { std::slice::from_raw_parts(grown.as_ptr(), 8) };
    assert_eq!(bytes, &[7_u8; 8]);
    arena.free(grown).unwrap();
}

#[test]
fn free_of_unknown_pointer_is_invalid_argument() {
    let arena = Arena::new(AllocatorMode::System);
    let ptr = arena.alloc(8).unwrap();
    arena.free(ptr).unwrap();
    assert_eq!(arena.free(ptr).unwrap_err(), ArenaError::InvalidArgument);
}

#[test]
fn pool_mode_reuses_freed_blocks() {
    let arena = Arena::new(AllocatorMode::Pool { initial_bytes: 4096 });
    let a = arena.alloc(16).unwrap();
    arena.free(a).unwrap();
    let b = arena.alloc(16).unwrap();
    // The free list should hand back the exact block just freed.
    assert_eq!(a, b);
    arena.free(b).unwrap();
}

#[test]
fn mode_switch_refused_while_allocations_live() {
    let arena = Arena::new(AllocatorMode::System);
    let ptr = arena.alloc(16).unwrap();
    assert_eq!(
        arena.set_mode(AllocatorMode::Pool { initial_bytes: 1024 }).unwrap_err(),
        ArenaError::ArenaBusy,
    );
    arena.free(ptr).unwrap();
    assert!(arena.set_mode(AllocatorMode::Pool { initial_bytes: 1024 }).is_ok());
}

#[test]
fn gc_mode_is_pass_through() {
    let arena = Arena::new(AllocatorMode::Gc);
    let ptr = arena.alloc(128).unwrap();
    assert_eq!(arena.stats().current_usage, 128);
    arena.free(ptr).unwrap();
    assert_eq!(arena.stats().current_usage, 0);
}
