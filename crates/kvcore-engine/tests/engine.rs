use kvcore_engine::{AllocatorModeConfig, Dispatcher, Engine, EngineConfig, EngineError, Request, Status};
use kvcore_vfs::MemoryFilesystem;

fn config(data_dir: &str) -> EngineConfig {
    EngineConfig { data_dir: data_dir.into(), ..EngineConfig::default() }
}

#[test]
fn put_then_get_round_trips_the_value() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.put(b"alpha", b"1").unwrap();
    engine.put(b"beta", b"2").unwrap();

    assert_eq!(engine.get(b"alpha").unwrap().as_deref(), Some(b"1".as_slice()));
    assert_eq!(engine.get(b"beta").unwrap().as_deref(), Some(b"2".as_slice()));
    assert_eq!(engine.get(b"gamma").unwrap(), None);
}

#[test]
fn put_overwrites_an_existing_key_and_delete_removes_it() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.put(b"k", b"1").unwrap();
    engine.put(b"k", b"2").unwrap();
    assert_eq!(engine.get(b"k").unwrap().as_deref(), Some(b"2".as_slice()));

    engine.delete(b"k").unwrap();
    assert_eq!(engine.get(b"k").unwrap(), None);
}

#[test]
fn deleting_an_absent_key_twice_is_not_an_error() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.delete(b"never-existed").unwrap();
    engine.delete(b"never-existed").unwrap();
}

#[test]
fn put_get_delete_get_round_trip() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.put(b"k", b"v").unwrap();
    assert_eq!(engine.get(b"k").unwrap().as_deref(), Some(b"v".as_slice()));
    engine.delete(b"k").unwrap();
    assert_eq!(engine.get(b"k").unwrap(), None);
}

#[test]
fn empty_keys_are_rejected_on_every_operation() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    assert!(matches!(engine.get(b""), Err(EngineError::InvalidArgument)));
    assert!(matches!(engine.put(b"", b"v"), Err(EngineError::InvalidArgument)));
    assert!(matches!(engine.delete(b""), Err(EngineError::InvalidArgument)));
}

#[test]
fn state_survives_a_crash_and_reopen_via_wal_replay() {
    let fs = MemoryFilesystem::new();
    {
        let engine = Engine::open(fs.clone(), config("/data")).unwrap();
        engine.put(b"a", b"1").unwrap();
        engine.put(b"b", b"2").unwrap();
        engine.delete(b"a").unwrap();
        engine.put(b"a", b"3").unwrap();
        // Dropped without calling close(), simulating a crash.
    }

    let engine = Engine::open(fs, config("/data")).unwrap();
    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(b"3".as_slice()));
    assert_eq!(engine.get(b"b").unwrap().as_deref(), Some(b"2".as_slice()));
}

#[test]
fn reopening_after_a_clean_close_yields_the_same_state() {
    let fs = MemoryFilesystem::new();
    {
        let engine = Engine::open(fs.clone(), config("/data")).unwrap();
        engine.put(b"a", b"1").unwrap();
        engine.put(b"b", b"2").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(fs, config("/data")).unwrap();
    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(b"1".as_slice()));
    assert_eq!(engine.get(b"b").unwrap().as_deref(), Some(b"2".as_slice()));
}

#[test]
fn close_is_idempotent() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    engine.put(b"a", b"1").unwrap();
    engine.close().unwrap();
    engine.close().unwrap();
}

#[test]
fn close_does_not_discard_rotated_wal_segments_and_all_keys_survive_reopen() {
    // Regression test: `close()` must never purge WAL segments, since this
    // engine's skiplist is purely in-memory and the WAL is the only
    // durable copy of its contents. With a small segment threshold the
    // writes below force several rotations; every key must still be
    // readable after a close-then-reopen, including ones recorded in
    // segments well before the active one at close time.
    let fs = MemoryFilesystem::new();
    let cfg = EngineConfig { segment_bytes: 64, ..config("/data") };
    {
        let engine = Engine::open(fs.clone(), cfg.clone()).unwrap();
        for i in 0..50_u32 {
            engine.put(format!("key-{i}").as_bytes(), format!("value-{i}").as_bytes()).unwrap();
        }
        engine.close().unwrap();
    }

    let engine = Engine::open(fs, cfg).unwrap();
    for i in 0..50_u32 {
        assert_eq!(
            engine.get(format!("key-{i}").as_bytes()).unwrap().as_deref(),
            Some(format!("value-{i}").as_bytes())
        );
    }
}

#[test]
fn operations_after_close_are_rejected() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    engine.close().unwrap();

    assert!(matches!(engine.get(b"a"), Err(EngineError::Closed)));
    assert!(matches!(engine.put(b"a", b"1"), Err(EngineError::Closed)));
    assert!(matches!(engine.delete(b"a"), Err(EngineError::Closed)));
}

#[test]
fn a_transaction_buffers_writes_until_commit() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    let mut txn = engine.begin();
    txn.put(b"a", b"1");
    txn.put(b"b", b"2");
    txn.delete(b"a");
    // Buffered ops are not yet visible; a transaction doesn't pre-apply.
    txn.commit().unwrap();

    assert_eq!(engine.get(b"a").unwrap(), None);
    assert_eq!(engine.get(b"b").unwrap().as_deref(), Some(b"2".as_slice()));
}

#[test]
fn rolling_back_a_transaction_discards_its_buffered_writes() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.put(b"a", b"1").unwrap();
    let mut txn = engine.begin();
    txn.put(b"a", b"2");
    txn.rollback();

    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(b"1".as_slice()));
}

#[test]
fn stats_reflect_operation_counters_and_key_count() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();

    engine.put(b"a", b"1").unwrap();
    engine.put(b"b", b"2").unwrap();
    engine.get(b"a").unwrap();
    engine.get(b"missing").unwrap();
    engine.delete(b"b").unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.key_count, 1);
    assert_eq!(stats.puts, 2);
    assert_eq!(stats.gets, 2);
    assert_eq!(stats.deletes, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!(!stats.degraded);
}

#[test]
fn allocator_mode_pool_can_be_selected_from_config() {
    let fs = MemoryFilesystem::new();
    let cfg =
        EngineConfig { allocator_mode: AllocatorModeConfig::Pool, pool_initial_bytes: 4096, ..config("/data") };
    let engine = Engine::open(fs, cfg).unwrap();

    engine.put(b"a", b"1").unwrap();
    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(b"1".as_slice()));
}

#[test]
fn concurrent_puts_and_deletes_on_the_same_key_never_corrupt_state() {
    use std::sync::Arc;
    use std::thread;

    let fs = MemoryFilesystem::new();
    let engine = Arc::new(Engine::open(fs, config("/data")).unwrap());

    let mut handles = Vec::new();
    for i in 0..8_u32 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                engine.put(b"shared", format!("{i}").as_bytes()).unwrap();
                let _ = engine.get(b"shared").unwrap();
                let _ = engine.delete(b"shared");
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // No assertion on the final value (whichever thread wrote last wins);
    // the point is that every call above returned Ok/a well-formed Result
    // rather than panicking or deadlocking.
}

#[test]
fn dispatcher_round_trips_every_request_kind_over_a_byte_stream() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    let dispatcher = Dispatcher::new(&engine);

    let (status, payload) = dispatcher.dispatch(Request::Put { key: b"a".to_vec(), value: b"1".to_vec() });
    assert_eq!(status, Status::Ok);
    assert!(payload.is_empty());

    let (status, payload) = dispatcher.dispatch(Request::Get { key: b"a".to_vec() });
    assert_eq!(status, Status::Ok);
    assert_eq!(payload, [1, 0, 0, 0, b'1']);

    let (status, _) = dispatcher.dispatch(Request::Get { key: b"missing".to_vec() });
    assert_eq!(status, Status::NotFound);

    let (status, _) = dispatcher.dispatch(Request::Delete { key: b"a".to_vec() });
    assert_eq!(status, Status::Ok);

    let (status, payload) = dispatcher.dispatch(Request::Stats);
    assert_eq!(status, Status::Ok);
    assert!(String::from_utf8(payload).unwrap().contains("key_count=0"));
}

#[test]
fn dispatcher_reports_a_client_error_for_an_empty_key() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    let dispatcher = Dispatcher::new(&engine);

    let (status, _) = dispatcher.dispatch(Request::Get { key: Vec::new() });
    assert_eq!(status, Status::ClientError);
}

#[test]
fn handle_one_reads_a_framed_request_and_writes_a_framed_response() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    let dispatcher = Dispatcher::new(&engine);

    // [len][op=2 Put][key_len][key][val_len][val]
    let mut request = Vec::new();
    let mut body = vec![2_u8];
    body.extend_from_slice(&4_u32.to_le_bytes());
    body.extend_from_slice(b"name");
    body.extend_from_slice(&5_u32.to_le_bytes());
    body.extend_from_slice(b"value");
    #[expect(clippy::cast_possible_truncation, reason = "test fixture, body is tiny")]
    request.extend_from_slice(&(body.len() as u32).to_le_bytes());
    request.extend_from_slice(&body);

    let mut reader = std::io::Cursor::new(request);
    let mut writer = Vec::new();
    let more = dispatcher.handle_one(&mut reader, &mut writer).unwrap();
    assert!(more);
    assert_eq!(writer, [1, 0, 0, 0, 0]); // len=1, status=Ok, empty payload

    assert_eq!(engine.get(b"name").unwrap().as_deref(), Some(b"value".as_slice()));
}

#[test]
fn handle_one_returns_false_on_a_clean_empty_stream() {
    let fs = MemoryFilesystem::new();
    let engine = Engine::open(fs, config("/data")).unwrap();
    let dispatcher = Dispatcher::new(&engine);

    let mut reader = std::io::Cursor::new(Vec::<u8>::new());
    let mut writer = Vec::new();
    assert!(!dispatcher.handle_one(&mut reader, &mut writer).unwrap());
}

#[test]
fn std_filesystem_engine_survives_reopen_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let fs = kvcore_vfs::StdFilesystem;
    let cfg = EngineConfig { data_dir: dir.path().to_path_buf(), ..EngineConfig::default() };

    {
        let engine = Engine::open(fs, cfg.clone()).unwrap();
        engine.put(b"a", b"1").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(fs, cfg).unwrap();
    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(b"1".as_slice()));
}
