use kvcore_vfs::Filesystem;

use crate::engine::Engine;
use crate::error::EngineResult;

enum TxnOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// A single-key transaction (spec §4.5): buffers `put`/`delete` calls in
/// memory, then applies each one (appending its own WAL record, same as a
/// standalone call) and appends a trailing `Commit` marker on `commit`.
///
/// Multi-key atomicity is explicitly not promised: a crash between two
/// buffered `put`s may persist one and not the other. `rollback` discards
/// the buffer without writing anything to the WAL.
pub struct Txn<'engine, F: Filesystem> {
    engine: &'engine Engine<F>,
    ops: Vec<TxnOp>,
}

impl<'engine, F: Filesystem> Txn<'engine, F> {
    pub(crate) fn new(engine: &'engine Engine<F>) -> Self {
        Self { engine, ops: Vec::new() }
    }

    /// Reads through to the engine directly; a transaction does not buffer
    /// its own reads (read-committed, not snapshot isolation).
    pub fn get(&self, key: &[u8]) -> EngineResult<Option<Box<[u8]>>> {
        self.engine.get(key)
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(TxnOp::Put(key.to_vec(), value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(TxnOp::Delete(key.to_vec()));
    }

    /// Applies every buffered operation in order, then appends a `Commit`
    /// marker record.
    pub fn commit(self) -> EngineResult<()> {
        for op in self.ops {
            match op {
                TxnOp::Put(key, value) => self.engine.put(&key, &value)?,
                TxnOp::Delete(key) => self.engine.delete(&key)?,
            }
        }
        self.engine.commit_marker()
    }

    /// Discards the buffered operations; nothing was ever written.
    pub fn rollback(self) {}
}
