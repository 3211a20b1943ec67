/// Where a replayed `Put`/`Delete` record lands. Kept independent of any
/// particular in-memory store so this crate doesn't need to depend on
/// `kvcore-skiplist`; the engine implements this over its skiplist.
pub trait ReplaySink {
    fn apply_put(&mut self, key: &[u8], value: &[u8]);
    fn apply_delete(&mut self, key: &[u8]);
}
