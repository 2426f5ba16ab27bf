//! xxh3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use xxhash_rust::xxh3::xxh3_64;

/// xxh3-64 partitioner. Faster than Murmur3 on long keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn hash(&self, key: &[u8]) -> u64 {
        xxh3_64(key)
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
