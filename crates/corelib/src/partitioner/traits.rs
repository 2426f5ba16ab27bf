//! Core partitioner trait definitions.

/// A partitioner converts bytes into positions on the 64-bit hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// hashing without synchronization overhead.
///
/// Implementations must be deterministic: the same input hashes to the same
/// position on every call, in every process. Virtual-node placement relies on
/// this so that independently built rings agree with each other.
pub trait Partitioner: Send + Sync + 'static {
    /// Hash `key` to a ring position.
    fn hash(&self, key: &[u8]) -> u64;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}

/// Adapter turning a plain function into a partitioner.
///
/// ```rust
/// use corelib::partitioner::{HashFn, Partitioner};
///
/// fn first_byte(key: &[u8]) -> u64 {
///     key.first().copied().unwrap_or_default() as u64
/// }
///
/// let p = HashFn(first_byte);
/// assert_eq!(p.hash(b"a"), 97);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HashFn(pub fn(&[u8]) -> u64);

impl Partitioner for HashFn {
    fn hash(&self, key: &[u8]) -> u64 {
        (self.0)(key)
    }

    fn name(&self) -> &'static str {
        "HashFn"
    }
}
