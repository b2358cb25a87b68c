//! Synchronization helpers shared across crates.

pub mod keyed_lock;

pub use keyed_lock::KeyedLock;
