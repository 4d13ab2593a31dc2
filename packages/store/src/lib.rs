//! # Record store: namespaced key-value persistence
//!
//! Every record the rating service keeps lives behind the [`RecordStore`] trait:
//! a flat keyspace of JSON documents addressed by string keys such as
//! `student:<uuid>` or `user:<email>`. The trait covers get, set, delete and prefix
//! scan, so any key-value backend can sit behind it.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`] | Tests and ephemeral deployments. Ordered map behind a mutex. |
//! | [`FileStore`] | Single-node persistence. One JSON file per key in a directory. |
//!
//! There is no transaction or compare-and-swap support: a read followed by a write
//! of the same key is not atomic with respect to other writers.

pub mod record;

mod file_store;
mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;
pub use record::{Record, RecordStore, StoreError};
