//! Ordered key-value storage for AutoDB car records.
//!
//! The store is the authoritative mapping `CarId -> Car`. It knows nothing
//! about validation, ownership or timestamps; those live in the service
//! layer. There are no secondary indexes: every lookup other than by id is
//! a full scan over [`CarStore::values`].
//!
//! # Storage Backends
//!
//! All backends implement the [`CarStore`] trait:
//!
//! - [`InMemoryCarStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`JsonFileCarStore`] -- the same map, snapshotted to a JSON file after
//!   every mutation so it survives process restarts
//!
//! # Design Rules
//!
//! 1. Keys are unique; `insert` on an existing key replaces the record.
//! 2. `values()` always yields records in ascending key order.
//! 3. Absence is `Ok(None)`, never an error.
//! 4. Errors are reserved for infrastructure failures (I/O, poisoned locks).

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileCarStore;
pub use memory::InMemoryCarStore;
pub use traits::CarStore;
