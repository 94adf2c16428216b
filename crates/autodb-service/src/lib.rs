//! Operation layer for AutoDB.
//!
//! [`CarService`] is the single entry point for every externally triggered
//! operation. It validates input, derives ids and timestamps, enforces
//! ownership, and delegates all persistence to an injected
//! [`CarStore`](autodb_store::CarStore).
//!
//! External collaborators are traits so hosts and tests can swap them:
//!
//! - [`Clock`] — source of `createdAt`/`updatedAt` ([`SystemClock`], [`ManualClock`])
//! - [`IdGenerator`] — fresh record ids ([`UuidGenerator`], [`SequentialIdGenerator`])
//!
//! Queries other than by id are full scans expressed as [`CarFilter`]
//! predicates.

pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod ids;
pub mod service;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, OwnershipPolicy, ServiceConfig};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use filter::CarFilter;
pub use ids::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use service::CarService;

// Re-export key types
pub use autodb_store::{CarStore, InMemoryCarStore, JsonFileCarStore, StoreError};
pub use autodb_types::{Car, CarId, CarPayload, HistoryEntry, Preferences, Principal, Timestamp};
