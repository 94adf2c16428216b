//! Foundation types for AutoDB.
//!
//! This crate provides the record, identity, and temporal types shared by
//! the store, the service layer, and the command-line host. Every other
//! AutoDB crate depends on `autodb-types`.
//!
//! # Key Types
//!
//! - [`Car`] — The persisted record
//! - [`CarPayload`] — Caller-supplied input for create/update
//! - [`CarId`] — Unique, immutable record key
//! - [`Principal`] — Opaque caller identity used for ownership
//! - [`Timestamp`] — Nanosecond wall-clock instant
//! - [`HistoryEntry`] — Minimal audit view of a record

pub mod car;
pub mod error;
pub mod identity;
pub mod temporal;

pub use car::{Car, CarId, CarPayload, HistoryEntry, Preferences};
pub use error::TypeError;
pub use identity::{IdentityMaterial, Principal};
pub use temporal::Timestamp;
