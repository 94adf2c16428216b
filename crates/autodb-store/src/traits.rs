use autodb_types::{Car, CarId};

use crate::error::StoreResult;

/// Ordered key-value container for car records.
///
/// All implementations must satisfy these invariants:
/// - At most one record per key.
/// - `insert` is an upsert: it creates or replaces.
/// - `values` returns a snapshot in ascending key order; calling it again
///   restarts from the beginning.
/// - Lookups have no side effects.
pub trait CarStore: Send + Sync {
    /// Look up a record by id.
    ///
    /// Returns `Ok(None)` if no record has this id.
    fn get(&self, id: &CarId) -> StoreResult<Option<Car>>;

    /// Insert or replace the record stored under `id`.
    ///
    /// Returns the replaced record, if any.
    fn insert(&self, id: &CarId, car: &Car) -> StoreResult<Option<Car>>;

    /// Remove the record stored under `id`.
    ///
    /// Returns the removed record, or `Ok(None)` if it did not exist.
    fn remove(&self, id: &CarId) -> StoreResult<Option<Car>>;

    /// Snapshot of every record in key order.
    fn values(&self) -> StoreResult<Vec<Car>>;

    /// Check whether a record exists under `id`.
    fn contains(&self, id: &CarId) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Number of records currently stored.
    fn len(&self) -> StoreResult<usize> {
        Ok(self.values()?.len())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
