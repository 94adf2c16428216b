use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use autodb_types::{Car, CarId};

use crate::error::{StoreError, StoreResult};
use crate::traits::CarStore;

/// In-memory, `BTreeMap`-based car store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock`;
/// reads share the lock, mutations take it exclusively. Records are cloned
/// on the way in and out. Data is lost when the store is dropped.
pub struct InMemoryCarStore {
    cars: RwLock<BTreeMap<CarId, Car>>,
}

impl InMemoryCarStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::from_map(BTreeMap::new())
    }

    /// Seed a store from an existing map (used by the file backend on load).
    pub fn from_map(cars: BTreeMap<CarId, Car>) -> Self {
        Self {
            cars: RwLock::new(cars),
        }
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<CarId, Car>>> {
        self.cars
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    pub(crate) fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<CarId, Car>>> {
        self.cars
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryCarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CarStore for InMemoryCarStore {
    fn get(&self, id: &CarId) -> StoreResult<Option<Car>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn insert(&self, id: &CarId, car: &Car) -> StoreResult<Option<Car>> {
        Ok(self.write()?.insert(id.clone(), car.clone()))
    }

    fn remove(&self, id: &CarId) -> StoreResult<Option<Car>> {
        Ok(self.write()?.remove(id))
    }

    fn values(&self) -> StoreResult<Vec<Car>> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn contains(&self, id: &CarId) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(id))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }
}

impl std::fmt::Debug for InMemoryCarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.cars.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("InMemoryCarStore")
            .field("car_count", &count)
            .finish()
    }
}
