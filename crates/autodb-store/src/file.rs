//! JSON snapshot-backed car store.
//!
//! [`JsonFileCarStore`] keeps the whole map in memory and rewrites a single
//! JSON file after every successful mutation. The file is replaced
//! atomically (temp file in the same directory, then rename), so a crash
//! leaves either the old or the new snapshot on disk, never a torn one.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use autodb_types::{Car, CarId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryCarStore;
use crate::traits::CarStore;

/// Car store persisted as a JSON array of records in key order.
#[derive(Debug)]
pub struct JsonFileCarStore {
    path: PathBuf,
    inner: InMemoryCarStore,
}

impl JsonFileCarStore {
    /// Open the store at `path`, loading any existing snapshot.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first mutation.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let cars = if path.exists() {
            load_snapshot(&path)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), records = cars.len(), "opened json car store");
        Ok(Self {
            path,
            inner: InMemoryCarStore::from_map(cars),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` under the write lock and persist the result.
    ///
    /// If persisting fails the in-memory map is rolled back, so memory and
    /// disk never disagree about a mutation that reported an error.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<CarId, Car>) -> T,
    ) -> StoreResult<T> {
        let mut map = self.inner.write()?;
        let before = map.clone();
        let out = f(&mut *map);
        if let Err(e) = write_snapshot(&self.path, &*map) {
            *map = before;
            return Err(e);
        }
        Ok(out)
    }
}

impl CarStore for JsonFileCarStore {
    fn get(&self, id: &CarId) -> StoreResult<Option<Car>> {
        self.inner.get(id)
    }

    fn insert(&self, id: &CarId, car: &Car) -> StoreResult<Option<Car>> {
        self.mutate(|map| map.insert(id.clone(), car.clone()))
    }

    fn remove(&self, id: &CarId) -> StoreResult<Option<Car>> {
        // Absent keys need no rewrite.
        if !self.inner.contains(id)? {
            return Ok(None);
        }
        self.mutate(|map| map.remove(id))
    }

    fn values(&self) -> StoreResult<Vec<Car>> {
        self.inner.values()
    }

    fn contains(&self, id: &CarId) -> StoreResult<bool> {
        self.inner.contains(id)
    }

    fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }
}

fn load_snapshot(path: &Path) -> StoreResult<BTreeMap<CarId, Car>> {
    let bytes = fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let cars: Vec<Car> = serde_json::from_slice(&bytes)?;
    let mut map = BTreeMap::new();
    for car in cars {
        let id = car.id.clone();
        if map.insert(id.clone(), car).is_some() {
            return Err(StoreError::CorruptFile {
                path: path.to_path_buf(),
                reason: format!("duplicate id {id}"),
            });
        }
    }
    Ok(map)
}

fn write_snapshot(path: &Path, cars: &BTreeMap<CarId, Car>) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let records: Vec<&Car> = cars.values().collect();
    let data = serde_json::to_vec_pretty(&records)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(&data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    debug!(path = %path.display(), records = cars.len(), "wrote car store snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autodb_types::{CarPayload, Principal, Timestamp};

    fn make_car(id: &str, price: u64) -> Car {
        Car::new(
            CarId::from(id),
            CarPayload {
                name: format!("Car {id}"),
                model: "GT".into(),
                cubic_capacity_of_engine: 3996,
                price,
                top_speed: 320,
                company_name: "Porsche".into(),
                image: format!("{id}.jpg"),
            },
            Principal::from_name("owner"),
            Timestamp::from_nanos(price),
        )
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCarStore::open(dir.path().join("cars.json")).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        {
            let store = JsonFileCarStore::open(&path).unwrap();
            for (id, price) in [("b", 2), ("a", 1)] {
                let car = make_car(id, price);
                store.insert(&car.id, &car).unwrap();
            }
        }

        let reopened = JsonFileCarStore::open(&path).unwrap();
        let values = reopened.values().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], make_car("a", 1));
        assert_eq!(values[1], make_car("b", 2));
    }

    #[test]
    fn remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        let store = JsonFileCarStore::open(&path).unwrap();
        let car = make_car("a", 1);
        store.insert(&car.id, &car).unwrap();
        assert_eq!(store.remove(&car.id).unwrap(), Some(car.clone()));
        assert_eq!(store.remove(&car.id).unwrap(), None);

        let reopened = JsonFileCarStore::open(&path).unwrap();
        assert!(reopened.get(&car.id).unwrap().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("cars.json");
        let store = JsonFileCarStore::open(&path).unwrap();
        let car = make_car("a", 1);
        store.insert(&car.id, &car).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn empty_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        fs::write(&path, b"\n").unwrap();
        let store = JsonFileCarStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = JsonFileCarStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn duplicate_ids_in_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.json");
        let car = make_car("a", 1);
        fs::write(&path, serde_json::to_vec(&vec![&car, &car]).unwrap()).unwrap();
        let err = JsonFileCarStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::CorruptFile { .. }));
    }

    #[test]
    fn failed_write_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("data");
        let store = JsonFileCarStore::open(parent.join("cars.json")).unwrap();
        let kept = make_car("a", 1);
        store.insert(&kept.id, &kept).unwrap();

        // Replace the parent directory with a regular file so every
        // snapshot write fails.
        fs::remove_dir_all(&parent).unwrap();
        fs::write(&parent, b"not a directory").unwrap();

        let rejected = make_car("b", 2);
        let err = store.insert(&rejected.id, &rejected).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.get(&rejected.id).unwrap().is_none());
        assert_eq!(store.values().unwrap(), vec![kept.clone()]);

        let replacement = make_car("a", 99);
        assert!(matches!(
            store.insert(&kept.id, &replacement),
            Err(StoreError::Io(_))
        ));
        assert!(matches!(store.remove(&kept.id), Err(StoreError::Io(_))));
        assert_eq!(store.get(&kept.id).unwrap(), Some(kept));
        assert_eq!(store.len().unwrap(), 1);
    }
}
