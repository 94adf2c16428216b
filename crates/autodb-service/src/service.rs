use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use autodb_store::CarStore;
use autodb_types::{Car, CarId, CarPayload, HistoryEntry, Preferences, Principal};
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::filter::CarFilter;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::validation::{parse_amount, require_text, validate_id, validate_payload};

/// Car operations over an injected store.
///
/// Every read-modify-write sequence (create, update, delete, owner and
/// image changes) runs under a service-wide write mutex, so mutations are
/// serialized and never interleave. Reads go straight to the store and only
/// take its shared lock.
pub struct CarService<S: CarStore> {
    store: Arc<S>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    config: ServiceConfig,
    write_lock: Mutex<()>,
}

impl<S: CarStore> CarService<S> {
    /// Service with the production collaborators: monotonic system clock
    /// and UUID v4 ids.
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        Self::with_collaborators(
            store,
            config,
            Box::new(SystemClock::new()),
            Box::new(UuidGenerator),
        )
    }

    pub fn with_collaborators(
        store: Arc<S>,
        config: ServiceConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ---- Mutations ----

    /// Validate `payload` and insert a new record owned by `caller`.
    #[instrument(skip_all, fields(caller = %caller))]
    pub fn create(&self, caller: &Principal, payload: CarPayload) -> ServiceResult<Car> {
        validate_payload(&payload)?;

        let _guard = self.lock_writes();
        let id = self.ids.next_id();
        if self.store.contains(&id)? {
            warn!(id = %id, "generated car id already in use");
            return Err(ServiceError::Conflict(id));
        }

        let car = Car::new(id, payload, caller.clone(), self.clock.now());
        self.store.insert(&car.id, &car)?;
        info!(id = %car.id, name = %car.name, "car created");
        Ok(car)
    }

    /// Replace every descriptive field of an existing record.
    ///
    /// `id`, `owner` and `createdAt` are kept; `updatedAt` is bumped.
    #[instrument(skip_all, fields(caller = %caller, id = %id))]
    pub fn update(
        &self,
        caller: &Principal,
        id: &CarId,
        payload: CarPayload,
    ) -> ServiceResult<Car> {
        validate_id(id)?;
        validate_payload(&payload)?;

        let _guard = self.lock_writes();
        let existing = self.existing(id)?;
        self.authorize(&existing, caller, self.config.gates_all_mutations())?;

        let updated = existing.merged_with(payload, self.clock.now());
        self.store.insert(&updated.id, &updated)?;
        info!(id = %updated.id, "car updated");
        Ok(updated)
    }

    /// Remove a record. Only its owner may do this.
    ///
    /// Returns the record as it was just before removal.
    #[instrument(skip_all, fields(caller = %caller, id = %id))]
    pub fn delete(&self, caller: &Principal, id: &CarId) -> ServiceResult<Car> {
        let _guard = self.lock_writes();
        let existing = self.existing(id)?;
        self.authorize(&existing, caller, true)?;

        let removed = self
            .store
            .remove(id)?
            .ok_or_else(|| ServiceError::not_found(format!("car with id={id}")))?;
        info!(id = %id, "car deleted");
        Ok(removed)
    }

    /// Transfer a record to `new_owner`.
    #[instrument(skip_all, fields(caller = %caller, id = %id, new_owner = %new_owner))]
    pub fn update_owner(
        &self,
        caller: &Principal,
        id: &CarId,
        new_owner: &Principal,
    ) -> ServiceResult<Car> {
        let _guard = self.lock_writes();
        let existing = self.existing(id)?;
        self.authorize(&existing, caller, self.config.gates_all_mutations())?;

        let updated = existing.with_owner(new_owner.clone(), self.clock.now());
        self.store.insert(&updated.id, &updated)?;
        info!(id = %id, "car owner changed");
        Ok(updated)
    }

    /// Point a record at a new image.
    #[instrument(skip_all, fields(caller = %caller, id = %id))]
    pub fn update_image(
        &self,
        caller: &Principal,
        id: &CarId,
        image: &str,
    ) -> ServiceResult<Car> {
        require_text("image", image)?;

        let _guard = self.lock_writes();
        let existing = self.existing(id)?;
        self.authorize(&existing, caller, self.config.gates_all_mutations())?;

        let updated = existing.with_image(image.to_string(), self.clock.now());
        self.store.insert(&updated.id, &updated)?;
        info!(id = %id, "car image changed");
        Ok(updated)
    }

    // ---- Lookups ----

    pub fn get_by_id(&self, id: &CarId) -> ServiceResult<Car> {
        self.existing(id)
    }

    /// First record (in key order) whose name matches, ignoring case.
    pub fn get_by_name(&self, name: &str) -> ServiceResult<Car> {
        require_text("name", name)?;
        self.find_first(&CarFilter::Name(name.to_string()))?
            .ok_or_else(|| ServiceError::not_found(format!("car with name={name:?}")))
    }

    pub fn list_all(&self) -> ServiceResult<Vec<Car>> {
        Ok(self.store.values()?)
    }

    pub fn search_by_company_name(&self, company: &str) -> ServiceResult<Vec<Car>> {
        self.scan(&CarFilter::CompanyName(company.to_string()))
    }

    pub fn search_by_model(&self, model: &str) -> ServiceResult<Vec<Car>> {
        self.scan(&CarFilter::Model(model.to_string()))
    }

    pub fn get_cars_by_owner(&self, owner: &Principal) -> ServiceResult<Vec<Car>> {
        self.scan(&CarFilter::Owner(owner.clone()))
    }

    /// Records priced within `[min, max]`. Bounds are parsed as integers.
    pub fn filter_by_price_range(&self, min: &str, max: &str) -> ServiceResult<Vec<Car>> {
        let min = parse_amount("min", min)?;
        let max = parse_amount("max", max)?;
        self.scan(&CarFilter::PriceRange { min, max })
    }

    /// First record (in key order) with exactly this price.
    pub fn get_by_price(&self, price: &str) -> ServiceResult<Car> {
        let amount = parse_amount("price", price)?;
        self.find_first(&CarFilter::Price(amount))?
            .ok_or_else(|| ServiceError::not_found(format!("car with price={amount}")))
    }

    /// Record with the latest `createdAt`; ties go to the earlier key.
    pub fn get_newest_car(&self) -> ServiceResult<Car> {
        self.store
            .values()?
            .into_iter()
            .reduce(|best, car| if car.created_at > best.created_at { car } else { best })
            .ok_or_else(|| ServiceError::not_found("newest car"))
    }

    /// Record with the earliest `createdAt`; ties go to the earlier key.
    pub fn get_oldest_car(&self) -> ServiceResult<Car> {
        self.store
            .values()?
            .into_iter()
            .reduce(|best, car| if car.created_at < best.created_at { car } else { best })
            .ok_or_else(|| ServiceError::not_found("oldest car"))
    }

    /// Up to `recommend_limit` records in key order.
    ///
    /// Preferences are accepted but not scored yet.
    // TODO: rank by `preferences` (company, model, max price, min top speed)
    // instead of returning the first records.
    pub fn recommend(&self, preferences: &Preferences) -> ServiceResult<Vec<Car>> {
        let limit = self.config.recommend_limit;
        debug!(?preferences, limit, "recommend");
        Ok(self.store.values()?.into_iter().take(limit).collect())
    }

    /// Ownership and timestamps of a record, as a single-entry list.
    pub fn get_history(&self, id: &CarId) -> ServiceResult<Vec<HistoryEntry>> {
        Ok(vec![self.existing(id)?.history_entry()])
    }

    // ---- Internals ----

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The mutex guards no data, so a poisoned lock is still usable.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn existing(&self, id: &CarId) -> ServiceResult<Car> {
        validate_id(id)?;
        self.store
            .get(id)?
            .ok_or_else(|| ServiceError::not_found(format!("car with id={id}")))
    }

    fn authorize(&self, car: &Car, caller: &Principal, gated: bool) -> ServiceResult<()> {
        if gated && !car.is_owned_by(caller) {
            warn!(id = %car.id, caller = %caller, "rejected mutation by non-owner");
            return Err(ServiceError::Unauthorized {
                id: car.id.clone(),
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn scan(&self, filter: &CarFilter) -> ServiceResult<Vec<Car>> {
        let matches: Vec<Car> = self
            .store
            .values()?
            .into_iter()
            .filter(|car| filter.matches(car))
            .collect();
        debug!(?filter, count = matches.len(), "scan");
        Ok(matches)
    }

    fn find_first(&self, filter: &CarFilter) -> ServiceResult<Option<Car>> {
        Ok(self
            .store
            .values()?
            .into_iter()
            .find(|car| filter.matches(car)))
    }
}
