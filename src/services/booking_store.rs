//! The booking store: single owner of bookings, services and the theme
//! preference.
//!
//! Every mutation builds the new collection, writes the whole thing to
//! storage, and only then swaps it into memory. A failed write leaves both the
//! stored and in-memory views as they were.

use std::sync::Arc;

use chrono::FixedOffset;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{
    default_services, Booking, BookingFilter, BookingStatus, NewBooking, NewService, Service,
    Theme,
};
use crate::services::clock::Clock;
use crate::services::ids::IdGenerator;
use crate::services::storage::{KeyValueStorage, StorageError};
use crate::services::validation::{self, ValidationError};

pub const BOOKINGS_KEY: &str = "fm_bookings_v1";
pub const THEME_KEY: &str = "fm_theme_v1";
pub const SERVICES_KEY: &str = "fm_services_v1";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct BookingStore<S: KeyValueStorage> {
    storage: S,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    ids: IdGenerator,
    bookings: Vec<Booking>,
    services: Vec<Service>,
    theme: Theme,
}

impl<S: KeyValueStorage> BookingStore<S> {
    /// Loads all three collections. Nothing here fails: unreadable values
    /// fall back to their defaults.
    pub fn open(storage: S, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        let bookings = load_json::<Vec<Booking>>(&storage, BOOKINGS_KEY).unwrap_or_default();
        // `null` and a missing key both mean "never customised".
        let services = load_json::<Option<Vec<Service>>>(&storage, SERVICES_KEY)
            .flatten()
            .unwrap_or_else(default_services);
        let theme = load_raw(&storage, THEME_KEY)
            .and_then(|raw| parse_theme(&raw))
            .unwrap_or_default();

        tracing::info!(
            bookings = bookings.len(),
            services = services.len(),
            theme = theme.as_str(),
            "booking store loaded"
        );

        Self {
            storage,
            clock,
            offset,
            ids: IdGenerator::new(),
            bookings,
            services,
            theme,
        }
    }

    // ── Bookings ──

    pub fn bookings(&self, filter: BookingFilter) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect()
    }

    pub fn booking(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn create_booking(&mut self, input: NewBooking) -> Result<Booking, BookingError> {
        validation::validate_name(&input.name)?;
        validation::validate_phone(&input.phone)?;
        let datetime = validation::parse_appointment(&input.date, &input.time, self.offset)?;
        let now = self.clock.now();
        validation::validate_not_past(&datetime, &now)?;

        let service = self
            .services
            .iter()
            .find(|s| s.id == input.service_id)
            .ok_or_else(|| BookingError::ServiceNotFound(input.service_id.clone()))?;

        let booking = Booking {
            id: self.ids.next("b_", now.timestamp_millis()),
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            datetime,
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            price: service.price,
            notes: input.notes,
            status: BookingStatus::Upcoming,
            created_at: now,
        };

        let mut next = Vec::with_capacity(self.bookings.len() + 1);
        next.push(booking.clone());
        next.extend(self.bookings.iter().cloned());
        self.commit_bookings(next)?;

        tracing::info!(id = %booking.id, service = %booking.service_name, "booking created");
        Ok(booking)
    }

    /// Returns `true` when the booking moved from upcoming to completed.
    pub fn complete_booking(&mut self, id: &str) -> Result<bool, StoreError> {
        let mut changed = false;
        let next: Vec<Booking> = self
            .bookings
            .iter()
            .map(|b| {
                if b.id == id && b.status == BookingStatus::Upcoming {
                    changed = true;
                    Booking {
                        status: BookingStatus::Completed,
                        ..b.clone()
                    }
                } else {
                    b.clone()
                }
            })
            .collect();

        self.commit_bookings(next)?;
        if changed {
            tracing::info!(id = %id, "booking completed");
        }
        Ok(changed)
    }

    /// Returns `true` when something was removed.
    pub fn delete_booking(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.bookings.len();
        let next: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.id != id)
            .cloned()
            .collect();
        let removed = next.len() != before;

        self.commit_bookings(next)?;
        if removed {
            tracing::info!(id = %id, "booking deleted");
        }
        Ok(removed)
    }

    // ── Services ──

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn add_service(&mut self, new: NewService) -> Result<Service, StoreError> {
        let now = self.clock.now();
        let service = Service {
            id: self.ids.next("s_", now.timestamp_millis()),
            name: new.name,
            price: new.price,
            minutes: new.minutes,
        };

        let mut next = Vec::with_capacity(self.services.len() + 1);
        next.push(service.clone());
        next.extend(self.services.iter().cloned());
        self.commit_services(next)?;

        tracing::info!(id = %service.id, name = %service.name, "service added");
        Ok(service)
    }

    /// Existing bookings keep their snapshot of a removed service.
    pub fn remove_service(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.services.len();
        let next: Vec<Service> = self
            .services
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        let removed = next.len() != before;

        self.commit_services(next)?;
        if removed {
            tracing::info!(id = %id, "service removed");
        }
        Ok(removed)
    }

    // ── Theme ──

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<Theme, StoreError> {
        self.storage
            .set(THEME_KEY, &serde_json::to_string(&theme)?)?;
        self.theme = theme;
        Ok(theme)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, StoreError> {
        self.set_theme(self.theme.toggled())
    }

    fn commit_bookings(&mut self, next: Vec<Booking>) -> Result<(), StoreError> {
        write_json(&self.storage, BOOKINGS_KEY, &next)?;
        self.bookings = next;
        Ok(())
    }

    fn commit_services(&mut self, next: Vec<Service>) -> Result<(), StoreError> {
        write_json(&self.storage, SERVICES_KEY, &next)?;
        self.services = next;
        Ok(())
    }
}

fn load_raw<S: KeyValueStorage>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored value, using default");
            None
        }
    }
}

fn load_json<T: DeserializeOwned>(storage: &impl KeyValueStorage, key: &str) -> Option<T> {
    let raw = load_raw(storage, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored value is not valid JSON, using default");
            None
        }
    }
}

/// Accepts the JSON form (`"light"`) and the bare string the browser build
/// wrote (`light`).
fn parse_theme(raw: &str) -> Option<Theme> {
    serde_json::from_str::<Theme>(raw)
        .ok()
        .or_else(|| Theme::parse(raw.trim()))
}

fn write_json<T: Serialize + ?Sized>(
    storage: &impl KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    storage.set(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::FixedClock;
    use crate::services::storage::MemoryStorage;
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        "2030-06-16T08:00:00Z".parse().unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn open(storage: MemoryStorage) -> BookingStore<MemoryStorage> {
        BookingStore::open(storage, Arc::new(FixedClock::new(now())), utc())
    }

    fn input(service_id: &str) -> NewBooking {
        NewBooking {
            name: "  Tunde Bakare ".to_string(),
            phone: "+2348012345678".to_string(),
            date: "2030-06-16".to_string(),
            time: "10:00".to_string(),
            service_id: service_id.to_string(),
            notes: "skin fade".to_string(),
        }
    }

    struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_open_empty_storage_uses_defaults() {
        let store = open(MemoryStorage::new());
        assert!(store.bookings(BookingFilter::All).is_empty());
        assert_eq!(store.services(), default_services().as_slice());
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_open_corrupt_json_falls_back() {
        let storage = MemoryStorage::new()
            .with_value(BOOKINGS_KEY, "{not json")
            .with_value(SERVICES_KEY, "[{\"id\":")
            .with_value(THEME_KEY, "purple");
        let store = open(storage);

        assert!(store.bookings(BookingFilter::All).is_empty());
        assert_eq!(store.services().len(), 4);
        assert_eq!(store.theme(), Theme::Dark);
    }

    #[test]
    fn test_open_null_services_means_seed_but_empty_list_is_kept() {
        let store = open(MemoryStorage::new().with_value(SERVICES_KEY, "null"));
        assert_eq!(store.services().len(), 4);

        let store = open(MemoryStorage::new().with_value(SERVICES_KEY, "[]"));
        assert!(store.services().is_empty());
    }

    #[test]
    fn test_open_reads_bare_theme_string() {
        let store = open(MemoryStorage::new().with_value(THEME_KEY, "light"));
        assert_eq!(store.theme(), Theme::Light);

        let store = open(MemoryStorage::new().with_value(THEME_KEY, "\"light\""));
        assert_eq!(store.theme(), Theme::Light);
    }

    #[test]
    fn test_open_with_unreadable_storage_fails_soft() {
        let store = BookingStore::open(FailingStorage, Arc::new(FixedClock::new(now())), utc());
        assert!(store.bookings(BookingFilter::All).is_empty());
        assert_eq!(store.services().len(), 4);
    }

    #[test]
    fn test_create_booking_snapshots_service() {
        let storage = MemoryStorage::new();
        let mut store = open(storage.clone());

        let booking = store.create_booking(input("s1")).unwrap();
        assert!(booking.id.starts_with("b_"));
        assert_eq!(booking.name, "Tunde Bakare");
        assert_eq!(booking.service_name, "Haircut");
        assert_eq!(booking.price, 2000);
        assert_eq!(booking.status, BookingStatus::Upcoming);
        assert_eq!(booking.created_at, now());
        assert_eq!(booking.datetime.to_rfc3339(), "2030-06-16T10:00:00+00:00");
        assert!(booking.datetime >= booking.created_at);

        let stored: Vec<Booking> =
            serde_json::from_str(&storage.raw(BOOKINGS_KEY).unwrap()).unwrap();
        assert_eq!(stored, vec![booking]);
    }

    #[test]
    fn test_create_booking_prepends() {
        let mut store = open(MemoryStorage::new());
        let first = store.create_booking(input("s1")).unwrap();
        let second = store.create_booking(input("s2")).unwrap();

        let ids: Vec<String> = store
            .bookings(BookingFilter::All)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_create_booking_validation_order() {
        let mut store = open(MemoryStorage::new());

        let mut bad = input("missing");
        bad.name = " ".to_string();
        bad.phone = "nope".to_string();
        let err = store.create_booking(bad).unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name");

        let mut bad = input("missing");
        bad.phone = "12".to_string();
        bad.date = String::new();
        let err = store.create_booking(bad).unwrap_err();
        assert_eq!(err.to_string(), "Enter a valid phone (digits, optional +)");

        let mut bad = input("missing");
        bad.date = String::new();
        bad.time = String::new();
        assert_eq!(store.create_booking(bad).unwrap_err().to_string(), "Select a date");

        let mut bad = input("missing");
        bad.time = String::new();
        assert_eq!(store.create_booking(bad).unwrap_err().to_string(), "Select a time");

        let mut bad = input("missing");
        bad.date = "2030-13-01".to_string();
        assert_eq!(
            store.create_booking(bad).unwrap_err().to_string(),
            "Invalid date/time"
        );

        let mut bad = input("missing");
        bad.date = "2030-06-15".to_string();
        assert_eq!(
            store.create_booking(bad).unwrap_err().to_string(),
            "Cannot book in the past"
        );

        let err = store.create_booking(input("missing")).unwrap_err();
        assert!(matches!(err, BookingError::ServiceNotFound(ref id) if id == "missing"));
        assert_eq!(err.to_string(), "Service not found: missing");
    }

    #[test]
    fn test_rejected_booking_writes_nothing() {
        let storage = MemoryStorage::new();
        let mut store = open(storage.clone());

        let mut bad = input("s1");
        bad.time = "07:59".to_string();
        assert!(store.create_booking(bad).is_err());
        assert!(store.create_booking(input("gone")).is_err());

        assert!(store.bookings(BookingFilter::All).is_empty());
        assert_eq!(storage.raw(BOOKINGS_KEY), None);
    }

    #[test]
    fn test_booking_at_exactly_now_is_allowed() {
        let mut store = open(MemoryStorage::new());
        let mut at_now = input("s1");
        at_now.time = "08:00".to_string();
        let booking = store.create_booking(at_now).unwrap();
        assert_eq!(booking.datetime, booking.created_at);
    }

    #[test]
    fn test_past_check_follows_the_clock() {
        let clock = Arc::new(FixedClock::new(now()));
        let mut store = BookingStore::open(MemoryStorage::new(), clock.clone(), utc());

        clock.advance(Duration::hours(3));
        let err = store.create_booking(input("s1")).unwrap_err();
        assert!(matches!(err, BookingError::Invalid(ValidationError::InPast)));
    }

    #[test]
    fn test_failed_write_keeps_memory_unchanged() {
        let mut store = BookingStore::open(FailingStorage, Arc::new(FixedClock::new(now())), utc());
        let err = store.create_booking(input("s1")).unwrap_err();
        assert!(matches!(err, BookingError::Store(_)));
        assert!(store.bookings(BookingFilter::All).is_empty());

        assert!(store.add_service(NewService {
            name: "Shave".to_string(),
            price: 1200,
            minutes: 20,
        })
        .is_err());
        assert_eq!(store.services().len(), 4);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut store = open(MemoryStorage::new());
        let booking = store.create_booking(input("s1")).unwrap();

        assert!(store.complete_booking(&booking.id).unwrap());
        let once = store.bookings(BookingFilter::All);
        assert!(!store.complete_booking(&booking.id).unwrap());
        let twice = store.bookings(BookingFilter::All);

        assert_eq!(once, twice);
        assert!(twice[0].is_completed());
    }

    #[test]
    fn test_complete_unknown_id_is_noop() {
        let mut store = open(MemoryStorage::new());
        store.create_booking(input("s1")).unwrap();
        let before = store.bookings(BookingFilter::All);

        assert!(!store.complete_booking("b_nope").unwrap());
        assert_eq!(store.bookings(BookingFilter::All), before);
    }

    #[test]
    fn test_delete_booking() {
        let mut store = open(MemoryStorage::new());
        let keep = store.create_booking(input("s1")).unwrap();
        let gone = store.create_booking(input("s2")).unwrap();

        assert!(store.delete_booking(&gone.id).unwrap());
        assert!(!store.delete_booking(&gone.id).unwrap());
        assert!(!store.delete_booking("b_unknown").unwrap());

        assert_eq!(store.bookings(BookingFilter::All), vec![keep]);
    }

    #[test]
    fn test_filter_keeps_newest_first() {
        let mut store = open(MemoryStorage::new());
        let a = store.create_booking(input("s1")).unwrap();
        let b = store.create_booking(input("s2")).unwrap();
        let c = store.create_booking(input("s3")).unwrap();
        store.complete_booking(&b.id).unwrap();

        let upcoming: Vec<String> = store
            .bookings(BookingFilter::Upcoming)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(upcoming, vec![c.id, a.id]);

        let completed = store.bookings(BookingFilter::Completed);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, b.id);
    }

    #[test]
    fn test_collections_round_trip_through_storage() {
        let storage = MemoryStorage::new();
        let mut store = open(storage.clone());
        store.create_booking(input("s1")).unwrap();
        let done = store.create_booking(input("s4")).unwrap();
        store.complete_booking(&done.id).unwrap();
        store
            .add_service(NewService {
                name: "Kids Cut".to_string(),
                price: 1500,
                minutes: 20,
            })
            .unwrap();
        store.set_theme(Theme::Light).unwrap();

        let reopened = open(storage);
        assert_eq!(
            reopened.bookings(BookingFilter::All),
            store.bookings(BookingFilter::All)
        );
        assert_eq!(reopened.services(), store.services());
        assert_eq!(reopened.theme(), Theme::Light);
    }

    #[test]
    fn test_add_and_remove_service() {
        let mut store = open(MemoryStorage::new());
        let service = store
            .add_service(NewService {
                name: "Express Cut".to_string(),
                price: 1500,
                minutes: 20,
            })
            .unwrap();

        assert!(service.id.starts_with("s_"));
        assert_eq!(store.services()[0], service);
        assert_eq!(store.services().len(), 5);

        assert!(store.remove_service(&service.id).unwrap());
        assert!(!store.remove_service(&service.id).unwrap());
        assert_eq!(store.services(), default_services().as_slice());
    }

    #[test]
    fn test_snapshot_survives_service_removal() {
        let mut store = open(MemoryStorage::new());
        let shave = store
            .add_service(NewService {
                name: "Shave".to_string(),
                price: 1200,
                minutes: 20,
            })
            .unwrap();

        let booking = store.create_booking(input(&shave.id)).unwrap();
        assert_eq!(booking.price, 1200);
        assert_eq!(booking.service_name, "Shave");

        store.remove_service(&shave.id).unwrap();
        let stored = store.booking(&booking.id).unwrap();
        assert_eq!(stored.price, 1200);
        assert_eq!(stored.service_name, "Shave");

        let err = store.create_booking(input(&shave.id)).unwrap_err();
        assert!(matches!(err, BookingError::ServiceNotFound(_)));
    }

    #[test]
    fn test_toggle_theme_persists() {
        let storage = MemoryStorage::new();
        let mut store = open(storage.clone());

        assert_eq!(store.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(storage.raw(THEME_KEY).as_deref(), Some("\"light\""));
        assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(storage.raw(THEME_KEY).as_deref(), Some("\"dark\""));
    }
}
