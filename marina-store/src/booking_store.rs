use marina_core::{
    generate_booking_id, BookingData, BookingStatus, KeyValueStorage, SavedBooking, StorageError,
    BOOKINGS_KEY, PENDING_BOOKING_KEY,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the store reacts to missing records, unreachable storage and
/// unreadable blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorePolicy {
    /// Unreachable storage reads as empty and drops writes, unknown ids are
    /// ignored, corrupt blobs read as empty.
    #[default]
    Lenient,
    /// Every one of those conditions is returned as an error.
    Strict,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Booking storage unavailable: {0}")]
    Unavailable(String),
    #[error("Booking not found: {0}")]
    NotFound(String),
    #[error("Stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Booking storage failed: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of reading one key.
enum Slot<T> {
    Value(T),
    Empty,
    Unavailable,
}

/// Saved bookings plus the single pending-checkout slot.
///
/// Every mutation reads the whole collection, edits it in memory and writes
/// it back. Two stores sharing one backend race at that granularity and the
/// last writer wins.
#[derive(Clone)]
pub struct BookingStore {
    storage: Arc<dyn KeyValueStorage>,
    policy: StorePolicy,
}

impl BookingStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, policy: StorePolicy) -> Self {
        Self { storage, policy }
    }

    pub fn lenient(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::new(storage, StorePolicy::Lenient)
    }

    pub fn strict(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::new(storage, StorePolicy::Strict)
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// All saved bookings in the order they were saved.
    pub fn list_bookings(&self) -> StoreResult<Vec<SavedBooking>> {
        match self.read(BOOKINGS_KEY)? {
            Some(bookings) => Ok(bookings),
            None => Ok(Vec::new()),
        }
    }

    /// Append a booking. Ids are not checked; a repeated id gives two records.
    pub fn save_booking(&self, booking: SavedBooking) -> StoreResult<()> {
        let Some(mut bookings) = self.bookings_for_update()? else {
            return Ok(());
        };
        info!("Saving booking {} ({})", booking.id, booking.status);
        bookings.push(booking);
        self.write(BOOKINGS_KEY, &bookings)
    }

    /// Set the status of every booking carrying `id`. Any status may replace
    /// any other.
    pub fn update_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<()> {
        let Some(mut bookings) = self.bookings_for_update()? else {
            return Ok(());
        };
        let mut matched = 0;
        for booking in bookings.iter_mut().filter(|b| b.id == id) {
            booking.status = status;
            matched += 1;
        }
        if matched == 0 {
            return self.missing(id);
        }
        info!("Booking {} -> {} ({} record(s))", id, status, matched);
        self.write(BOOKINGS_KEY, &bookings)
    }

    /// Remove every booking carrying `id`.
    pub fn delete_booking(&self, id: &str) -> StoreResult<()> {
        let Some(mut bookings) = self.bookings_for_update()? else {
            return Ok(());
        };
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        if bookings.len() == before {
            return self.missing(id);
        }
        info!("Deleted booking {} ({} record(s))", id, before - bookings.len());
        self.write(BOOKINGS_KEY, &bookings)
    }

    /// Stage a checkout draft, replacing whatever was staged before.
    pub fn set_pending_booking(&self, draft: &BookingData) -> StoreResult<()> {
        debug!("Staging pending booking for yacht {}", draft.yacht.id);
        self.write(PENDING_BOOKING_KEY, draft)
    }

    pub fn get_pending_booking(&self) -> StoreResult<Option<BookingData>> {
        self.read(PENDING_BOOKING_KEY)
    }

    pub fn clear_pending_booking(&self) -> StoreResult<()> {
        match self.storage.remove(PENDING_BOOKING_KEY) {
            Ok(()) => Ok(()),
            Err(e) => self.storage_failed(e),
        }
    }

    pub fn generate_booking_id(&self) -> String {
        generate_booking_id()
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.read_slot(key)? {
            Slot::Value(value) => Ok(Some(value)),
            Slot::Empty | Slot::Unavailable => Ok(None),
        }
    }

    /// Collection to rewrite, or `None` when the read could not reach
    /// storage. Writing back after such a read would replace whatever is
    /// stored with a collection built from nothing.
    fn bookings_for_update(&self) -> StoreResult<Option<Vec<SavedBooking>>> {
        match self.read_slot(BOOKINGS_KEY)? {
            Slot::Value(bookings) => Ok(Some(bookings)),
            Slot::Empty => Ok(Some(Vec::new())),
            Slot::Unavailable => {
                debug!("Bookings unreadable, mutation skipped");
                Ok(None)
            }
        }
    }

    fn read_slot<T: serde::de::DeserializeOwned>(&self, key: &str) -> StoreResult<Slot<T>> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Slot::Empty),
            Err(e) => {
                // Only the lenient policy gets past this
                self.storage_failed(e)?;
                return Ok(Slot::Unavailable);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Slot::Value(value)),
            Err(e) => match self.policy {
                // Readable but garbage: the next write replaces it.
                StorePolicy::Lenient => {
                    warn!("Ignoring unreadable value under '{}': {}", key, e);
                    Ok(Slot::Empty)
                }
                StorePolicy::Strict => Err(StoreError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }

    fn write<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| StoreError::Backend(format!("encode '{}': {}", key, e)))?;
        match self.storage.set(key, &encoded) {
            Ok(()) => Ok(()),
            Err(e) => self.storage_failed(e),
        }
    }

    fn storage_failed(&self, err: StorageError) -> StoreResult<()> {
        match (err, self.policy) {
            (StorageError::Unavailable(reason), StorePolicy::Lenient) => {
                debug!("Storage unavailable, treating as empty: {}", reason);
                Ok(())
            }
            (StorageError::Unavailable(reason), StorePolicy::Strict) => {
                Err(StoreError::Unavailable(reason))
            }
            (StorageError::Backend(reason), _) => Err(StoreError::Backend(reason)),
        }
    }

    fn missing(&self, id: &str) -> StoreResult<()> {
        match self.policy {
            StorePolicy::Lenient => {
                debug!("No booking with id {}, nothing to do", id);
                Ok(())
            }
            StorePolicy::Strict => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStorage, UnavailableStorage};
    use marina_core::{PaymentMethod, Yacht};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn yacht() -> Yacht {
        Yacht {
            id: 3,
            name: "Serenity".to_string(),
            location: "Mykonos".to_string(),
            image: "/yachts/serenity.jpg".to_string(),
            price: 10_000,
            guests: 10,
            cabins: 5,
            length: "45m".to_string(),
            crew: 8,
            category: None,
            description: "Sailing yacht".to_string(),
            amenities: vec!["Paddle boards".to_string()],
            images: vec![],
        }
    }

    fn draft() -> BookingData {
        BookingData {
            yacht: yacht(),
            start_date: "2026-08-10".to_string(),
            end_date: "2026-08-13".to_string(),
            guests: 6,
            total_price: 30_000,
            days: 3,
        }
    }

    fn booking(id: &str, status: BookingStatus) -> SavedBooking {
        SavedBooking {
            booking: draft(),
            id: id.to_string(),
            payment_method: PaymentMethod::Card,
            booking_date: "2026-08-01T09:30:00.000Z".to_string(),
            status,
        }
    }

    fn memory_store(policy: StorePolicy) -> (Arc<MemoryStorage>, BookingStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = BookingStore::new(storage.clone(), policy);
        (storage, store)
    }

    #[test]
    fn test_empty_store() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        assert!(store.list_bookings().unwrap().is_empty());
        assert_eq!(store.get_pending_booking().unwrap(), None);
    }

    #[test]
    fn test_save_preserves_insertion_order() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        let ids = ["c", "a", "b", "a"];
        for id in ids {
            store.save_booking(booking(id, BookingStatus::Pending)).unwrap();
        }

        let listed: Vec<String> = store.list_bookings().unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_update_status_scenario() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        store.save_booking(booking("a", BookingStatus::Pending)).unwrap();
        store.save_booking(booking("b", BookingStatus::Confirmed)).unwrap();

        store.update_booking_status("a", BookingStatus::Confirmed).unwrap();

        let bookings = store.list_bookings().unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].id, "a");
        assert_eq!(bookings[0].status, BookingStatus::Confirmed);
        assert_eq!(bookings[1].id, "b");
        assert_eq!(bookings[1].status, BookingStatus::Confirmed);
        assert_eq!(bookings[0], booking("a", BookingStatus::Confirmed));
    }

    #[test]
    fn test_any_transition_is_allowed() {
        let (_, store) = memory_store(StorePolicy::Strict);
        store.save_booking(booking("x", BookingStatus::Cancelled)).unwrap();
        store.update_booking_status("x", BookingStatus::Pending).unwrap();
        store.update_booking_status("x", BookingStatus::Confirmed).unwrap();
        assert_eq!(store.list_bookings().unwrap()[0].status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_duplicate_ids_update_and_delete_together() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        store.save_booking(booking("dup", BookingStatus::Pending)).unwrap();
        store.save_booking(booking("other", BookingStatus::Pending)).unwrap();
        store.save_booking(booking("dup", BookingStatus::Pending)).unwrap();

        store.update_booking_status("dup", BookingStatus::Cancelled).unwrap();
        let statuses: Vec<BookingStatus> = store.list_bookings().unwrap().iter().map(|b| b.status).collect();
        assert_eq!(statuses, [BookingStatus::Cancelled, BookingStatus::Pending, BookingStatus::Cancelled]);

        store.delete_booking("dup").unwrap();
        let remaining = store.list_bookings().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "other");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        store.save_booking(booking("a", BookingStatus::Confirmed)).unwrap();
        store.delete_booking("a").unwrap();
        store.delete_booking("a").unwrap();
        assert!(store.list_bookings().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id_depends_on_policy() {
        let (_, lenient) = memory_store(StorePolicy::Lenient);
        lenient.update_booking_status("ghost", BookingStatus::Confirmed).unwrap();
        lenient.delete_booking("ghost").unwrap();

        let (_, strict) = memory_store(StorePolicy::Strict);
        assert!(matches!(
            strict.update_booking_status("ghost", BookingStatus::Confirmed),
            Err(StoreError::NotFound(id)) if id == "ghost"
        ));
        assert!(matches!(strict.delete_booking("ghost"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_pending_slot_holds_one_draft() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        let first = draft();
        let mut second = draft();
        second.guests = 2;

        store.set_pending_booking(&first).unwrap();
        store.set_pending_booking(&second).unwrap();
        assert_eq!(store.get_pending_booking().unwrap(), Some(second));
        assert!(store.list_bookings().unwrap().is_empty());

        store.clear_pending_booking().unwrap();
        store.clear_pending_booking().unwrap();
        assert_eq!(store.get_pending_booking().unwrap(), None);
    }

    #[test]
    fn test_persisted_layout() {
        let (storage, store) = memory_store(StorePolicy::Lenient);
        store.save_booking(booking("a", BookingStatus::Pending)).unwrap();
        store.set_pending_booking(&draft()).unwrap();

        let raw = storage.get(BOOKINGS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["status"], "pending");
        assert_eq!(value[0]["totalPrice"], 30_000);

        let raw = storage.get(PENDING_BOOKING_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["startDate"], "2026-08-10");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_unavailable_storage_depends_on_policy() {
        let lenient = BookingStore::lenient(Arc::new(UnavailableStorage));
        assert!(lenient.list_bookings().unwrap().is_empty());
        lenient.save_booking(booking("a", BookingStatus::Confirmed)).unwrap();
        assert!(lenient.list_bookings().unwrap().is_empty());
        assert_eq!(lenient.get_pending_booking().unwrap(), None);
        lenient.set_pending_booking(&draft()).unwrap();
        lenient.clear_pending_booking().unwrap();

        let strict = BookingStore::strict(Arc::new(UnavailableStorage));
        assert!(matches!(strict.list_bookings(), Err(StoreError::Unavailable(_))));
        assert!(matches!(strict.clear_pending_booking(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_corrupt_blob_depends_on_policy() {
        let (storage, lenient) = memory_store(StorePolicy::Lenient);
        storage.set(BOOKINGS_KEY, "{not json").unwrap();
        storage.set(PENDING_BOOKING_KEY, "42").unwrap();
        assert!(lenient.list_bookings().unwrap().is_empty());
        assert_eq!(lenient.get_pending_booking().unwrap(), None);

        // A lenient save over a corrupt blob starts a fresh collection.
        lenient.save_booking(booking("a", BookingStatus::Pending)).unwrap();
        assert_eq!(lenient.list_bookings().unwrap().len(), 1);

        let strict = BookingStore::strict(storage.clone());
        storage.set(BOOKINGS_KEY, "{not json").unwrap();
        match strict.list_bookings() {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, BOOKINGS_KEY),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_generated_ids_on_store() {
        let (_, store) = memory_store(StorePolicy::Lenient);
        assert_ne!(store.generate_booking_id(), store.generate_booking_id());
    }

    /// Memory storage whose next `get` reports a dropped connection.
    #[derive(Default)]
    struct DroppingReads {
        inner: MemoryStorage,
        drop_next_get: AtomicBool,
    }

    impl DroppingReads {
        fn arm(&self) {
            self.drop_next_get.store(true, Ordering::SeqCst);
        }
    }

    impl KeyValueStorage for DroppingReads {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.drop_next_get.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Unavailable("connection dropped".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn ids(store: &BookingStore) -> Vec<String> {
        store.list_bookings().unwrap().into_iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_dropped_read_does_not_overwrite_bookings() {
        let storage = Arc::new(DroppingReads::default());
        let store = BookingStore::lenient(storage.clone());
        store.save_booking(booking("a", BookingStatus::Pending)).unwrap();
        store.save_booking(booking("b", BookingStatus::Pending)).unwrap();

        storage.arm();
        store.save_booking(booking("c", BookingStatus::Pending)).unwrap();
        assert_eq!(ids(&store), ["a", "b"]);

        storage.arm();
        store.update_booking_status("a", BookingStatus::Cancelled).unwrap();
        storage.arm();
        store.delete_booking("b").unwrap();
        let bookings = store.list_bookings().unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].status, BookingStatus::Pending);

        store.save_booking(booking("c", BookingStatus::Pending)).unwrap();
        assert_eq!(ids(&store), ["a", "b", "c"]);
    }

    #[test]
    fn test_dropped_read_is_an_error_when_strict() {
        let storage = Arc::new(DroppingReads::default());
        let store = BookingStore::strict(storage.clone());
        store.save_booking(booking("a", BookingStatus::Pending)).unwrap();

        storage.arm();
        assert!(matches!(
            store.save_booking(booking("b", BookingStatus::Pending)),
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(ids(&store), ["a"]);
    }

    #[test]
    fn test_strict_unavailable_on_every_operation() {
        let store = BookingStore::strict(Arc::new(UnavailableStorage));
        let unavailable = |result: StoreResult<()>| matches!(result, Err(StoreError::Unavailable(_)));

        assert!(unavailable(store.save_booking(booking("a", BookingStatus::Pending))));
        assert!(unavailable(store.update_booking_status("a", BookingStatus::Confirmed)));
        assert!(unavailable(store.delete_booking("a")));
        assert!(unavailable(store.set_pending_booking(&draft())));
        assert!(unavailable(store.clear_pending_booking()));
        assert!(matches!(store.get_pending_booking(), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_strict_corrupt_pending_slot() {
        let (storage, store) = memory_store(StorePolicy::Strict);
        storage.set(PENDING_BOOKING_KEY, "{\"yacht\":").unwrap();

        match store.get_pending_booking() {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, PENDING_BOOKING_KEY),
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_corrupt_collection_is_left_alone() {
        let (storage, store) = memory_store(StorePolicy::Strict);
        storage.set(BOOKINGS_KEY, "[{broken").unwrap();

        assert!(matches!(
            store.save_booking(booking("a", BookingStatus::Pending)),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(
            store.update_booking_status("a", BookingStatus::Confirmed),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(store.delete_booking("a"), Err(StoreError::Corrupt { .. })));
        assert_eq!(storage.get(BOOKINGS_KEY).unwrap().as_deref(), Some("[{broken"));
    }
}
