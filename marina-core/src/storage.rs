/// Collection of recorded bookings, one JSON array blob.
pub const BOOKINGS_KEY: &str = "bookings";

/// Single staged checkout draft.
pub const PENDING_BOOKING_KEY: &str = "pendingBooking";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// String key-value storage the booking side persists into.
///
/// Implementations are expected to be single-writer: there is no
/// compare-and-swap, so two writers racing on one key lose one update.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
