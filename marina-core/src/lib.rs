pub mod booking;
pub mod identity;
pub mod storage;
pub mod yacht;

pub use booking::{BookingData, BookingStatus, PaymentMethod, SavedBooking};
pub use identity::generate_booking_id;
pub use storage::{KeyValueStorage, StorageError, BOOKINGS_KEY, PENDING_BOOKING_KEY};
pub use yacht::Yacht;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
