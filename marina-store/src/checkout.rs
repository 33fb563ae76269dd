use crate::booking_store::{BookingStore, StoreError};
use marina_core::{BookingData, BookingStatus, PaymentMethod, SavedBooking};
use tracing::{info, warn};

/// What the payment provider reported back for the staged booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { method: PaymentMethod },
    Failed { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("No booking is pending checkout")]
    NothingPending,

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Moves a draft through staging, payment and promotion to a saved booking.
pub struct Checkout<'a> {
    store: &'a BookingStore,
}

impl<'a> Checkout<'a> {
    pub fn new(store: &'a BookingStore) -> Self {
        Self { store }
    }

    /// Stage the draft as the pending booking
    pub fn begin(&self, draft: &BookingData) -> Result<(), CheckoutError> {
        self.store.set_pending_booking(draft)?;
        info!(
            "Checkout started for yacht {} ({} nights, total {})",
            draft.yacht.id, draft.days, draft.total_price
        );
        Ok(())
    }

    /// Settle the checkout with the provider's answer. A failed payment keeps
    /// the draft staged so the customer can retry.
    pub fn complete(&self, outcome: PaymentOutcome) -> Result<SavedBooking, CheckoutError> {
        match outcome {
            PaymentOutcome::Succeeded { method } => self.promote(method, BookingStatus::Confirmed),
            PaymentOutcome::Failed { reason } => {
                warn!("Payment failed, pending booking kept: {}", reason);
                Err(CheckoutError::PaymentFailed(reason))
            }
        }
    }

    /// Reserve without settling; the booking is recorded as pending.
    pub fn pay_later(&self, method: PaymentMethod) -> Result<SavedBooking, CheckoutError> {
        self.promote(method, BookingStatus::Pending)
    }

    pub fn abandon(&self) -> Result<(), CheckoutError> {
        self.store.clear_pending_booking()?;
        info!("Checkout abandoned");
        Ok(())
    }

    fn promote(&self, method: PaymentMethod, status: BookingStatus) -> Result<SavedBooking, CheckoutError> {
        let draft = self
            .store
            .get_pending_booking()?
            .ok_or(CheckoutError::NothingPending)?;

        let booking = SavedBooking::from_draft(draft, self.store.generate_booking_id(), method, status);
        self.store.save_booking(booking.clone())?;
        self.store.clear_pending_booking()?;

        info!("Booking {} recorded as {} via {}", booking.id, status, method);
        Ok(booking)
    }
}
