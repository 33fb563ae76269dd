use crate::client::ApiClient;
use crate::error::ApiResult;
use marina_core::{BookingStatus, SavedBooking, Yacht};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: BookingStatus,
}

impl ApiClient {
    pub async fn list_yachts(&self) -> ApiResult<Vec<Yacht>> {
        self.get("/yachts").await
    }

    pub async fn get_yacht(&self, id: u32) -> ApiResult<Yacht> {
        self.get(&format!("/yachts/{}", id)).await
    }

    pub async fn list_bookings(&self) -> ApiResult<Vec<SavedBooking>> {
        self.get("/bookings").await
    }

    /// Register a locally recorded booking with the server, returning the
    /// server's copy.
    pub async fn create_booking(&self, booking: &SavedBooking) -> ApiResult<SavedBooking> {
        self.post("/bookings", booking).await
    }

    pub async fn update_booking_status(&self, id: &str, status: BookingStatus) -> ApiResult<()> {
        self.patch(&format!("/bookings/{}", id), &StatusUpdate { status }).await
    }

    pub async fn cancel_booking(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/bookings/{}", id)).await
    }
}
