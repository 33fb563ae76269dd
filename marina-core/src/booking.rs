use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::yacht::Yacht;
use crate::{CoreError, CoreResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Crypto,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Card => f.write_str("card"),
            PaymentMethod::Crypto => f.write_str("crypto"),
        }
    }
}

/// Checkout draft. `total_price` and `days` are the caller's numbers; nothing
/// downstream recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    pub yacht: Yacht,
    pub start_date: String,
    pub end_date: String,
    pub guests: u32,
    pub total_price: u64,
    pub days: u32,
}

impl BookingData {
    /// Build a draft for `yacht` between two `YYYY-MM-DD` dates, pricing it
    /// at the nightly rate times the number of nights.
    pub fn quote(yacht: Yacht, start_date: &str, end_date: &str, guests: u32) -> CoreResult<Self> {
        let start = parse_date(start_date)?;
        let end = parse_date(end_date)?;

        let nights = (end - start).num_days();
        if nights <= 0 {
            return Err(CoreError::ValidationError(format!(
                "end date {} must be after start date {}",
                end_date, start_date
            )));
        }
        let days = u32::try_from(nights)
            .map_err(|_| CoreError::ValidationError(format!("stay of {} nights is too long", nights)))?;

        if !yacht.fits(guests) {
            return Err(CoreError::ValidationError(format!(
                "{} guests requested, {} allows 1 to {}",
                guests, yacht.name, yacht.guests
            )));
        }

        Ok(Self {
            total_price: yacht.nightly_total(days),
            yacht,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            guests,
            days,
        })
    }
}

fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| CoreError::ValidationError(format!("invalid date '{}': {}", value, e)))
}

/// A recorded reservation: the draft plus identity, payment and status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedBooking {
    #[serde(flatten)]
    pub booking: BookingData,
    pub id: String,
    pub payment_method: PaymentMethod,
    pub booking_date: String,
    pub status: BookingStatus,
}

impl SavedBooking {
    /// Promote a draft, stamping `booking_date` with the current UTC time.
    pub fn from_draft(
        booking: BookingData,
        id: String,
        payment_method: PaymentMethod,
        status: BookingStatus,
    ) -> Self {
        Self {
            booking,
            id,
            payment_method,
            booking_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status,
        }
    }
}
