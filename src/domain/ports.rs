use crate::domain::model::{Booking, BookingRequest, Branch, Service};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository boundary for the booking data store. Injected into the booking
/// service; production uses the REST adapter, tests use the in-memory store.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn branches(&self) -> Result<Vec<Branch>>;

    async fn services(&self) -> Result<Vec<Service>>;

    /// Non-cancelled bookings for one branch and date, all categories.
    async fn bookings_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Booking>>;

    async fn insert_booking(&self, request: BookingRequest) -> Result<Booking>;

    /// Marks a booking cancelled. Also the compensation path when a submit
    /// loses the check-then-act race.
    async fn cancel_booking(&self, booking_id: &str) -> Result<()>;
}
