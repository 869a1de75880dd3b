use crate::domain::model::{Booking, BookingRequest, BookingStatus, Branch, Service};
use crate::domain::ports::BookingStore;
use crate::utils::error::{Result, SlotsError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory store: the test/demo stand-in for the hosted backend. Explicit
/// instance handed to the service, never a process-wide singleton.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    branches: Arc<Mutex<Vec<Branch>>>,
    services: Arc<Mutex<Vec<Service>>>,
    bookings: Arc<Mutex<Vec<Booking>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_branches(&self, branches: Vec<Branch>) {
        self.branches.lock().await.extend(branches);
    }

    pub async fn seed_services(&self, services: Vec<Service>) {
        self.services.lock().await.extend(services);
    }

    pub async fn seed_bookings(&self, bookings: Vec<Booking>) {
        self.bookings.lock().await.extend(bookings);
    }

    /// Every persisted booking, cancelled ones included. Test hook.
    pub async fn all_bookings(&self) -> Vec<Booking> {
        self.bookings.lock().await.clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.lock().await.clone())
    }

    async fn services(&self) -> Result<Vec<Service>> {
        Ok(self.services.lock().await.clone())
    }

    async fn bookings_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .iter()
            .filter(|b| b.branch_id == branch_id && b.date == date && !b.is_cancelled())
            .cloned()
            .collect())
    }

    async fn insert_booking(&self, request: BookingRequest) -> Result<Booking> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let booking = Booking {
            id: format!("mem-{}", id),
            branch_id: request.branch_id,
            service_id: request.service_id,
            date: request.date,
            time: request.time,
            people_count: request.people_count,
            status: BookingStatus::Pending,
        };
        self.bookings.lock().await.push(booking.clone());
        Ok(booking)
    }

    async fn cancel_booking(&self, booking_id: &str) -> Result<()> {
        let mut bookings = self.bookings.lock().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| SlotsError::StorePayloadError {
                message: format!("No booking with id {}", booking_id),
            })?;
        booking.status = BookingStatus::Cancelled;
        Ok(())
    }
}
