use crate::core::availability::{Admission, AvailabilityEngine, OverbookedSlot, RejectReason, SlotListing};
use crate::domain::model::{Booking, BookingRequest, Catalog};
use crate::domain::ports::BookingStore;
use crate::utils::error::Result;
use chrono::{NaiveDate, NaiveDateTime};

/// What came out of a submission attempt. `RaceLost` means the final guard
/// passed but a concurrent booking filled the slot before ours landed; the
/// UI shows it as "slot just filled, please pick another".
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Booked(Booking),
    Rejected(RejectReason),
    RaceLost,
}

/// Orchestrates the store and the availability engine. The engine never does
/// I/O itself; this service owns the fetch-snapshot-then-decide sequence.
pub struct BookingService<S: BookingStore> {
    store: S,
    engine: AvailabilityEngine,
}

impl<S: BookingStore> BookingService<S> {
    pub fn new(store: S, engine: AvailabilityEngine) -> Self {
        Self { store, engine }
    }

    pub fn engine(&self) -> &AvailabilityEngine {
        &self.engine
    }

    async fn snapshot(&self, branch_id: &str, date: NaiveDate) -> Result<(Catalog, Vec<Booking>)> {
        let branches = self.store.branches().await?;
        let services = self.store.services().await?;
        let bookings = self.store.bookings_on(branch_id, date).await?;
        tracing::debug!(
            "Snapshot for {} on {}: {} branches, {} services, {} bookings",
            branch_id,
            date,
            branches.len(),
            services.len(),
            bookings.len()
        );
        Ok((Catalog::new(branches, services), bookings))
    }

    /// Fetches a fresh snapshot and lists the offerable slots.
    pub async fn offerable_slots(
        &self,
        branch_id: &str,
        service_id: &str,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<SlotListing> {
        let (catalog, bookings) = self.snapshot(branch_id, date).await?;
        Ok(self
            .engine
            .list_offerable_slots(&catalog, branch_id, service_id, date, &bookings, now))
    }

    /// Check-only admission: fetches a fresh snapshot and runs the final
    /// guard without inserting anything.
    pub async fn check_admission(&self, request: &BookingRequest) -> Result<Admission> {
        let (catalog, bookings) = self.snapshot(&request.branch_id, request.date).await?;
        Ok(self.engine.can_admit(
            &catalog,
            &request.branch_id,
            &request.service_id,
            request.time,
            request.people_count,
            &bookings,
        ))
    }

    /// Submits a booking request: re-runs the final guard against a fresh
    /// snapshot, inserts on admit, then re-checks the slot once more. The
    /// check-then-act window is not atomic against the external store, so a
    /// concurrent insert can still slip in; when the post-insert re-check
    /// finds the slot over capacity, we cancel our own row and report the
    /// race as lost rather than leave the slot overbooked.
    pub async fn submit(&self, request: BookingRequest) -> Result<SubmitOutcome> {
        let (catalog, bookings) = self.snapshot(&request.branch_id, request.date).await?;

        let decision = self.engine.can_admit(
            &catalog,
            &request.branch_id,
            &request.service_id,
            request.time,
            request.people_count,
            &bookings,
        );
        let (load, capacity) = match decision {
            Admission::Granted { load, capacity } => (load, capacity),
            Admission::Rejected(reason) => {
                tracing::info!("Booking rejected: {}", reason);
                return Ok(SubmitOutcome::Rejected(reason));
            }
        };
        tracing::debug!(
            "Admitting party of {} at {} (load {}/{})",
            request.people_count,
            request.time,
            load,
            capacity
        );

        let booking = self.store.insert_booking(request.clone()).await?;

        // Post-insert re-check against a fresh snapshot.
        let (catalog, bookings) = self.snapshot(&request.branch_id, request.date).await?;
        let category = catalog.category_of(&request.service_id);
        let lost = self
            .engine
            .overbooked_slots(&catalog, &request.branch_id, &bookings)
            .iter()
            .any(|slot| slot.time == request.time && Some(slot.category) == category);

        if lost {
            tracing::warn!(
                "Slot {} on {} filled concurrently, cancelling booking {}",
                request.time,
                request.date,
                booking.id
            );
            self.store.cancel_booking(&booking.id).await?;
            return Ok(SubmitOutcome::RaceLost);
        }

        tracing::info!("Booking {} confirmed for {}", booking.id, request.date);
        Ok(SubmitOutcome::Booked(booking))
    }

    /// Admin reconciliation view: slots whose load already exceeds capacity.
    pub async fn overbooked(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<OverbookedSlot>> {
        let (catalog, bookings) = self.snapshot(branch_id, date).await?;
        Ok(self.engine.overbooked_slots(&catalog, branch_id, &bookings))
    }
}
