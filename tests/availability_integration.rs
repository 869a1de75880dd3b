use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use salon_slots::adapters::InMemoryStore;
use salon_slots::app::booking::{BookingService, SubmitOutcome};
use salon_slots::core::availability::{Admission, AvailabilityEngine, RejectReason};
use salon_slots::core::grid::SlotGrid;
use salon_slots::domain::model::{
    Booking, BookingRequest, BookingStatus, Branch, Service, ServiceCategory,
};
use salon_slots::domain::ports::BookingStore;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn far_past() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn engine() -> AvailabilityEngine {
    AvailabilityEngine::new(SlotGrid::new(t(11, 0), t(19, 0)).unwrap())
}

async fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed_branches(vec![Branch {
            id: "central".to_string(),
            capacity_skin: 2,
            capacity_hair: 0,
        }])
        .await;
    store
        .seed_services(vec![Service {
            id: "facial".to_string(),
            category: ServiceCategory::Skin,
            duration_minutes: Some(60),
        }])
        .await;
    store
}

fn request(time: NaiveTime, people: u32) -> BookingRequest {
    BookingRequest {
        branch_id: "central".to_string(),
        service_id: "facial".to_string(),
        date: date(),
        time,
        people_count: people,
    }
}

#[tokio::test]
async fn test_list_submit_relist_roundtrip() {
    let service = BookingService::new(seeded_store().await, engine());

    let before = service
        .offerable_slots("central", "facial", date(), far_past())
        .await
        .unwrap();
    let slot = before.slots.iter().find(|s| s.time == t(13, 0)).unwrap();
    assert_eq!(slot.remaining, 2);

    let outcome = service.submit(request(t(13, 0), 2)).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Booked(_)));

    let after = service
        .offerable_slots("central", "facial", date(), far_past())
        .await
        .unwrap();
    // Slot filled to capacity drops out of the listing entirely.
    assert!(after.slots.iter().all(|s| s.time != t(13, 0)));
    assert!(after.slots.iter().any(|s| s.time == t(13, 30)));
}

#[tokio::test]
async fn test_sequential_submissions_stop_at_capacity() {
    let service = BookingService::new(seeded_store().await, engine());

    for _ in 0..2 {
        let outcome = service.submit(request(t(14, 0), 1)).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Booked(_)));
    }

    let outcome = service.submit(request(t(14, 0), 1)).await.unwrap();
    let SubmitOutcome::Rejected(reason) = outcome else {
        panic!("third submission should be rejected");
    };
    assert_eq!(
        reason,
        RejectReason::Full {
            load: 2,
            capacity: 2,
            requested: 1
        }
    );
}

#[tokio::test]
async fn test_check_admission_does_not_write() {
    let service = BookingService::new(seeded_store().await, engine());

    let decision = service.check_admission(&request(t(15, 0), 1)).await.unwrap();
    assert!(decision.is_granted());

    let listing = service
        .offerable_slots("central", "facial", date(), far_past())
        .await
        .unwrap();
    let slot = listing.slots.iter().find(|s| s.time == t(15, 0)).unwrap();
    assert_eq!(slot.remaining, 2);
}

#[tokio::test]
async fn test_zero_capacity_category_rejected_end_to_end() {
    let store = seeded_store().await;
    store
        .seed_services(vec![Service {
            id: "haircut".to_string(),
            category: ServiceCategory::Hair,
            duration_minutes: None,
        }])
        .await;
    let service = BookingService::new(store, engine());

    let mut req = request(t(13, 0), 1);
    req.service_id = "haircut".to_string();
    let outcome = service.submit(req).await.unwrap();
    assert!(matches!(
        outcome,
        SubmitOutcome::Rejected(RejectReason::CategoryUnavailable)
    ));
}

#[tokio::test]
async fn test_overbooked_admin_view() {
    let store = seeded_store().await;
    store
        .seed_bookings(vec![
            Booking {
                id: "x1".to_string(),
                branch_id: "central".to_string(),
                service_id: "facial".to_string(),
                date: date(),
                time: t(13, 0),
                people_count: 2,
                status: BookingStatus::Confirmed,
            },
            Booking {
                id: "x2".to_string(),
                branch_id: "central".to_string(),
                service_id: "facial".to_string(),
                date: date(),
                time: t(13, 0),
                people_count: 1,
                status: BookingStatus::Pending,
            },
        ])
        .await;
    let service = BookingService::new(store, engine());

    let over = service.overbooked("central", date()).await.unwrap();
    assert_eq!(over.len(), 1);
    assert_eq!(over[0].time, t(13, 0));
    assert_eq!(over[0].load, 3);
    assert_eq!(over[0].capacity, 2);
}

/// Store wrapper that injects a rival booking during our own insert: the
/// check-then-act race made deterministic.
struct RacingStore {
    inner: InMemoryStore,
    rival: tokio::sync::Mutex<Option<BookingRequest>>,
}

#[async_trait]
impl BookingStore for RacingStore {
    async fn branches(&self) -> salon_slots::Result<Vec<Branch>> {
        self.inner.branches().await
    }

    async fn services(&self) -> salon_slots::Result<Vec<Service>> {
        self.inner.services().await
    }

    async fn bookings_on(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> salon_slots::Result<Vec<Booking>> {
        self.inner.bookings_on(branch_id, date).await
    }

    async fn insert_booking(&self, req: BookingRequest) -> salon_slots::Result<Booking> {
        if let Some(rival) = self.rival.lock().await.take() {
            self.inner.insert_booking(rival).await?;
        }
        self.inner.insert_booking(req).await
    }

    async fn cancel_booking(&self, booking_id: &str) -> salon_slots::Result<()> {
        self.inner.cancel_booking(booking_id).await
    }
}

#[tokio::test]
async fn test_lost_race_is_compensated() {
    let inner = seeded_store().await;
    // One seat taken; both we and the rival want the last one.
    inner
        .seed_bookings(vec![Booking {
            id: "seed".to_string(),
            branch_id: "central".to_string(),
            service_id: "facial".to_string(),
            date: date(),
            time: t(13, 0),
            people_count: 1,
            status: BookingStatus::Confirmed,
        }])
        .await;
    let store = RacingStore {
        inner: inner.clone(),
        rival: tokio::sync::Mutex::new(Some(request(t(13, 0), 1))),
    };
    let service = BookingService::new(store, engine());

    let outcome = service.submit(request(t(13, 0), 1)).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::RaceLost));

    // Our row was compensated away; the slot holds exactly capacity again.
    let remaining: Vec<Booking> = inner.bookings_on("central", date()).await.unwrap();
    let load: u32 = remaining
        .iter()
        .filter(|b| b.time == t(13, 0))
        .map(|b| b.people_count)
        .sum();
    assert_eq!(load, 2);

    let cancelled = inner
        .all_bookings()
        .await
        .iter()
        .filter(|b| b.status == BookingStatus::Cancelled)
        .count();
    assert_eq!(cancelled, 1);
}

#[tokio::test]
async fn test_today_filter_end_to_end() {
    let service = BookingService::new(seeded_store().await, engine());
    let now = date().and_hms_opt(14, 5, 0).unwrap();

    let listing = service
        .offerable_slots("central", "facial", date(), now)
        .await
        .unwrap();
    assert!(listing.slots.iter().all(|s| s.time > t(14, 0)));
    assert!(listing.slots.iter().any(|s| s.time == t(14, 30)));
}

#[tokio::test]
async fn test_unknown_branch_surfaces_reason() {
    let service = BookingService::new(seeded_store().await, engine());

    let listing = service
        .offerable_slots("nowhere", "facial", date(), far_past())
        .await
        .unwrap();
    assert!(listing.slots.is_empty());
    assert!(listing.reason.is_some());

    let mut req = request(t(13, 0), 1);
    req.branch_id = "nowhere".to_string();
    let decision = service.check_admission(&req).await.unwrap();
    assert_eq!(decision, Admission::Rejected(RejectReason::UnknownBranch));
}
