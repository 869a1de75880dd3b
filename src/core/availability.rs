use crate::core::grid::SlotGrid;
use crate::domain::model::{Booking, Catalog, ServiceCategory, SlotAvailability};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

/// Why a slot listing came back empty before any load was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoAvailability {
    UnknownBranch,
    UnknownService,
    /// The branch has zero capacity for the service's category.
    CategoryUnavailable,
}

impl fmt::Display for NoAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoAvailability::UnknownBranch => write!(f, "unknown branch"),
            NoAvailability::UnknownService => write!(f, "unknown service"),
            NoAvailability::CategoryUnavailable => {
                write!(f, "category unavailable at this branch")
            }
        }
    }
}

/// Result of `list_offerable_slots`. An empty `slots` with `reason = None`
/// simply means every slot is full or filtered out; a tagged reason means the
/// request could not resolve to a bookable category at all.
#[derive(Debug, Clone, Serialize)]
pub struct SlotListing {
    pub slots: Vec<SlotAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoAvailability>,
}

impl SlotListing {
    fn empty(reason: NoAvailability) -> Self {
        Self {
            slots: Vec::new(),
            reason: Some(reason),
        }
    }
}

/// Structured rejection for `can_admit`. These are expected business
/// outcomes, not errors, and carry the numbers the UI shows the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectReason {
    UnknownBranch,
    UnknownService,
    CategoryUnavailable,
    /// The requested time is not on the configured slot grid.
    OffGrid,
    Full {
        load: u32,
        capacity: u32,
        requested: u32,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnknownBranch => write!(f, "unknown branch"),
            RejectReason::UnknownService => write!(f, "unknown service"),
            RejectReason::CategoryUnavailable => {
                write!(f, "category unavailable at this branch")
            }
            RejectReason::OffGrid => write!(f, "time is not a bookable slot"),
            RejectReason::Full {
                load,
                capacity,
                requested,
            } => write!(
                f,
                "slot is full: current load {}/{}, adding {} would make {}/{}",
                load,
                capacity,
                requested,
                load + requested,
                capacity
            ),
        }
    }
}

/// Admission decision for one candidate slot and party size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted { load: u32, capacity: u32 },
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_granted(&self) -> bool {
        matches!(self, Admission::Granted { .. })
    }
}

/// A slot whose load already exceeds capacity: input for the admin
/// reconciliation view that resolves lost check-then-act races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverbookedSlot {
    #[serde(with = "crate::utils::timefmt")]
    pub time: NaiveTime,
    pub category: ServiceCategory,
    pub load: u32,
    pub capacity: u32,
}

/// The availability engine: pure arithmetic over a bookings snapshot. Holds
/// only the configured grid, so it is safe to share across request handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityEngine {
    grid: SlotGrid,
}

impl AvailabilityEngine {
    pub fn new(grid: SlotGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Lists the slots still offerable for one branch/service/date, ascending
    /// by time. `bookings` is the caller-fetched snapshot for that branch and
    /// date (any category; filtering happens here). `now` only matters when
    /// `date` is today: slots not strictly after it are dropped.
    pub fn list_offerable_slots(
        &self,
        catalog: &Catalog,
        branch_id: &str,
        service_id: &str,
        date: NaiveDate,
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> SlotListing {
        let Some(branch) = catalog.branch(branch_id) else {
            return SlotListing::empty(NoAvailability::UnknownBranch);
        };
        let Some(category) = catalog.category_of(service_id) else {
            return SlotListing::empty(NoAvailability::UnknownService);
        };

        let capacity = branch.capacity_for(category);
        if capacity == 0 {
            return SlotListing::empty(NoAvailability::CategoryUnavailable);
        }

        let today = date == now.date();
        let slots = self
            .grid
            .slots()
            .into_iter()
            .filter(|&time| !today || time > now.time())
            .filter_map(|time| {
                let load = slot_load(catalog, category, time, bookings);
                let remaining = capacity.saturating_sub(load);
                (remaining > 0).then_some(SlotAvailability { time, remaining })
            })
            .collect();

        SlotListing {
            slots,
            reason: None,
        }
    }

    /// The authoritative final guard: may a party of `party_size` join the
    /// slot at `time` without exceeding category capacity? Must be re-run
    /// against a fresh snapshot at submission time, because bookings can land
    /// between listing and submit.
    pub fn can_admit(
        &self,
        catalog: &Catalog,
        branch_id: &str,
        service_id: &str,
        time: NaiveTime,
        party_size: u32,
        bookings: &[Booking],
    ) -> Admission {
        let Some(branch) = catalog.branch(branch_id) else {
            return Admission::Rejected(RejectReason::UnknownBranch);
        };
        let Some(category) = catalog.category_of(service_id) else {
            return Admission::Rejected(RejectReason::UnknownService);
        };

        let capacity = branch.capacity_for(category);
        if capacity == 0 {
            return Admission::Rejected(RejectReason::CategoryUnavailable);
        }
        if !self.grid.contains(time) {
            return Admission::Rejected(RejectReason::OffGrid);
        }

        let load = slot_load(catalog, category, time, bookings);
        if load + party_size <= capacity {
            Admission::Granted { load, capacity }
        } else {
            Admission::Rejected(RejectReason::Full {
                load,
                capacity,
                requested: party_size,
            })
        }
    }

    /// Slots where load already exceeds capacity in either category.
    pub fn overbooked_slots(
        &self,
        catalog: &Catalog,
        branch_id: &str,
        bookings: &[Booking],
    ) -> Vec<OverbookedSlot> {
        let Some(branch) = catalog.branch(branch_id) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for time in self.grid.slots() {
            for category in [ServiceCategory::Skin, ServiceCategory::Hair] {
                let capacity = branch.capacity_for(category);
                let load = slot_load(catalog, category, time, bookings);
                if load > capacity {
                    out.push(OverbookedSlot {
                        time,
                        category,
                        load,
                        capacity,
                    });
                }
            }
        }
        out
    }
}

/// Sum of `people_count` over same-category, same-time, non-cancelled
/// bookings. Bookings whose service id no longer resolves are skipped.
fn slot_load(
    catalog: &Catalog,
    category: ServiceCategory,
    time: NaiveTime,
    bookings: &[Booking],
) -> u32 {
    bookings
        .iter()
        .filter(|b| !b.is_cancelled())
        .filter(|b| b.time == time)
        .filter(|b| catalog.category_of(&b.service_id) == Some(category))
        .map(|b| b.people_count)
        .sum()
}
