pub mod availability;
pub mod grid;

pub use crate::domain::model::{Booking, Catalog, SlotAvailability};
pub use crate::domain::ports::BookingStore;
pub use crate::utils::error::Result;
pub use self::availability::{Admission, AvailabilityEngine, RejectReason, SlotListing};
pub use self::grid::SlotGrid;
