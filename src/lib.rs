pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SalonConfig;

pub use adapters::{InMemoryStore, RestStore};
pub use app::booking::{BookingService, SubmitOutcome};
pub use crate::core::{Admission, AvailabilityEngine, RejectReason, SlotGrid, SlotListing};
pub use utils::error::{Result, SlotsError};
