use crate::utils::timefmt;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Service grouping that shares a capacity pool at a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Skin,
    Hair,
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCategory::Skin => write!(f, "skin"),
            ServiceCategory::Hair => write!(f, "hair"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub capacity_skin: u32,
    pub capacity_hair: u32,
}

impl Branch {
    /// Number of simultaneous stations for a category at this branch.
    pub fn capacity_for(&self, category: ServiceCategory) -> u32 {
        match category {
            ServiceCategory::Skin => self.capacity_skin,
            ServiceCategory::Hair => self.capacity_hair,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub category: ServiceCategory,
    /// Carried from the store but not consulted by the fixed-grid engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub branch_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "timefmt")]
    pub time: NaiveTime,
    #[serde(default = "default_people_count")]
    pub people_count: u32,
    pub status: BookingStatus,
}

fn default_people_count() -> u32 {
    1
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

/// A booking candidate: not persisted until admission succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub branch_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "timefmt")]
    pub time: NaiveTime,
    #[serde(default = "default_people_count")]
    pub people_count: u32,
}

/// Id-indexed snapshot of branches and services, built from store reads.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    branches: HashMap<String, Branch>,
    services: HashMap<String, Service>,
}

impl Catalog {
    pub fn new(branches: Vec<Branch>, services: Vec<Service>) -> Self {
        Self {
            branches: branches.into_iter().map(|b| (b.id.clone(), b)).collect(),
            services: services.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.get(id)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.get(id)
    }

    pub fn category_of(&self, service_id: &str) -> Option<ServiceCategory> {
        self.services.get(service_id).map(|s| s.category)
    }
}

/// One offerable slot with its remaining per-category capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    #[serde(with = "timefmt")]
    pub time: NaiveTime,
    pub remaining: u32,
}
