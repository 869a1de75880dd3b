use crate::domain::model::{
    Booking, BookingRequest, BookingStatus, Branch, Service, ServiceCategory,
};
use crate::domain::ports::BookingStore;
use crate::utils::error::{Result, SlotsError};
use crate::utils::timefmt;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

/// `BookingStore` backed by the hosted Postgres REST gateway. Queries use
/// PostgREST-style filter parameters (`?branch_id=eq.X`). Rows come back
/// duck-typed depending on join shape, so everything funnels through the
/// normalizers below before the strict domain types are produced.
pub struct RestStore {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path_and_query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path_and_query);
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }
        builder
    }

    async fn fetch_rows(&self, path_and_query: &str) -> Result<Vec<Value>> {
        tracing::debug!("GET {}/{}", self.base_url, path_and_query);
        let response = self
            .request(reqwest::Method::GET, path_and_query)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        match payload {
            Value::Array(rows) => Ok(rows),
            // Single-object responses get wrapped, matching how the gateway
            // answers point queries.
            other @ Value::Object(_) => Ok(vec![other]),
            other => Err(SlotsError::StorePayloadError {
                message: format!("expected rows, got: {}", other),
            }),
        }
    }
}

#[async_trait]
impl BookingStore for RestStore {
    async fn branches(&self) -> Result<Vec<Branch>> {
        let rows = self.fetch_rows("branches?select=*").await?;
        Ok(normalize_rows(rows, branch_from_row, "branch"))
    }

    async fn services(&self) -> Result<Vec<Service>> {
        let rows = self.fetch_rows("services?select=*").await?;
        Ok(normalize_rows(rows, service_from_row, "service"))
    }

    async fn bookings_on(&self, branch_id: &str, date: NaiveDate) -> Result<Vec<Booking>> {
        let query = format!(
            "bookings?branch_id=eq.{}&date=eq.{}&status=neq.cancelled",
            branch_id, date
        );
        let rows = self.fetch_rows(&query).await?;
        Ok(normalize_rows(rows, booking_from_row, "booking"))
    }

    async fn insert_booking(&self, request: BookingRequest) -> Result<Booking> {
        let body = serde_json::json!({
            "branch_id": request.branch_id,
            "service_id": request.service_id,
            "date": request.date.to_string(),
            "time": timefmt::format_time(request.time),
            "people_count": request.people_count,
            "status": "pending",
        });

        let response = self
            .request(reqwest::Method::POST, "bookings")
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        let row = match &payload {
            Value::Array(rows) => rows.first().cloned(),
            Value::Object(_) => Some(payload.clone()),
            _ => None,
        };
        row.as_ref()
            .and_then(booking_from_row)
            .ok_or_else(|| SlotsError::StorePayloadError {
                message: format!("insert did not return a booking row: {}", payload),
            })
    }

    async fn cancel_booking(&self, booking_id: &str) -> Result<()> {
        let query = format!("bookings?id=eq.{}", booking_id);
        self.request(reqwest::Method::PATCH, &query)
            .json(&serde_json::json!({ "status": "cancelled" }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn normalize_rows<T>(
    rows: Vec<Value>,
    normalize: impl Fn(&Value) -> Option<T>,
    kind: &str,
) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        match normalize(row) {
            Some(item) => out.push(item),
            None => tracing::warn!("Skipping malformed {} row: {}", kind, row),
        }
    }
    out
}

/// Reads a field that may arrive as a string or a number, under either the
/// snake_case column name or its camelCase alias.
fn id_field(row: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match row.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn u32_field(row: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(n) = row.get(key).and_then(Value::as_u64) {
            return u32::try_from(n).ok();
        }
    }
    None
}

/// A foreign key may be a plain id, an embedded row, or a one-element array
/// of embedded rows, depending on whether the query joined the relation.
fn relation_id(row: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let value = match row.get(key) {
            Some(v) => v,
            None => continue,
        };
        let flattened = match value {
            Value::Array(items) => match items.first() {
                Some(first) => first,
                None => continue,
            },
            other => other,
        };
        match flattened {
            Value::String(s) if !s.is_empty() => return Some(s.clone()),
            Value::Number(n) => return Some(n.to_string()),
            Value::Object(_) => {
                if let Some(id) = id_field(flattened, &["id"]) {
                    return Some(id);
                }
            }
            _ => {}
        }
    }
    None
}

fn branch_from_row(row: &Value) -> Option<Branch> {
    Some(Branch {
        id: id_field(row, &["id"])?,
        capacity_skin: u32_field(row, &["capacity_skin", "capacitySkin"]).unwrap_or(0),
        capacity_hair: u32_field(row, &["capacity_hair", "capacityHair"]).unwrap_or(0),
    })
}

fn service_from_row(row: &Value) -> Option<Service> {
    let category = match row.get("category").and_then(Value::as_str)? {
        "skin" => ServiceCategory::Skin,
        "hair" => ServiceCategory::Hair,
        _ => return None,
    };
    Some(Service {
        id: id_field(row, &["id"])?,
        category,
        duration_minutes: u32_field(row, &["duration_minutes", "durationMinutes"]),
    })
}

fn booking_from_row(row: &Value) -> Option<Booking> {
    let date = row.get("date").and_then(Value::as_str)?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = row.get("time").and_then(Value::as_str)?;
    let time = timefmt::parse_time(time).ok()?;
    let status = match row.get("status").and_then(Value::as_str) {
        Some("confirmed") => BookingStatus::Confirmed,
        Some("cancelled") => BookingStatus::Cancelled,
        // New rows start pending; a missing status reads the same way.
        _ => BookingStatus::Pending,
    };

    Some(Booking {
        id: id_field(row, &["id"])?,
        branch_id: relation_id(row, &["branch_id", "branchId", "branch", "branches"])?,
        service_id: relation_id(row, &["service_id", "serviceId", "service", "services"])?,
        date,
        time,
        people_count: u32_field(row, &["people_count", "peopleCount"]).unwrap_or(1),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_branch_row_with_camel_case_and_numeric_id() {
        let row = serde_json::json!({
            "id": 7,
            "capacitySkin": 2,
            "capacityHair": 0
        });
        let branch = branch_from_row(&row).unwrap();
        assert_eq!(branch.id, "7");
        assert_eq!(branch.capacity_skin, 2);
        assert_eq!(branch.capacity_hair, 0);
    }

    #[test]
    fn test_service_row_rejects_unknown_category() {
        let row = serde_json::json!({"id": "sv1", "category": "nails"});
        assert!(service_from_row(&row).is_none());

        let row = serde_json::json!({"id": "sv1", "category": "hair", "duration_minutes": 45});
        let service = service_from_row(&row).unwrap();
        assert_eq!(service.category, ServiceCategory::Hair);
        assert_eq!(service.duration_minutes, Some(45));
    }

    #[test]
    fn test_booking_row_plain_foreign_keys() {
        let row = serde_json::json!({
            "id": "b1",
            "branch_id": "br1",
            "service_id": "sv1",
            "date": "2026-09-01",
            "time": "13:00:00",
            "people_count": 2,
            "status": "confirmed"
        });
        let booking = booking_from_row(&row).unwrap();
        assert_eq!(booking.branch_id, "br1");
        assert_eq!(booking.time, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        assert_eq!(booking.people_count, 2);
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_booking_row_joined_relation_shapes() {
        // Embedded object on one side, one-element array on the other: the
        // two join shapes the gateway produces.
        let row = serde_json::json!({
            "id": "b2",
            "branch": {"id": "br1", "capacity_skin": 2},
            "services": [{"id": "sv1", "category": "skin"}],
            "date": "2026-09-01",
            "time": "14:30"
        });
        let booking = booking_from_row(&row).unwrap();
        assert_eq!(booking.branch_id, "br1");
        assert_eq!(booking.service_id, "sv1");
        assert_eq!(booking.people_count, 1); // defaulted
        assert_eq!(booking.status, BookingStatus::Pending); // defaulted
    }

    #[test]
    fn test_malformed_booking_rows_are_skipped() {
        let rows = vec![
            serde_json::json!({"id": "ok", "branch_id": "br1", "service_id": "sv1",
                "date": "2026-09-01", "time": "13:00", "status": "pending"}),
            serde_json::json!({"id": "bad-date", "branch_id": "br1", "service_id": "sv1",
                "date": "tomorrow", "time": "13:00"}),
            serde_json::json!({"id": "no-time", "branch_id": "br1", "service_id": "sv1",
                "date": "2026-09-01"}),
            serde_json::json!({"branch_id": "br1"}),
        ];
        let bookings = normalize_rows(rows, booking_from_row, "booking");
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, "ok");
    }
}
