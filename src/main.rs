use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use salon_slots::adapters::{InMemoryStore, RestStore};
use salon_slots::app::booking::{BookingService, SubmitOutcome};
use salon_slots::core::availability::{Admission, AvailabilityEngine};
use salon_slots::core::grid::SlotGrid;
use salon_slots::domain::model::{
    Booking, BookingRequest, BookingStatus, Branch, Service, ServiceCategory,
};
use salon_slots::domain::ports::BookingStore;
use salon_slots::utils::{logger, timefmt, validation, validation::Validate};
use salon_slots::{CliConfig, SalonConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting salon-slots CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let salon = match &config.config {
        Some(path) => {
            let salon = SalonConfig::from_file(path)?;
            salon.validate()?;
            salon
        }
        None => SalonConfig::default(),
    };

    let grid = build_grid(&config, &salon)?;
    let engine = AvailabilityEngine::new(grid);

    let date = validation::validate_date("date", &config.date)?;
    let now = chrono::Local::now().naive_local();

    let outcome = if config.demo {
        let store = seeded_demo_store(date).await;
        run(BookingService::new(store, engine), &config, date, now).await
    } else {
        let endpoint = config
            .endpoint
            .clone()
            .or_else(|| salon.endpoint().map(str::to_string));
        let Some(endpoint) = endpoint else {
            eprintln!("❌ No store endpoint configured (use --endpoint, --config or --demo)");
            std::process::exit(1);
        };
        let api_key = config.api_key.clone().or_else(|| salon.api_key());
        let store = RestStore::new(endpoint, api_key);
        run(BookingService::new(store, engine), &config, date, now).await
    };

    if let Err(e) = outcome {
        tracing::error!("❌ Request failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    Ok(())
}

fn build_grid(config: &CliConfig, salon: &SalonConfig) -> salon_slots::Result<SlotGrid> {
    let base = salon.grid()?;
    let open = match &config.open {
        Some(s) => validation::validate_grid_time("open", s)?,
        None => base.open(),
    };
    let close = match &config.close {
        Some(s) => validation::validate_grid_time("close", s)?,
        None => base.close(),
    };
    SlotGrid::new(open, close).ok_or_else(|| {
        salon_slots::SlotsError::ConfigValidationError {
            field: "open/close".to_string(),
            message: format!(
                "Bounds {}..{} do not form a valid slot grid",
                timefmt::format_time(open),
                timefmt::format_time(close)
            ),
        }
    })
}

async fn run<S: BookingStore>(
    service: BookingService<S>,
    config: &CliConfig,
    date: NaiveDate,
    now: NaiveDateTime,
) -> salon_slots::Result<()> {
    match &config.time {
        None => {
            let listing = service
                .offerable_slots(&config.branch, &config.service, date, now)
                .await?;

            if let Some(reason) = listing.reason {
                println!("ℹ️  No availability: {}", reason);
                return Ok(());
            }
            if listing.slots.is_empty() {
                println!("ℹ️  No availability for {} on {}", config.service, date);
                return Ok(());
            }

            println!("Offerable slots for {} on {}:", config.service, date);
            for slot in &listing.slots {
                println!("  {}  ({} remaining)", timefmt::format_time(slot.time), slot.remaining);
            }
        }
        Some(time) => {
            let time = validation::validate_grid_time("time", time)?;
            let request = BookingRequest {
                branch_id: config.branch.clone(),
                service_id: config.service.clone(),
                date,
                time,
                people_count: config.party,
            };

            if config.book {
                match service.submit(request).await? {
                    SubmitOutcome::Booked(booking) => {
                        println!("✅ Booked! Reference: {}", booking.id);
                    }
                    SubmitOutcome::Rejected(reason) => {
                        println!("❌ Not bookable: {}", reason);
                    }
                    SubmitOutcome::RaceLost => {
                        println!("❌ Slot just filled, please pick another time");
                    }
                }
            } else {
                match service.check_admission(&request).await? {
                    Admission::Granted { load, capacity } => {
                        println!(
                            "✅ Party of {} fits at {} (current load {}/{})",
                            config.party,
                            timefmt::format_time(time),
                            load,
                            capacity
                        );
                    }
                    Admission::Rejected(reason) => {
                        println!("❌ Not bookable: {}", reason);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Seeds the in-memory store with a small fixture so `--demo` output shows
/// both free and contended slots.
async fn seeded_demo_store(date: NaiveDate) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed_branches(vec![
            Branch {
                id: "central".to_string(),
                capacity_skin: 2,
                capacity_hair: 3,
            },
            Branch {
                id: "annex".to_string(),
                capacity_skin: 1,
                capacity_hair: 0,
            },
        ])
        .await;
    store
        .seed_services(vec![
            Service {
                id: "facial".to_string(),
                category: ServiceCategory::Skin,
                duration_minutes: Some(60),
            },
            Service {
                id: "haircut".to_string(),
                category: ServiceCategory::Hair,
                duration_minutes: Some(30),
            },
        ])
        .await;
    store
        .seed_bookings(vec![Booking {
            id: "demo-1".to_string(),
            branch_id: "central".to_string(),
            service_id: "facial".to_string(),
            date,
            time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            people_count: 1,
            status: BookingStatus::Confirmed,
        }])
        .await;
    store
}
