use crate::utils::error::Result;
use crate::utils::validation::{
    self, Validate, validate_non_empty_string, validate_positive_number, validate_url,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "salon-slots")]
#[command(about = "Query bookable salon slots and check admissions")]
pub struct CliConfig {
    /// REST endpoint of the booking data store
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for the data store (or `${VAR}` in the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Optional TOML config file (store endpoint, opening hours)
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub branch: String,

    #[arg(long)]
    pub service: String,

    /// Calendar date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,

    /// Candidate slot time (HH:MM). When given, runs an admission check
    /// instead of listing slots.
    #[arg(long)]
    pub time: Option<String>,

    /// Party size for the admission check
    #[arg(long, default_value = "1")]
    pub party: u32,

    /// Actually submit the booking instead of only checking admission.
    /// Requires --time.
    #[arg(long, requires = "time")]
    pub book: bool,

    /// Opening bound of the slot grid (HH:MM), overrides the config file
    #[arg(long)]
    pub open: Option<String>,

    /// Closing bound of the slot grid (HH:MM), overrides the config file
    #[arg(long)]
    pub close: Option<String>,

    /// Run against a seeded in-memory store instead of the REST backend
    #[arg(long)]
    pub demo: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("branch", &self.branch)?;
        validate_non_empty_string("service", &self.service)?;
        validation::validate_date("date", &self.date)?;
        validate_positive_number("party", self.party, 1)?;

        if let Some(time) = &self.time {
            validation::validate_grid_time("time", time)?;
        }
        if let Some(open) = &self.open {
            validation::validate_grid_time("open", open)?;
        }
        if let Some(close) = &self.close {
            validation::validate_grid_time("close", close)?;
        }
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}
