use crate::core::grid::SlotGrid;
use crate::utils::error::{Result, SlotsError};
use crate::utils::validation::{self, Validate};
use serde::Deserialize;
use std::path::Path;

/// Salon configuration loaded from TOML: where the data store lives and
/// which slot-grid bounds the branch operates. Bounds are configuration, not
/// entity state; presets in the wild range from 10:00-21:00 to 11:00-19:00.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalonConfig {
    pub store: Option<StoreConfig>,
    pub hours: Option<HoursConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoursConfig {
    pub open: String,
    pub close: String,
}

impl SalonConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SlotsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SlotsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values, leaving
    /// unresolved placeholders in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(store) = &self.store {
            validation::validate_url("store.endpoint", &store.endpoint)?;
        }
        if self.hours.is_some() {
            self.grid()?;
        }
        Ok(())
    }

    /// Builds the slot grid from `[hours]`, or the default bounds when the
    /// section is absent.
    pub fn grid(&self) -> Result<SlotGrid> {
        let Some(hours) = &self.hours else {
            return Ok(SlotGrid::default());
        };

        let open = validation::validate_grid_time("hours.open", &hours.open)?;
        let close = validation::validate_grid_time("hours.close", &hours.close)?;
        SlotGrid::new(open, close).ok_or_else(|| SlotsError::ConfigValidationError {
            field: "hours".to_string(),
            message: format!(
                "Opening hours {}..{} do not form a valid slot grid",
                hours.open, hours.close
            ),
        })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.store.as_ref().map(|s| s.endpoint.as_str())
    }

    pub fn api_key(&self) -> Option<String> {
        self.store.as_ref().and_then(|s| s.api_key.clone())
    }
}

impl Validate for SalonConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
