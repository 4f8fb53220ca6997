//! Validated request configuration for the analytics engines.
//!
//! CLI flags are mapped into these structs in `app`; nothing reaches the
//! engines without passing `validate`.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{CategoryId, StoreId, Window};

pub const DEFAULT_DASHBOARD_DAYS: u32 = 30;
pub const DEFAULT_FORECAST_LOOKBACK_DAYS: u32 = 90;
pub const DEFAULT_FORECAST_HORIZON_DAYS: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("lookback_days must be a positive number of days")]
    NonPositiveLookback,

    #[error("horizon_days must be a positive number of days")]
    NonPositiveHorizon,
}

/// Filter set for one dashboard request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub lookback_days: u32,
    pub store_filter: Option<StoreId>,
    pub category_filter: Option<CategoryId>,
}

impl DashboardConfig {
    pub fn new(
        lookback_days: u32,
        store_filter: Option<StoreId>,
        category_filter: Option<CategoryId>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            lookback_days,
            store_filter,
            category_filter,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 {
            return Err(ConfigError::NonPositiveLookback);
        }
        Ok(())
    }

    pub fn window(&self, today: NaiveDate) -> Window {
        Window::lookback(today, self.lookback_days)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_DASHBOARD_DAYS,
            store_filter: None,
            category_filter: None,
        }
    }
}

/// Lookback and horizon for a single-product forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastConfig {
    pub lookback_days: u32,
    pub horizon_days: u32,
}

impl ForecastConfig {
    pub fn new(lookback_days: u32, horizon_days: u32) -> Result<Self, ConfigError> {
        let config = Self {
            lookback_days,
            horizon_days,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 {
            return Err(ConfigError::NonPositiveLookback);
        }
        if self.horizon_days == 0 {
            return Err(ConfigError::NonPositiveHorizon);
        }
        Ok(())
    }

    pub fn window(&self, today: NaiveDate) -> Window {
        Window::lookback(today, self.lookback_days)
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_FORECAST_LOOKBACK_DAYS,
            horizon_days: DEFAULT_FORECAST_HORIZON_DAYS,
        }
    }
}
