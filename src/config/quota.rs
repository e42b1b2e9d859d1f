//! Daily quota configuration

use chrono::FixedOffset;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::entitlement::{
    TierLimits, DEFAULT_RECIPE_GENERATION_LIMIT, DEFAULT_RECIPE_VIEW_LIMIT, DEFAULT_SEARCH_LIMIT,
};

const MAX_DAILY_LIMIT: u32 = 10_000;
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Free-tier allowances and the day boundary
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_recipe_view_limit")]
    pub recipe_view_limit: u32,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    #[serde(default = "default_recipe_generation_limit")]
    pub recipe_generation_limit: u32,

    /// Minutes east of UTC at which the user's day starts
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl QuotaConfig {
    /// Allowance table with these Free limits
    pub fn tier_limits(&self) -> TierLimits {
        TierLimits::with_free_limits(
            self.recipe_view_limit,
            self.search_limit,
            self.recipe_generation_limit,
        )
    }

    /// Offset used to compute day keys
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    /// Validate quota configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipe_view_limit > MAX_DAILY_LIMIT {
            return Err(ValidationError::LimitTooLarge("recipe_view"));
        }
        if self.search_limit > MAX_DAILY_LIMIT {
            return Err(ValidationError::LimitTooLarge("search"));
        }
        if self.recipe_generation_limit > MAX_DAILY_LIMIT {
            return Err(ValidationError::LimitTooLarge("recipe_generation"));
        }
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            recipe_view_limit: default_recipe_view_limit(),
            search_limit: default_search_limit(),
            recipe_generation_limit: default_recipe_generation_limit(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_recipe_view_limit() -> u32 {
    DEFAULT_RECIPE_VIEW_LIMIT
}

fn default_search_limit() -> u32 {
    DEFAULT_SEARCH_LIMIT
}

fn default_recipe_generation_limit() -> u32 {
    DEFAULT_RECIPE_GENERATION_LIMIT
}
