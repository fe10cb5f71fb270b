//! Tunables for a projection run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};

/// Blocking duration applied to Expected changeouts.
pub const EXPECTED_BLOCK_DAYS: i64 = 200;

/// Upper bound accepted for `expected_block_days` (ten years).
pub const MAX_EXPECTED_BLOCK_DAYS: i64 = 3650;

/// Configuration for [`generate_pool_projection`](crate::driver::generate_pool_projection).
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Changeouts and arrivals dated before this are treated as already
    /// captured by the baseline history.
    pub horizon_start: NaiveDate,
    /// Days an Expected changeout keeps its lane blocked.
    pub expected_block_days: i64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or(NaiveDate::MIN),
            expected_block_days: EXPECTED_BLOCK_DAYS,
        }
    }
}

impl ProjectionConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ProjectionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_EXPECTED_BLOCK_DAYS).contains(&self.expected_block_days) {
            return Err(PoolError::InvalidConfig(format!(
                "expected_block_days must be between 1 and {}, got {}",
                MAX_EXPECTED_BLOCK_DAYS, self.expected_block_days
            )));
        }
        Ok(())
    }
}
