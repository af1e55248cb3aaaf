use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleaningError, Result};
use crate::record::CANONICAL_COLUMNS;
use crate::transform::WGS84_EPSG;

/// Cleaning parameters for one probe campaign.
///
/// Defaults mirror the standard field setup: one metadata line before the
/// column-name row, two unit/aggregation rows after it, a "99"-keyed
/// calibration counter, and reference depths of 0.02 m and 1.18 m.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningConfig {
    pub header_rows: usize,
    pub junk_rows: usize,
    pub columns_to_keep: Vec<String>,
    pub target_epsg: u32,
    pub calibration_prefix: String,
    pub calibration_lower_bound: f64,
    pub calibration_upper_bound: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            header_rows: 1,
            junk_rows: 2,
            columns_to_keep: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            target_epsg: WGS84_EPSG,
            calibration_prefix: "99".to_string(),
            calibration_lower_bound: 0.02,
            calibration_upper_bound: 1.18,
        }
    }
}

impl CleaningConfig {
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: CleaningConfig =
            toml::from_str(&content).map_err(|err| CleaningError::Configuration {
                message: format!("{}: {err}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce valid output, before any
    /// row is processed.
    pub fn validate(&self) -> Result<()> {
        if !self.calibration_lower_bound.is_finite() || !self.calibration_upper_bound.is_finite() {
            return Err(CleaningError::Configuration {
                message: "calibration bounds must be finite".to_string(),
            });
        }
        if self.calibration_lower_bound >= self.calibration_upper_bound {
            return Err(CleaningError::Configuration {
                message: format!(
                    "calibration_lower_bound ({}) must be below calibration_upper_bound ({})",
                    self.calibration_lower_bound, self.calibration_upper_bound
                ),
            });
        }
        if self.columns_to_keep.is_empty() {
            return Err(CleaningError::Configuration {
                message: "columns_to_keep must name at least one output column".to_string(),
            });
        }
        for column in &self.columns_to_keep {
            if !CANONICAL_COLUMNS.contains(&column.as_str()) {
                return Err(CleaningError::Configuration {
                    message: format!(
                        "unknown output column '{column}'; expected one of {CANONICAL_COLUMNS:?}"
                    ),
                });
            }
        }
        Ok(())
    }
}
