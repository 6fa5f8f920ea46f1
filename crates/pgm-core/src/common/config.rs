//! Computation settings threaded through every summary.
//!
//! The settings are explicit values rather than module-level state: the
//! oscillator damping, the rotation sweep step, the unit reported for
//! acceleration-type measures and whether grids are evaluated in parallel.

use super::constants::{
    DEFAULT_DAMPING, DEFAULT_ROTATION_STEP_DEGREES, MIN_ROTATION_STEP_DEGREES,
    QUARTER_CIRCLE_DEGREES,
};
use super::units::SampleUnit;
use crate::domain::{PgmError, PgmResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STEP_DIVISIBILITY_TOLERANCE: f64 = 1.0e-9;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryConfig {
    pub damping: f64,
    #[serde(rename = "rotationStepDegrees")]
    pub rotation_step_degrees: f64,
    #[serde(rename = "accelerationUnits")]
    pub acceleration_units: SampleUnit,
    pub parallel: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            rotation_step_degrees: DEFAULT_ROTATION_STEP_DEGREES,
            acceleration_units: SampleUnit::PercentG,
            parallel: true,
        }
    }
}

impl SummaryConfig {
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_acceleration_units(mut self, units: SampleUnit) -> Self {
        self.acceleration_units = units;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> PgmResult<()> {
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping >= 1.0 {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_PARAMETER",
                format!("damping must lie in (0, 1), got {}", self.damping),
            ));
        }

        let step = self.rotation_step_degrees;
        if !step.is_finite()
            || step < MIN_ROTATION_STEP_DEGREES
            || step > QUARTER_CIRCLE_DEGREES
        {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_PARAMETER",
                format!(
                    "rotation step must lie in [{MIN_ROTATION_STEP_DEGREES}, 90] degrees, got {step}"
                ),
            ));
        }
        let steps_per_quarter = QUARTER_CIRCLE_DEGREES / step;
        if (steps_per_quarter - steps_per_quarter.round()).abs() > STEP_DIVISIBILITY_TOLERANCE {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_PARAMETER",
                format!("rotation step {step} does not divide 90 degrees evenly"),
            ));
        }

        if !self.acceleration_units.is_acceleration() {
            return Err(PgmError::input_validation(
                "INPUT.UNIT_MISMATCH",
                format!(
                    "acceleration output unit must be an acceleration unit, got '{}'",
                    self.acceleration_units
                ),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryConfigError {
    #[error("failed to read summary config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse summary config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid summary config '{}': {source}", path.display())]
    Invalid { path: PathBuf, source: PgmError },
}

pub fn load_summary_config(
    config_path: impl AsRef<Path>,
) -> Result<SummaryConfig, SummaryConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| SummaryConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let config: SummaryConfig =
        serde_json::from_str(&source).map_err(|source| SummaryConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
    config
        .validate()
        .map_err(|source| SummaryConfigError::Invalid {
            path: config_path.to_path_buf(),
            source,
        })?;
    Ok(config)
}
