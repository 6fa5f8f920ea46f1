use super::constants::{GAL_PER_METER_PER_SECOND_SQUARED, PCTG_TO_GAL};
use crate::domain::{PgmError, PgmResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Physical unit tag carried by every trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SampleUnit {
    #[serde(rename = "%g", alias = "%%g", alias = "pctg")]
    PercentG,
    #[serde(rename = "m/s/s", alias = "m/s^2", alias = "m/s2")]
    MetersPerSecondSquared,
    #[serde(rename = "cm/s/s", alias = "cm/s^2", alias = "cm/s2", alias = "gal")]
    Gal,
    #[serde(rename = "cm/s")]
    CentimetersPerSecond,
}

impl SampleUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PercentG => "%g",
            Self::MetersPerSecondSquared => "m/s/s",
            Self::Gal => "cm/s/s",
            Self::CentimetersPerSecond => "cm/s",
        }
    }

    pub const fn is_acceleration(self) -> bool {
        !matches!(self, Self::CentimetersPerSecond)
    }

    /// Multiplier that takes a value in `self` to gal.
    const fn gal_factor(self) -> Option<f64> {
        match self {
            Self::PercentG => Some(PCTG_TO_GAL),
            Self::MetersPerSecondSquared => Some(GAL_PER_METER_PER_SECOND_SQUARED),
            Self::Gal => Some(1.0),
            Self::CentimetersPerSecond => None,
        }
    }
}

impl Display for SampleUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleUnit {
    type Err = PgmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "%g" | "%%g" | "pctg" => Ok(Self::PercentG),
            "m/s/s" | "m/s^2" | "m/s2" => Ok(Self::MetersPerSecondSquared),
            "cm/s/s" | "cm/s^2" | "cm/s2" | "gal" => Ok(Self::Gal),
            "cm/s" => Ok(Self::CentimetersPerSecond),
            _ => Err(PgmError::input_validation(
                "INPUT.UNIT_MISMATCH",
                format!("unknown unit '{raw}'"),
            )),
        }
    }
}

fn conversion_factor(from: SampleUnit, to: SampleUnit) -> PgmResult<f64> {
    if from == to {
        return Ok(1.0);
    }
    match (from.gal_factor(), to.gal_factor()) {
        (Some(from_factor), Some(to_factor)) => Ok(from_factor / to_factor),
        _ => Err(PgmError::input_validation(
            "INPUT.UNIT_MISMATCH",
            format!("cannot convert values from '{from}' to '{to}'"),
        )),
    }
}

pub fn convert_value(value: f64, from: SampleUnit, to: SampleUnit) -> PgmResult<f64> {
    Ok(value * conversion_factor(from, to)?)
}

pub fn convert_samples(samples: &[f64], from: SampleUnit, to: SampleUnit) -> PgmResult<Vec<f64>> {
    let factor = conversion_factor(from, to)?;
    if factor == 1.0 {
        return Ok(samples.to_vec());
    }
    Ok(samples.iter().map(|sample| sample * factor).collect())
}
