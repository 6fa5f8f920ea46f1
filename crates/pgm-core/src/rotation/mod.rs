//! Rotation of an oriented horizontal pair through a sweep of azimuths and
//! percentile reduction of the per-angle intensity measure.
//!
//! RotD projects the pair onto a single azimuth `theta` in `[0, 180)`:
//! `h(theta) = h1 cos(theta) + h2 sin(theta)`. GMRotD rotates the pair as a
//! whole through `[0, 90)` and takes the geometric mean of both rotated
//! axes. Every per-axis transform the engine applies is linear, so it is
//! done once per axis and the transformed series are rotated.

use crate::common::config::SummaryConfig;
use crate::common::constants::{
    HALF_CIRCLE_DEGREES, MIN_ROTATION_STEP_DEGREES, QUARTER_CIRCLE_DEGREES,
};
use crate::domain::{Imc, Imt, Percentile, PgmError, PgmResult};
use crate::measures::{axis_series, report, Measure};
use crate::numerics::percentile;
use crate::waveform::OrientedPair;
use rayon::prelude::*;
use std::collections::BTreeMap;

const SWEEP_SPAN_TOLERANCE: f64 = 1.0e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rotation {
    RotD,
    GmRotD,
}

impl Rotation {
    pub const fn span_degrees(self) -> f64 {
        match self {
            Self::RotD => HALF_CIRCLE_DEGREES,
            Self::GmRotD => QUARTER_CIRCLE_DEGREES,
        }
    }

    /// Rotation kind and percentile of a rotated combination.
    pub fn from_imc(imc: Imc) -> Option<(Self, Percentile)> {
        match imc {
            Imc::RotD(percentile) => Some((Self::RotD, percentile)),
            Imc::GmRotD(percentile) => Some((Self::GmRotD, percentile)),
            _ => None,
        }
    }
}

/// Per-angle values in sweep order.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSweep {
    rotation: Rotation,
    angles: Vec<f64>,
    values: Vec<f64>,
}

impl AngleSweep {
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.angles.iter().copied().zip(self.values.iter().copied())
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn percentile(&self, percentile_rank: Percentile) -> PgmResult<f64> {
        Ok(percentile(&self.values, percentile_rank)?)
    }
}

/// Sweep azimuths `0, step, 2 step, ...` below `span_degrees`.
pub fn sweep_angles(step_degrees: f64, span_degrees: f64) -> PgmResult<Vec<f64>> {
    if !step_degrees.is_finite()
        || step_degrees < MIN_ROTATION_STEP_DEGREES
        || step_degrees > span_degrees
    {
        return Err(PgmError::input_validation(
            "INPUT.INVALID_PARAMETER",
            format!(
                "rotation step must lie in [{MIN_ROTATION_STEP_DEGREES}, {span_degrees}] degrees, got {step_degrees}"
            ),
        ));
    }
    let count = (span_degrees / step_degrees).round();
    if (count * step_degrees - span_degrees).abs() > SWEEP_SPAN_TOLERANCE * span_degrees {
        return Err(PgmError::input_validation(
            "INPUT.INVALID_PARAMETER",
            format!("rotation step {step_degrees} does not divide {span_degrees} degrees evenly"),
        ));
    }
    Ok((0..count as usize)
        .map(|index| index as f64 * step_degrees)
        .collect())
}

fn project(first: &[f64], second: &[f64], cos: f64, sin: f64) -> Vec<f64> {
    first
        .iter()
        .zip(second)
        .map(|(h1, h2)| h1 * cos + h2 * sin)
        .collect()
}

fn angle_value(
    first: &[f64],
    second: &[f64],
    measure: &Measure,
    rotation: Rotation,
    angle_degrees: f64,
) -> PgmResult<f64> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    match rotation {
        Rotation::RotD => measure.evaluate(&project(first, second, cos, sin)),
        Rotation::GmRotD => {
            let rotated_first = measure.evaluate(&project(first, second, cos, sin))?;
            let rotated_second = measure.evaluate(&project(first, second, -sin, cos))?;
            Ok((rotated_first * rotated_second).sqrt())
        }
    }
}

/// Evaluates `measure` over the rotation sweep of two equal-length series.
pub(crate) fn sweep_series(
    first: &[f64],
    second: &[f64],
    measure: &Measure,
    rotation: Rotation,
    config: &SummaryConfig,
) -> PgmResult<AngleSweep> {
    let angles = sweep_angles(config.rotation_step_degrees, rotation.span_degrees())?;
    let evaluate = |angle: &f64| angle_value(first, second, measure, rotation, *angle);
    let values: Vec<f64> = if config.parallel {
        angles.par_iter().map(evaluate).collect::<PgmResult<_>>()?
    } else {
        angles.iter().map(evaluate).collect::<PgmResult<_>>()?
    };

    if let Some((angle, value)) = angles
        .iter()
        .zip(&values)
        .find(|(_, value)| !value.is_finite())
    {
        return Err(PgmError::computation(
            "RUN.NON_FINITE",
            format!("rotation sweep produced {value} at {angle} degrees"),
        ));
    }

    Ok(AngleSweep {
        rotation,
        angles,
        values,
    })
}

/// Sweep of one intensity measure over a pair, in internal units.
pub fn sweep_pair(
    pair: &OrientedPair<'_>,
    imt: Imt,
    rotation: Rotation,
    config: &SummaryConfig,
) -> PgmResult<AngleSweep> {
    let first = axis_series(pair.first(), imt, config)?;
    let second = axis_series(pair.second(), imt, config)?;
    tracing::debug!(
        imt = %imt,
        rotation = ?rotation,
        samples = pair.sample_count(),
        step = config.rotation_step_degrees,
        "sweeping horizontal pair"
    );
    sweep_series(
        &first,
        &second,
        &Measure::for_imt(imt, pair.delta()),
        rotation,
        config,
    )
}

fn rotated_percentiles(
    pair: &OrientedPair<'_>,
    imts: &[Imt],
    percentiles: &[Percentile],
    rotation: Rotation,
    config: &SummaryConfig,
) -> PgmResult<BTreeMap<(Imt, Percentile), f64>> {
    let mut table = BTreeMap::new();
    for &imt in imts {
        let sweep = sweep_pair(pair, imt, rotation, config)?;
        for &percentile_rank in percentiles {
            let value = report(imt, sweep.percentile(percentile_rank)?, config)?;
            table.insert((imt, percentile_rank), value);
        }
    }
    Ok(table)
}

/// RotD percentiles of each measure, in reported units.
pub fn rotd(
    pair: &OrientedPair<'_>,
    imts: &[Imt],
    percentiles: &[Percentile],
    config: &SummaryConfig,
) -> PgmResult<BTreeMap<(Imt, Percentile), f64>> {
    rotated_percentiles(pair, imts, percentiles, Rotation::RotD, config)
}

/// GMRotD percentiles of each measure, in reported units.
pub fn gmrotd(
    pair: &OrientedPair<'_>,
    imts: &[Imt],
    percentiles: &[Percentile],
    config: &SummaryConfig,
) -> PgmResult<BTreeMap<(Imt, Percentile), f64>> {
    rotated_percentiles(pair, imts, percentiles, Rotation::GmRotD, config)
}
