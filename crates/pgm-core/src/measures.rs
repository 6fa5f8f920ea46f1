//! How each intensity measure type turns a trace into a scalar.
//!
//! Every IMT is split into a linear per-axis series (so that horizontal pairs
//! can be rotated after the transform) and a reducer applied to a single
//! series. Series are in internal units: gal for acceleration, cm/s for
//! velocity, cm for oscillator displacement.

use crate::common::config::SummaryConfig;
use crate::common::constants::GAL_PER_METER_PER_SECOND_SQUARED;
use crate::common::units::{convert_value, SampleUnit};
use crate::domain::{Imt, PgmError, PgmResult};
use crate::numerics::{arias_intensity, peak_abs};
use crate::oscillators::{compute_response, velocity_trace};
use crate::waveform::WaveformTrace;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Measure {
    /// `scale * max|x|`
    Peak { scale: f64 },
    /// Arias intensity of a gal series sampled at `delta`.
    Arias { delta: f64 },
}

impl Measure {
    pub(crate) fn for_imt(imt: Imt, delta: f64) -> Self {
        match imt {
            Imt::Pga | Imt::Pgv => Self::Peak { scale: 1.0 },
            Imt::Sa(period) => Self::Peak {
                scale: (2.0 * PI / period.seconds()).powi(2),
            },
            Imt::Arias => Self::Arias { delta },
        }
    }

    pub(crate) fn evaluate(&self, series: &[f64]) -> PgmResult<f64> {
        let value = match *self {
            Self::Peak { scale } => scale * peak_abs(series),
            Self::Arias { delta } => {
                let acceleration: Vec<f64> = series
                    .iter()
                    .map(|gal| gal / GAL_PER_METER_PER_SECOND_SQUARED)
                    .collect();
                arias_intensity(&acceleration, delta)?
            }
        };
        if !value.is_finite() {
            return Err(PgmError::computation(
                "RUN.NON_FINITE",
                format!("intensity measure evaluated to {value}"),
            ));
        }
        Ok(value)
    }
}

/// The linear series a measure is read from.
pub(crate) fn axis_series(
    trace: &WaveformTrace,
    imt: Imt,
    config: &SummaryConfig,
) -> PgmResult<Vec<f64>> {
    match imt {
        Imt::Pga | Imt::Arias => trace.gal_samples(),
        Imt::Pgv => Ok(velocity_trace(trace)?.data().to_vec()),
        Imt::Sa(period) => {
            let response = compute_response(trace, period, config.damping)?;
            Ok(response.displacement().to_vec())
        }
    }
}

pub(crate) fn channel_value(
    trace: &WaveformTrace,
    imt: Imt,
    config: &SummaryConfig,
) -> PgmResult<f64> {
    Measure::for_imt(imt, trace.delta()).evaluate(&axis_series(trace, imt, config)?)
}

/// Converts an internal value into the unit reported for `imt`.
pub(crate) fn report(imt: Imt, value: f64, config: &SummaryConfig) -> PgmResult<f64> {
    match imt {
        Imt::Pga | Imt::Sa(_) => convert_value(value, SampleUnit::Gal, config.acceleration_units),
        Imt::Pgv | Imt::Arias => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::{channel_value, report, Measure};
    use crate::common::config::SummaryConfig;
    use crate::common::units::SampleUnit;
    use crate::domain::Imt;
    use crate::waveform::WaveformTrace;

    #[test]
    fn peak_measures_scale_absolute_maximum() {
        let measure = Measure::Peak { scale: 2.0 };
        assert_eq!(measure.evaluate(&[1.0, -3.0, 2.0]).expect("peak"), 6.0);
    }

    #[test]
    fn arias_reads_gal_series_in_si_units() {
        // 100 gal = 1 m/s/s held for one second.
        let trace = WaveformTrace::new("H1", 0.01, SampleUnit::Gal, vec![100.0; 101])
            .expect("trace");
        let config = SummaryConfig::default();
        let arias = channel_value(&trace, Imt::Arias, &config).expect("arias");
        let expected = std::f64::consts::PI / (2.0 * 9.81);
        assert!((arias - expected).abs() < 1.0e-10);
    }

    #[test]
    fn acceleration_measures_are_reported_in_configured_unit() {
        let config = SummaryConfig::default();
        assert!((report(Imt::Pga, 98.0, &config).expect("pga") - 10.0).abs() < 1.0e-12);
        assert_eq!(report(Imt::Pgv, 12.0, &config).expect("pgv"), 12.0);

        let si = config.with_acceleration_units(SampleUnit::MetersPerSecondSquared);
        let sa = report(Imt::sa(1.0).expect("sa"), 250.0, &si).expect("sa");
        assert!((sa - 2.5).abs() < 1.0e-12);
    }
}
