//! Trace-level entry points: unit conversion, velocity integration and
//! oscillator response of whole streams.
//!
//! Acceleration traces are taken to gal before any numerical work. Derived
//! velocity traces are tagged `cm/s`, spectral series `cm/s/s`.

use crate::common::config::SummaryConfig;
use crate::common::units::SampleUnit;
use crate::domain::{Imt, Period, PgmError, PgmResult};
use crate::numerics::{cumulative_trapezoid, solve_oscillator, OscillatorInput, OscillatorResponse};
use crate::rotation::{sweep_pair, AngleSweep, Rotation};
use crate::waveform::{OrientedPair, TraceStream, WaveformTrace};

/// Result of [`get_spectral`]: per-channel pseudo-acceleration series, or the
/// angle sweep of peak pseudo-acceleration for a rotated pair.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectralOutput {
    Channels(TraceStream),
    Rotated(AngleSweep),
}

pub fn get_acceleration(stream: &TraceStream, units: SampleUnit) -> PgmResult<TraceStream> {
    if !units.is_acceleration() {
        return Err(PgmError::input_validation(
            "INPUT.UNIT_MISMATCH",
            format!("'{units}' is not an acceleration unit"),
        ));
    }
    stream
        .iter()
        .map(|trace| trace.converted(units))
        .collect::<PgmResult<Vec<_>>>()
        .map(TraceStream::new)
}

pub fn get_velocity(stream: &TraceStream) -> PgmResult<TraceStream> {
    stream
        .iter()
        .map(velocity_trace)
        .collect::<PgmResult<Vec<_>>>()
        .map(TraceStream::new)
}

/// Cumulative trapezoid integral of an acceleration trace, starting at zero.
pub fn velocity_trace(trace: &WaveformTrace) -> PgmResult<WaveformTrace> {
    let velocity = cumulative_trapezoid(&trace.gal_samples()?, trace.delta())?;
    Ok(trace.derive(velocity, SampleUnit::CentimetersPerSecond))
}

pub fn compute_response(
    trace: &WaveformTrace,
    period: Period,
    damping: f64,
) -> PgmResult<OscillatorResponse> {
    let acceleration = trace.gal_samples()?;
    let response = solve_oscillator(OscillatorInput::new(
        &acceleration,
        trace.delta(),
        period.seconds(),
        damping,
    ))?;
    Ok(response)
}

pub fn get_spectral(
    period: Period,
    stream: &TraceStream,
    damping: f64,
    rotation: Option<Rotation>,
) -> PgmResult<SpectralOutput> {
    match rotation {
        None => stream
            .iter()
            .map(|trace| {
                let response = compute_response(trace, period, damping)?;
                Ok(trace.derive(response.pseudo_acceleration(), SampleUnit::Gal))
            })
            .collect::<PgmResult<Vec<_>>>()
            .map(|traces| SpectralOutput::Channels(TraceStream::new(traces))),
        Some(rotation) => {
            let pair = OrientedPair::from_stream(stream)?;
            let config = SummaryConfig::default().with_damping(damping);
            config.validate()?;
            sweep_pair(&pair, Imt::Sa(period), rotation, &config).map(SpectralOutput::Rotated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_acceleration, get_spectral, get_velocity, SpectralOutput};
    use crate::common::units::SampleUnit;
    use crate::domain::Period;
    use crate::rotation::Rotation;
    use crate::waveform::{TraceStream, WaveformTrace};
    use std::f64::consts::PI;

    fn sinusoid(channel: &str, amplitude: f64, frequency: f64, phase: f64) -> WaveformTrace {
        let data = (0..1000)
            .map(|index| amplitude * (2.0 * PI * frequency * index as f64 * 0.01 + phase).sin())
            .collect();
        WaveformTrace::new(channel, 0.01, SampleUnit::Gal, data).expect("trace")
    }

    #[test]
    fn velocity_is_cumulative_trapezoid_of_acceleration() {
        let trace = WaveformTrace::new("H1", 0.1, SampleUnit::MetersPerSecondSquared, vec![
            0.0, 1.0, 2.0, 1.0, 0.0,
        ])
        .expect("trace");
        let stream = TraceStream::new(vec![trace]);
        let velocity = get_velocity(&stream).expect("velocity");
        let velocity = &velocity.traces()[0];

        assert_eq!(velocity.units(), SampleUnit::CentimetersPerSecond);
        let expected = [0.0, 5.0, 20.0, 35.0, 40.0];
        for (expected, actual) in expected.iter().zip(velocity.data()) {
            assert!((expected - actual).abs() < 1.0e-10, "{expected} vs {actual}");
        }
    }

    #[test]
    fn acceleration_conversion_rejects_velocity_units() {
        let stream = TraceStream::new(vec![sinusoid("H1", 98.0, 1.0, 0.0)]);
        let converted = get_acceleration(&stream, SampleUnit::PercentG).expect("%g");
        assert_eq!(converted.traces()[0].units(), SampleUnit::PercentG);
        let peak = converted.traces()[0]
            .data()
            .iter()
            .fold(0.0_f64, |peak, value| peak.max(value.abs()));
        assert!((peak - 10.0).abs() < 1.0e-6);

        let error = get_acceleration(&stream, SampleUnit::CentimetersPerSecond)
            .expect_err("velocity unit");
        assert_eq!(error.placeholder(), "INPUT.UNIT_MISMATCH");
    }

    #[test]
    fn spectral_output_keeps_channel_layout_or_sweeps_pair() {
        let stream = TraceStream::new(vec![
            sinusoid("HN1", 50.0, 2.0, 0.0),
            sinusoid("HN2", 50.0, 2.0, PI / 2.0),
        ]);
        let period = Period::new(0.5).expect("period");

        match get_spectral(period, &stream, 0.05, None).expect("channels") {
            SpectralOutput::Channels(channels) => {
                assert_eq!(channels.len(), 2);
                assert_eq!(channels.traces()[0].len(), 1000);
                assert_eq!(channels.traces()[1].channel(), "HN2");
            }
            SpectralOutput::Rotated(_) => panic!("expected per-channel output"),
        }

        match get_spectral(period, &stream, 0.05, Some(Rotation::RotD)).expect("rotd") {
            SpectralOutput::Rotated(sweep) => {
                assert_eq!(sweep.len(), 180);
                assert!(sweep.values().iter().all(|value| *value > 0.0));
            }
            SpectralOutput::Channels(_) => panic!("expected rotated output"),
        }

        let error = get_spectral(period, &stream, 1.5, None).expect_err("damping");
        assert_eq!(error.placeholder(), "INPUT.INVALID_PARAMETER");
    }
}
