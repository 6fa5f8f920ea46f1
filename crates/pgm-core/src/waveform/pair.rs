use super::{TraceStream, WaveformTrace};
use crate::domain::{PgmError, PgmResult};

const SAMPLING_INTERVAL_REL_TOL: f64 = 1.0e-9;

/// Two orthogonal horizontal channels with identical sampling.
///
/// Only constructible through [`OrientedPair::new`], so holders may rely on
/// equal, non-zero sample counts and matching sampling intervals.
#[derive(Debug, Clone, Copy)]
pub struct OrientedPair<'a> {
    first: &'a WaveformTrace,
    second: &'a WaveformTrace,
}

impl<'a> OrientedPair<'a> {
    pub fn new(first: &'a WaveformTrace, second: &'a WaveformTrace) -> PgmResult<Self> {
        for trace in [first, second] {
            if !trace.is_horizontal() {
                return Err(PgmError::input_validation(
                    "INPUT.MISSING_HORIZONTAL_PAIR",
                    format!("channel '{}' is not a horizontal channel", trace.channel()),
                ));
            }
            if trace.is_empty() {
                return Err(PgmError::input_validation(
                    "INPUT.EMPTY_TRACE",
                    format!("channel '{}' contains no samples", trace.channel()),
                ));
            }
        }

        if first.channel_key() == second.channel_key() {
            return Err(PgmError::input_validation(
                "INPUT.DUPLICATE_CHANNEL",
                format!(
                    "horizontal pair uses channel '{}' twice",
                    first.channel()
                ),
            ));
        }

        if first.len() != second.len() {
            return Err(PgmError::input_validation(
                "INPUT.GEOMETRY_MISMATCH",
                format!(
                    "horizontal channels differ in sample count: '{}'={}, '{}'={}",
                    first.channel(),
                    first.len(),
                    second.channel(),
                    second.len()
                ),
            ));
        }

        if !same_sampling_interval(first.delta(), second.delta()) {
            return Err(PgmError::input_validation(
                "INPUT.GEOMETRY_MISMATCH",
                format!(
                    "horizontal channels differ in sampling interval: '{}'={}, '{}'={}",
                    first.channel(),
                    first.delta(),
                    second.channel(),
                    second.delta()
                ),
            ));
        }

        Ok(Self { first, second })
    }

    /// The pair formed by the only two horizontal channels of `stream`.
    pub fn from_stream(stream: &'a TraceStream) -> PgmResult<Self> {
        let horizontals = stream.horizontals();
        match horizontals.as_slice() {
            [first, second] => Self::new(first, second),
            _ => Err(PgmError::input_validation(
                "INPUT.MISSING_HORIZONTAL_PAIR",
                format!(
                    "expected exactly two horizontal channels, found {}",
                    horizontals.len()
                ),
            )),
        }
    }

    pub fn first(&self) -> &'a WaveformTrace {
        self.first
    }

    pub fn second(&self) -> &'a WaveformTrace {
        self.second
    }

    pub fn delta(&self) -> f64 {
        self.first.delta()
    }

    /// Samples per channel; never zero.
    pub fn sample_count(&self) -> usize {
        self.first.len()
    }
}

pub(crate) fn same_sampling_interval(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() <= SAMPLING_INTERVAL_REL_TOL * lhs.abs().max(rhs.abs())
}
