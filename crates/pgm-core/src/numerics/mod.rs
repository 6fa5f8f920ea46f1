pub mod integration;
pub mod oscillator;

pub use integration::{arias_intensity, cumulative_trapezoid, trapezoid, IntegrationError};
pub use oscillator::{
    solve_oscillator, NigamJennings, OscillatorApi, OscillatorError, OscillatorInput,
    OscillatorResponse,
};

use crate::domain::{Percentile, PgmError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PercentileError {
    #[error("percentile of an empty sample set is undefined")]
    Empty,
    #[error("percentile samples must be finite, index {index} got {value}")]
    NonFiniteValue { index: usize, value: f64 },
}

impl From<PercentileError> for PgmError {
    fn from(error: PercentileError) -> Self {
        match error {
            PercentileError::Empty => PgmError::computation("RUN.EMPTY_SWEEP", error.to_string()),
            PercentileError::NonFiniteValue { .. } => {
                PgmError::computation("RUN.NON_FINITE", error.to_string())
            }
        }
    }
}

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// Largest absolute sample; zero for an empty slice.
pub fn peak_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |peak, value| peak.max(value.abs()))
}

/// Percentile with linear interpolation between order statistics
/// (`rank = p/100 * (n - 1)`). The 0th and 100th percentiles are the exact
/// minimum and maximum.
pub fn percentile(values: &[f64], percentile: Percentile) -> Result<f64, PercentileError> {
    if values.is_empty() {
        return Err(PercentileError::Empty);
    }
    if let Some((index, value)) = values
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(PercentileError::NonFiniteValue {
            index,
            value: *value,
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let last = sorted.len() - 1;

    let p = percentile.value();
    if p >= 100.0 {
        return Ok(sorted[last]);
    }
    if p <= 0.0 {
        return Ok(sorted[0]);
    }

    let rank = p / 100.0 * last as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

#[cfg(test)]
mod tests {
    use super::{peak_abs, percentile, stable_sum, PercentileError};
    use crate::domain::{Percentile, PgmError};

    fn p(value: f64) -> Percentile {
        Percentile::new(value).expect("valid percentile")
    }

    #[test]
    fn stable_sum_reduces_order_loss_for_large_and_small_values() {
        assert_eq!(stable_sum([1.0e16, 1.0, -1.0e16]), 0.0);
    }

    #[test]
    fn peak_abs_uses_magnitude() {
        assert_eq!(peak_abs(&[1.0, -4.5, 3.0]), 4.5);
        assert_eq!(peak_abs(&[]), 0.0);
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, Percentile::MEDIAN).expect("median"), 2.5);
        assert_eq!(percentile(&values, p(0.0)).expect("min"), 1.0);
        assert_eq!(percentile(&values, Percentile::MAXIMUM).expect("max"), 4.0);
        let quartile = percentile(&values, p(25.0)).expect("quartile");
        assert!((quartile - 1.75).abs() < 1.0e-12);
    }

    #[test]
    fn percentile_of_single_value_is_that_value() {
        for value in [0.0, 30.0, 50.0, 100.0] {
            assert_eq!(percentile(&[7.25], p(value)).expect("single"), 7.25);
        }
    }

    #[test]
    fn percentile_rejects_empty_and_non_finite_samples() {
        assert_eq!(
            percentile(&[], Percentile::MEDIAN),
            Err(PercentileError::Empty)
        );
        let error = percentile(&[1.0, f64::NAN], Percentile::MEDIAN).expect_err("nan");
        assert!(matches!(
            error,
            PercentileError::NonFiniteValue { index: 1, .. }
        ));
        assert_eq!(PgmError::from(error).placeholder(), "RUN.NON_FINITE");
    }
}
