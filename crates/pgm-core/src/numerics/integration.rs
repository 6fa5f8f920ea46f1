use super::stable_sum;
use crate::common::constants::ARIAS_GRAVITY;
use crate::domain::PgmError;
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationError {
    #[error("integration step must be finite and > 0, got {delta}")]
    InvalidStep { delta: f64 },
    #[error("integrand must contain finite values, index {index} got {value}")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("integration produced a non-finite result")]
    NonFiniteResult,
}

impl From<IntegrationError> for PgmError {
    fn from(error: IntegrationError) -> Self {
        match error {
            IntegrationError::InvalidStep { .. } => {
                PgmError::input_validation("INPUT.INVALID_PARAMETER", error.to_string())
            }
            IntegrationError::NonFiniteSample { .. } | IntegrationError::NonFiniteResult => {
                PgmError::computation("RUN.NON_FINITE", error.to_string())
            }
        }
    }
}

fn validate(samples: &[f64], delta: f64) -> Result<(), IntegrationError> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(IntegrationError::InvalidStep { delta });
    }
    match samples
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        Some((index, value)) => Err(IntegrationError::NonFiniteSample {
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}

/// Running trapezoid integral with an initial value of zero; the output has
/// the same length as the input.
pub fn cumulative_trapezoid(samples: &[f64], delta: f64) -> Result<Vec<f64>, IntegrationError> {
    validate(samples, delta)?;

    let mut integral = Vec::with_capacity(samples.len());
    let mut running = 0.0;
    let mut correction = 0.0;
    if !samples.is_empty() {
        integral.push(0.0);
    }
    for window in samples.windows(2) {
        super::kahan_add(
            &mut running,
            &mut correction,
            0.5 * delta * (window[0] + window[1]),
        );
        integral.push(running);
    }

    if !running.is_finite() {
        return Err(IntegrationError::NonFiniteResult);
    }
    Ok(integral)
}

/// Trapezoid integral over the whole record.
pub fn trapezoid(samples: &[f64], delta: f64) -> Result<f64, IntegrationError> {
    validate(samples, delta)?;
    let total = stable_sum(
        samples
            .windows(2)
            .map(|window| 0.5 * delta * (window[0] + window[1])),
    );
    if !total.is_finite() {
        return Err(IntegrationError::NonFiniteResult);
    }
    Ok(total)
}

/// Arias intensity `pi / (2 g) * integral(a^2 dt)` of an acceleration record
/// in m/s/s; the result is in m/s.
pub fn arias_intensity(acceleration: &[f64], delta: f64) -> Result<f64, IntegrationError> {
    let squared: Vec<f64> = acceleration.iter().map(|value| value * value).collect();
    Ok(PI / (2.0 * ARIAS_GRAVITY) * trapezoid(&squared, delta)?)
}

#[cfg(test)]
mod tests {
    use super::{arias_intensity, cumulative_trapezoid, trapezoid, IntegrationError};
    use crate::common::constants::ARIAS_GRAVITY;
    use std::f64::consts::PI;

    #[test]
    fn cumulative_trapezoid_starts_at_zero() {
        let integral = cumulative_trapezoid(&[1.0, 3.0, 5.0, 3.0], 0.5).expect("integral");
        assert_eq!(integral, vec![0.0, 1.0, 3.0, 5.0]);
        assert!(cumulative_trapezoid(&[], 0.5).expect("empty").is_empty());
    }

    #[test]
    fn trapezoid_matches_last_cumulative_value() {
        let samples: Vec<f64> = (0..200).map(|index| (index as f64 * 0.07).sin()).collect();
        let total = trapezoid(&samples, 0.01).expect("total");
        let running = cumulative_trapezoid(&samples, 0.01).expect("running");
        let last = *running.last().expect("non-empty");
        assert!((total - last).abs() <= 1.0e-12);
    }

    #[test]
    fn arias_of_constant_record_is_closed_form() {
        let acceleration = vec![2.0; 101];
        let intensity = arias_intensity(&acceleration, 0.01).expect("arias");
        let expected = PI / (2.0 * ARIAS_GRAVITY) * 4.0 * 1.0;
        assert!((intensity - expected).abs() <= 1.0e-12);
    }

    #[test]
    fn invalid_inputs_are_reported() {
        assert_eq!(
            trapezoid(&[1.0, 2.0], 0.0),
            Err(IntegrationError::InvalidStep { delta: 0.0 })
        );
        assert!(matches!(
            cumulative_trapezoid(&[1.0, f64::INFINITY], 0.1),
            Err(IntegrationError::NonFiniteSample { index: 1, .. })
        ));
    }
}
