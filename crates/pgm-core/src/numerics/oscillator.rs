use super::peak_abs;
use crate::domain::PgmError;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorInput<'a> {
    pub acceleration: &'a [f64],
    pub delta: f64,
    pub period: f64,
    pub damping: f64,
}

impl<'a> OscillatorInput<'a> {
    pub fn new(acceleration: &'a [f64], delta: f64, period: f64, damping: f64) -> Self {
        Self {
            acceleration,
            delta,
            period,
            damping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OscillatorError {
    #[error("oscillator period must be finite and > 0, got {period}")]
    InvalidPeriod { period: f64 },
    #[error("oscillator damping must lie in (0, 1), got {damping}")]
    InvalidDamping { damping: f64 },
    #[error("oscillator time step must be finite and > 0, got {delta}")]
    InvalidStep { delta: f64 },
    #[error("ground acceleration must contain finite values, index {index} got {value}")]
    NonFiniteSample { index: usize, value: f64 },
    #[error("oscillator response became non-finite at sample {index}")]
    NonFiniteResponse { index: usize },
}

impl From<OscillatorError> for PgmError {
    fn from(error: OscillatorError) -> Self {
        match error {
            OscillatorError::InvalidPeriod { .. }
            | OscillatorError::InvalidDamping { .. }
            | OscillatorError::InvalidStep { .. } => {
                PgmError::input_validation("INPUT.INVALID_PARAMETER", error.to_string())
            }
            OscillatorError::NonFiniteSample { .. } | OscillatorError::NonFiniteResponse { .. } => {
                PgmError::computation("RUN.NON_FINITE", error.to_string())
            }
        }
    }
}

/// Relative response of a damped single-degree-of-freedom oscillator to a
/// ground acceleration record. Series share the input's length and units
/// (displacement in `unit*s^2`, velocity in `unit*s`).
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatorResponse {
    displacement: Vec<f64>,
    velocity: Vec<f64>,
    acceleration: Vec<f64>,
    period: f64,
    damping: f64,
    delta: f64,
}

impl OscillatorResponse {
    pub fn displacement(&self) -> &[f64] {
        &self.displacement
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Absolute acceleration of the mass, `-(2 zeta omega v + omega^2 u)`.
    pub fn absolute_acceleration(&self) -> &[f64] {
        &self.acceleration
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn angular_frequency(&self) -> f64 {
        2.0 * PI / self.period
    }

    pub fn peak_displacement(&self) -> f64 {
        peak_abs(&self.displacement)
    }

    pub fn pseudo_acceleration(&self) -> Vec<f64> {
        let omega_sq = self.angular_frequency().powi(2);
        self.displacement.iter().map(|u| omega_sq * u).collect()
    }

    /// `omega^2 * max|u|`
    pub fn psa(&self) -> f64 {
        self.angular_frequency().powi(2) * self.peak_displacement()
    }

    /// `omega * max|u|`
    pub fn psv(&self) -> f64 {
        self.angular_frequency() * self.peak_displacement()
    }
}

pub trait OscillatorApi {
    fn respond(&self, input: OscillatorInput<'_>) -> Result<OscillatorResponse, OscillatorError>;
}

/// Exact recurrence for piecewise-linear excitation (Nigam & Jennings, 1969).
#[derive(Debug, Clone, Copy, Default)]
pub struct NigamJennings;

impl OscillatorApi for NigamJennings {
    fn respond(&self, input: OscillatorInput<'_>) -> Result<OscillatorResponse, OscillatorError> {
        solve_oscillator(input)
    }
}

/// Step coefficients for `[u, v]_{i+1} = A [u, v]_i + B [a_i, a_{i+1}]`.
#[derive(Debug, Clone, Copy)]
struct StepMatrices {
    a: [[f64; 2]; 2],
    b: [[f64; 2]; 2],
}

impl StepMatrices {
    fn new(omega: f64, damping: f64, dt: f64) -> Self {
        let root = (1.0 - damping * damping).sqrt();
        let omega_d = omega * root;
        let decay = (-damping * omega * dt).exp();
        let sine = (omega_d * dt).sin();
        let cosine = (omega_d * dt).cos();

        let a11 = decay * (damping / root * sine + cosine);
        let a12 = decay * sine / omega_d;
        let a21 = -omega / root * decay * sine;
        let a22 = decay * (cosine - damping / root * sine);

        let omega_sq = omega * omega;
        let t1 = (2.0 * damping * damping - 1.0) / (omega_sq * dt);
        let t2 = 2.0 * damping / (omega_sq * omega * dt);
        let shifted_cosine = cosine - damping / root * sine;
        let velocity_term = omega_d * sine + damping * omega * cosine;

        let b11 = decay * ((t1 + damping / omega) * sine / omega_d + (t2 + 1.0 / omega_sq) * cosine)
            - t2;
        let b12 = -decay * (t1 * sine / omega_d + t2 * cosine) - 1.0 / omega_sq + t2;
        let b21 = decay
            * ((t1 + damping / omega) * shifted_cosine - (t2 + 1.0 / omega_sq) * velocity_term)
            + 1.0 / (omega_sq * dt);
        let b22 = -decay * (t1 * shifted_cosine - t2 * velocity_term) - 1.0 / (omega_sq * dt);

        Self {
            a: [[a11, a12], [a21, a22]],
            b: [[b11, b12], [b21, b22]],
        }
    }
}

/// Solves `u'' + 2 zeta omega u' + omega^2 u = -a(t)` from rest.
///
/// The recurrence is exact for linear interpolation of `a` between samples
/// and is stable for any step, so short periods stay finite even when
/// `period` is well below the sampling interval.
pub fn solve_oscillator(input: OscillatorInput<'_>) -> Result<OscillatorResponse, OscillatorError> {
    validate_input(input)?;

    let omega = 2.0 * PI / input.period;
    let damping = input.damping;
    let steps = StepMatrices::new(omega, damping, input.delta);
    let count = input.acceleration.len();

    let mut displacement = Vec::with_capacity(count);
    let mut velocity = Vec::with_capacity(count);
    let mut u = 0.0;
    let mut v = 0.0;
    if count > 0 {
        displacement.push(u);
        velocity.push(v);
    }

    for (index, window) in input.acceleration.windows(2).enumerate() {
        let (current, next) = (window[0], window[1]);
        let next_u = steps.a[0][0] * u + steps.a[0][1] * v + steps.b[0][0] * current
            + steps.b[0][1] * next;
        let next_v = steps.a[1][0] * u + steps.a[1][1] * v + steps.b[1][0] * current
            + steps.b[1][1] * next;
        if !next_u.is_finite() || !next_v.is_finite() {
            return Err(OscillatorError::NonFiniteResponse { index: index + 1 });
        }
        u = next_u;
        v = next_v;
        displacement.push(u);
        velocity.push(v);
    }

    let omega_sq = omega * omega;
    let acceleration = displacement
        .iter()
        .zip(&velocity)
        .map(|(u, v)| -(2.0 * damping * omega * v + omega_sq * u))
        .collect();

    Ok(OscillatorResponse {
        displacement,
        velocity,
        acceleration,
        period: input.period,
        damping,
        delta: input.delta,
    })
}

fn validate_input(input: OscillatorInput<'_>) -> Result<(), OscillatorError> {
    if !input.period.is_finite() || input.period <= 0.0 {
        return Err(OscillatorError::InvalidPeriod {
            period: input.period,
        });
    }
    if !input.damping.is_finite() || input.damping <= 0.0 || input.damping >= 1.0 {
        return Err(OscillatorError::InvalidDamping {
            damping: input.damping,
        });
    }
    if !input.delta.is_finite() || input.delta <= 0.0 {
        return Err(OscillatorError::InvalidStep { delta: input.delta });
    }
    if let Some((index, value)) = input
        .acceleration
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(OscillatorError::NonFiniteSample {
            index,
            value: *value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{solve_oscillator, NigamJennings, OscillatorApi, OscillatorError, OscillatorInput};
    use crate::domain::PgmError;
    use std::f64::consts::PI;

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let diff = (expected - actual).abs();
        let scale = expected.abs().max(actual.abs());
        assert!(
            diff <= abs_tol || diff <= rel_tol * scale,
            "{label}: expected {expected}, got {actual} (diff {diff})"
        );
    }

    #[test]
    fn zero_excitation_gives_zero_response() {
        let acceleration = vec![0.0; 500];
        let response = solve_oscillator(OscillatorInput::new(&acceleration, 0.01, 1.0, 0.05))
            .expect("response");
        assert_eq!(response.displacement().len(), 500);
        assert!(response.displacement().iter().all(|u| *u == 0.0));
        assert_eq!(response.psa(), 0.0);
        assert_eq!(response.psv(), 0.0);
    }

    #[test]
    fn constant_excitation_settles_at_static_displacement() {
        let acceleration = vec![100.0; 4000];
        let period = 0.5;
        let response = solve_oscillator(OscillatorInput::new(&acceleration, 0.01, period, 0.05))
            .expect("response");

        let omega = 2.0 * PI / period;
        let expected = -100.0 / (omega * omega);
        let settled = *response.displacement().last().expect("non-empty");
        assert_scalar_close("static displacement", expected, settled, 1.0e-6, 1.0e-4);
        assert_scalar_close(
            "absolute acceleration",
            100.0,
            -*response.absolute_acceleration().last().expect("non-empty"),
            1.0e-4,
            1.0e-4,
        );
    }

    #[test]
    fn step_response_overshoots_static_value() {
        // Suddenly applied load: peak displacement approaches twice the
        // static value for light damping.
        let acceleration = vec![1.0; 2000];
        let period = 1.0;
        let damping = 0.02;
        let response = solve_oscillator(OscillatorInput::new(&acceleration, 0.005, period, damping))
            .expect("response");

        let omega = 2.0 * PI / period;
        let static_u = 1.0 / (omega * omega);
        let peak = response.peak_displacement();
        let overshoot = 1.0 + (-damping * PI / (1.0 - damping * damping).sqrt()).exp();
        assert_scalar_close("peak overshoot", overshoot * static_u, peak, 1.0e-9, 1.0e-2);
    }

    #[test]
    fn resonant_sinusoid_amplifies_by_quality_factor() {
        let period = 0.5;
        let damping = 0.05;
        let dt = 0.002;
        let omega = 2.0 * PI / period;
        let acceleration: Vec<f64> = (0..30_000)
            .map(|index| (omega * index as f64 * dt).sin())
            .collect();
        let response = solve_oscillator(OscillatorInput::new(&acceleration, dt, period, damping))
            .expect("response");

        // Steady-state amplitude at resonance: 1 / (2 zeta omega^2).
        let expected_psa = 1.0 / (2.0 * damping);
        assert_scalar_close("resonant psa", expected_psa, response.psa(), 1.0e-9, 2.0e-2);
    }

    #[test]
    fn very_short_period_psa_tracks_peak_ground_acceleration() {
        let dt = 0.01;
        let acceleration: Vec<f64> = (0..2000)
            .map(|index| {
                let t = index as f64 * dt;
                120.0 * (2.0 * PI * 1.5 * t).sin() * (-0.2 * t).exp()
            })
            .collect();
        let pga = acceleration.iter().fold(0.0_f64, |peak, a| peak.max(a.abs()));
        let response = NigamJennings
            .respond(OscillatorInput::new(&acceleration, dt, 0.01, 0.05))
            .expect("response");

        assert!(response.psa().is_finite());
        assert_scalar_close("short period psa", pga, response.psa(), 1.0e-9, 5.0e-2);
    }

    #[test]
    fn invalid_parameters_map_to_input_errors() {
        let acceleration = [0.0, 1.0];
        let error = solve_oscillator(OscillatorInput::new(&acceleration, 0.01, 0.0, 0.05))
            .expect_err("period");
        assert_eq!(error, OscillatorError::InvalidPeriod { period: 0.0 });
        assert_eq!(PgmError::from(error).placeholder(), "INPUT.INVALID_PARAMETER");

        let error = solve_oscillator(OscillatorInput::new(&acceleration, 0.01, 1.0, 1.0))
            .expect_err("damping");
        assert!(matches!(error, OscillatorError::InvalidDamping { .. }));

        let error = solve_oscillator(OscillatorInput::new(&[0.0, f64::NAN], 0.01, 1.0, 0.05))
            .expect_err("nan");
        assert_eq!(PgmError::from(error).placeholder(), "RUN.NON_FINITE");
    }
}
