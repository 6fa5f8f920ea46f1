//! Physical and engine-wide constants.
//!
//! Acceleration is carried internally in gal (cm/s²). The `%g` conversion
//! uses g = 9.8 m/s², which is the convention the published RotD reference
//! values were produced with; Arias intensity uses g = 9.81 m/s².

pub const PCTG_TO_GAL: f64 = 9.8;
pub const GAL_TO_PCTG: f64 = 1.0 / PCTG_TO_GAL;
pub const GAL_PER_METER_PER_SECOND_SQUARED: f64 = 100.0;
pub const ARIAS_GRAVITY: f64 = 9.81;

pub const DEFAULT_DAMPING: f64 = 0.05;
pub const DEFAULT_ROTATION_STEP_DEGREES: f64 = 1.0;
pub const MIN_ROTATION_STEP_DEGREES: f64 = 0.01;
pub const HALF_CIRCLE_DEGREES: f64 = 180.0;
pub const QUARTER_CIRCLE_DEGREES: f64 = 90.0;
