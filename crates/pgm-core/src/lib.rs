//! Ground-motion intensity measures for strong-motion station records.

pub mod common;
pub mod domain;
mod measures;
pub mod numerics;
pub mod oscillators;
pub mod rotation;
pub mod summary;
pub mod waveform;

pub use common::{load_summary_config, SampleUnit, SummaryConfig, SummaryConfigError};
pub use domain::{Imc, Imt, Percentile, Period, PgmError, PgmErrorCategory, PgmResult, SummaryRequest};
pub use oscillators::{
    compute_response, get_acceleration, get_spectral, get_velocity, SpectralOutput,
};
pub use rotation::{gmrotd, rotd, AngleSweep, Rotation};
pub use summary::{PgmTable, StationSummary};
pub use waveform::{convert_trace, OrientedPair, TraceStream, WaveformTrace};
