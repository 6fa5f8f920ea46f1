pub mod config;
pub mod constants;
pub mod units;

pub use config::{load_summary_config, SummaryConfig, SummaryConfigError};
pub use units::{convert_samples, convert_value, SampleUnit};
