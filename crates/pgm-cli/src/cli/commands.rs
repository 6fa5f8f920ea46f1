use super::CliError;
use super::helpers::{config_error, read_trace_bundle, write_output};
use anyhow::Context;
use pgm_core::{load_summary_config, StationSummary, SummaryConfig};
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct SummaryArgs {
    /// JSON trace bundle with the station's channels
    #[arg(long)]
    input: PathBuf,

    /// Intensity measure combination; repeat for several
    #[arg(long = "imc", value_name = "IMC", default_values = ["rotd50"])]
    imcs: Vec<String>,

    /// Intensity measure type; repeat for several
    #[arg(
        long = "imt",
        value_name = "IMT",
        default_values = ["pga", "pgv", "sa0.3", "sa1.0", "sa3.0"]
    )]
    imts: Vec<String>,

    /// Summary config JSON (damping, rotation step, output units)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Oscillator damping ratio, overrides the config value
    #[arg(long)]
    damping: Option<f64>,

    /// Evaluate on the calling thread only
    #[arg(long)]
    serial: bool,

    /// Write the summary JSON here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(super) fn run_summary_command(args: SummaryArgs) -> Result<i32, CliError> {
    let mut config = match &args.config {
        Some(path) => load_summary_config(path).map_err(config_error)?,
        None => SummaryConfig::default(),
    };
    if let Some(damping) = args.damping {
        config = config.with_damping(damping);
    }
    if args.serial {
        config = config.with_parallel(false);
    }

    let stream = read_trace_bundle(&args.input)?;
    let summary =
        StationSummary::from_stream_with_config(stream, &args.imcs, &args.imts, &config)
            .map_err(CliError::Compute)?;

    let rendered =
        serde_json::to_string_pretty(&summary).context("failed to render summary JSON")?;
    write_output(args.output.as_deref(), &rendered)?;
    Ok(0)
}

pub(super) fn run_list_command(entries: &[&str]) -> Result<i32, CliError> {
    for entry in entries {
        println!("{entry}");
    }
    Ok(0)
}
