use super::CliError;
use anyhow::Context;
use pgm_core::{PgmError, PgmResult, SampleUnit, SummaryConfigError, TraceStream, WaveformTrace};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Harness input: one station's traces as JSON.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct TraceBundle {
    #[serde(default)]
    station: Option<String>,
    traces: Vec<BundleTrace>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct BundleTrace {
    channel: String,
    delta: f64,
    units: SampleUnit,
    data: Vec<f64>,
}

impl TraceBundle {
    pub(super) fn into_stream(self) -> PgmResult<TraceStream> {
        let station = self.station;
        self.traces
            .into_iter()
            .map(|trace| {
                let built = WaveformTrace::new(trace.channel, trace.delta, trace.units, trace.data)?;
                Ok(match &station {
                    Some(code) => built.with_station(code.clone()),
                    None => built,
                })
            })
            .collect::<PgmResult<Vec<_>>>()
            .map(TraceStream::new)
    }
}

pub(super) fn read_trace_bundle(path: &Path) -> Result<TraceStream, CliError> {
    let source = fs::read_to_string(path).map_err(|source| {
        CliError::Compute(PgmError::io_system(
            "IO.BUNDLE_READ",
            format!("failed to read trace bundle '{}': {source}", path.display()),
        ))
    })?;
    let bundle: TraceBundle = serde_json::from_str(&source).map_err(|source| {
        CliError::Compute(PgmError::input_validation(
            "INPUT.BUNDLE_PARSE",
            format!("failed to parse trace bundle '{}': {source}", path.display()),
        ))
    })?;
    bundle.into_stream().map_err(CliError::Compute)
}

pub(super) fn config_error(error: SummaryConfigError) -> CliError {
    match error {
        SummaryConfigError::Read { .. } => {
            CliError::Compute(PgmError::io_system("IO.CONFIG_READ", error.to_string()))
        }
        SummaryConfigError::Parse { .. } => {
            CliError::Compute(PgmError::input_validation("INPUT.CONFIG_PARSE", error.to_string()))
        }
        SummaryConfigError::Invalid { source, .. } => CliError::Compute(source),
    }
}

pub(super) fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), CliError> {
    let Some(path) = path else {
        println!("{rendered}");
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    fs::write(path, format!("{rendered}\n"))
        .with_context(|| format!("failed to write summary '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::TraceBundle;

    #[test]
    fn bundle_traces_inherit_station_code() {
        let bundle: TraceBundle = serde_json::from_str(
            r#"{
              "station": "WTMC",
              "traces": [
                { "channel": "HN1", "delta": 0.01, "units": "cm/s/s", "data": [1.0, 2.0] },
                { "channel": "HNZ", "delta": 0.01, "units": "%g", "data": [0.5, 0.25] }
              ]
            }"#,
        )
        .expect("bundle should parse");
        let stream = bundle.into_stream().expect("stream");

        assert_eq!(stream.len(), 2);
        assert_eq!(stream.station_code(), Some("WTMC"));
        assert_eq!(stream.verticals().len(), 1);
    }

    #[test]
    fn bundle_rejects_invalid_sampling() {
        let bundle: TraceBundle = serde_json::from_str(
            r#"{ "traces": [ { "channel": "HN1", "delta": 0.0, "units": "gal", "data": [] } ] }"#,
        )
        .expect("bundle should parse");
        let error = bundle.into_stream().expect_err("delta");
        assert_eq!(error.placeholder(), "INPUT.INVALID_SAMPLING");
    }
}
