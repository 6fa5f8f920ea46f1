//! Station-level intensity measure table.
//!
//! A summary parses the requested combinations and measures, validates the
//! stream once, builds a dispatch plan and evaluates it into
//! `pgms[IMT_LABEL][IMC_LABEL]`. Nothing is computed when validation fails.

mod dispatch;
mod validation;

pub use validation::validate_stream;

use crate::common::config::SummaryConfig;
use crate::domain::{Imc, Imt, PgmResult, SummaryRequest};
use crate::waveform::TraceStream;
use dispatch::DispatchPlan;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// IMT label -> IMC label -> value.
pub type PgmTable = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    #[serde(rename = "station")]
    station_code: Option<String>,
    #[serde(skip)]
    stream: Option<TraceStream>,
    pgms: PgmTable,
}

impl StationSummary {
    pub fn from_stream<C, T>(stream: TraceStream, imcs: &[C], imts: &[T]) -> PgmResult<Self>
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        Self::from_stream_with_config(stream, imcs, imts, &SummaryConfig::default())
    }

    pub fn from_stream_with_config<C, T>(
        stream: TraceStream,
        imcs: &[C],
        imts: &[T],
        config: &SummaryConfig,
    ) -> PgmResult<Self>
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        Self::from_request(stream, &SummaryRequest::from_strings(imcs, imts), config)
    }

    pub fn from_request(
        stream: TraceStream,
        request: &SummaryRequest,
        config: &SummaryConfig,
    ) -> PgmResult<Self> {
        config.validate()?;
        if request.is_empty() {
            tracing::warn!("no valid IMC/IMT pair requested; summary table is empty");
            return Ok(Self {
                station_code: stream.station_code().map(str::to_string),
                stream: Some(stream),
                pgms: PgmTable::new(),
            });
        }
        validate_stream(&stream, request)?;

        let plan = DispatchPlan::build(&stream, request);
        let pgms = plan.evaluate(&stream, config)?;
        tracing::debug!(
            station = stream.station_code().unwrap_or("unknown"),
            cells = plan.cell_count(),
            "station summary computed"
        );

        Ok(Self {
            station_code: stream.station_code().map(str::to_string),
            stream: Some(stream),
            pgms,
        })
    }

    /// Rebuilds a summary from a table computed elsewhere. Such a summary has
    /// no stream and cannot be recomputed.
    pub fn from_pgms(station_code: impl Into<String>, pgms: PgmTable) -> Self {
        Self {
            station_code: Some(station_code.into()),
            stream: None,
            pgms,
        }
    }

    pub fn available_imcs() -> &'static [&'static str] {
        &Imc::AVAILABLE
    }

    pub fn available_imts() -> &'static [&'static str] {
        &Imt::AVAILABLE
    }

    pub fn pgms(&self) -> &PgmTable {
        &self.pgms
    }

    pub fn station_code(&self) -> Option<&str> {
        self.station_code.as_deref()
    }

    pub fn stream(&self) -> Option<&TraceStream> {
        self.stream.as_ref()
    }

    /// IMT labels present in the table.
    pub fn imts(&self) -> Vec<String> {
        self.pgms.keys().cloned().collect()
    }

    /// IMC labels (channel names for `channels`) present in the table.
    pub fn components(&self) -> Vec<String> {
        self.pgms
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Looks a value up by IMT and IMC. Both accept either the table label
    /// (`SA1.0`, `ROTD50.0`, `HN1`) or the request spelling (`sa1`, `rotd50`).
    pub fn get_pgm(&self, imt: &str, imc: &str) -> Option<f64> {
        let imt_label = imt
            .parse::<Imt>()
            .map(Imt::label)
            .unwrap_or_else(|_| imt.to_string());
        let row = self.pgms.get(&imt_label)?;
        if let Some(value) = row.get(imc) {
            return Some(*value);
        }
        let imc_label = imc.parse::<Imc>().ok().and_then(Imc::label)?;
        row.get(&imc_label).copied()
    }
}
