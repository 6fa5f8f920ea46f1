use super::PgmTable;
use crate::common::config::SummaryConfig;
use crate::domain::{Imc, Imt, PgmError, PgmResult, SummaryRequest};
use crate::measures::{channel_value, report};
use crate::rotation::{sweep_pair, AngleSweep, Rotation};
use crate::waveform::{ChannelOrientation, OrientedPair, TraceStream};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Every `(Imt, Imc)` cell of a summary together with the per-channel values
/// and rotation sweeps those cells read from. Each value and sweep is
/// computed once even when several cells share it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DispatchPlan {
    cells: Vec<(Imt, Imc)>,
    channel_jobs: Vec<(Imt, usize)>,
    sweep_jobs: Vec<(Imt, Rotation)>,
}

impl DispatchPlan {
    pub(crate) fn build(stream: &TraceStream, request: &SummaryRequest) -> Self {
        let mut cells = Vec::new();
        let mut channel_jobs = BTreeSet::new();
        let mut sweep_jobs = BTreeSet::new();

        for &imt in &request.imts {
            for &imc in &request.imcs {
                cells.push((imt, imc));
                match imc {
                    Imc::Channels => {
                        channel_jobs.extend((0..stream.len()).map(|index| (imt, index)));
                    }
                    Imc::GreaterOfTwoHorizontals | Imc::GeometricMean => channel_jobs.extend(
                        indices(stream, ChannelOrientation::Horizontal).map(|index| (imt, index)),
                    ),
                    Imc::Vertical => channel_jobs.extend(
                        indices(stream, ChannelOrientation::Vertical).map(|index| (imt, index)),
                    ),
                    Imc::RotD(_) | Imc::GmRotD(_) => {
                        if let Some((rotation, _)) = Rotation::from_imc(imc) {
                            sweep_jobs.insert((imt, rotation));
                        }
                    }
                }
            }
        }

        let plan = Self {
            cells,
            channel_jobs: channel_jobs.into_iter().collect(),
            sweep_jobs: sweep_jobs.into_iter().collect(),
        };
        tracing::debug!(
            cells = plan.cells.len(),
            channel_jobs = plan.channel_jobs.len(),
            sweep_jobs = plan.sweep_jobs.len(),
            "built dispatch plan"
        );
        plan
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn evaluate(
        &self,
        stream: &TraceStream,
        config: &SummaryConfig,
    ) -> PgmResult<PgmTable> {
        let traces = stream.traces();
        let channel_values: BTreeMap<(Imt, usize), f64> =
            ordered_map(&self.channel_jobs, config.parallel, |&(imt, index)| {
                channel_value(&traces[index], imt, config).map(|value| ((imt, index), value))
            })?
            .into_iter()
            .collect();

        let sweeps: BTreeMap<(Imt, Rotation), AngleSweep> = if self.sweep_jobs.is_empty() {
            BTreeMap::new()
        } else {
            let pair = OrientedPair::from_stream(stream)?;
            ordered_map(&self.sweep_jobs, config.parallel, |&(imt, rotation)| {
                sweep_pair(&pair, imt, rotation, config).map(|sweep| ((imt, rotation), sweep))
            })?
            .into_iter()
            .collect()
        };

        let lookup = |imt: Imt, index: usize| -> PgmResult<f64> {
            channel_values.get(&(imt, index)).copied().ok_or_else(|| {
                PgmError::internal(
                    "RUN.MISSING_CELL",
                    format!("no value planned for {imt} on channel index {index}"),
                )
            })
        };

        let mut table = PgmTable::new();
        for &(imt, imc) in &self.cells {
            let row = table.entry(imt.label()).or_default();
            match imc {
                Imc::Channels => {
                    for (index, trace) in traces.iter().enumerate() {
                        row.insert(
                            trace.channel().to_string(),
                            report(imt, lookup(imt, index)?, config)?,
                        );
                    }
                }
                Imc::GreaterOfTwoHorizontals | Imc::GeometricMean => {
                    let values = indices(stream, ChannelOrientation::Horizontal)
                        .map(|index| lookup(imt, index))
                        .collect::<PgmResult<Vec<_>>>()?;
                    let [first, second] = values.as_slice() else {
                        return Err(PgmError::internal(
                            "RUN.MISSING_CELL",
                            format!("expected two horizontal values for {imt}"),
                        ));
                    };
                    let combined = if imc == Imc::GeometricMean {
                        (first * second).sqrt()
                    } else {
                        first.max(*second)
                    };
                    row.insert(label(imc), report(imt, combined, config)?);
                }
                Imc::Vertical => {
                    let Some(index) = indices(stream, ChannelOrientation::Vertical).next() else {
                        return Err(PgmError::internal(
                            "RUN.MISSING_CELL",
                            format!("no vertical channel for {imt}"),
                        ));
                    };
                    row.insert(label(imc), report(imt, lookup(imt, index)?, config)?);
                }
                Imc::RotD(_) | Imc::GmRotD(_) => {
                    let Some((rotation, percentile)) = Rotation::from_imc(imc) else {
                        continue;
                    };
                    let sweep = sweeps.get(&(imt, rotation)).ok_or_else(|| {
                        PgmError::internal(
                            "RUN.MISSING_CELL",
                            format!("no rotation sweep planned for {imt}"),
                        )
                    })?;
                    row.insert(label(imc), report(imt, sweep.percentile(percentile)?, config)?);
                }
            }
        }

        Ok(table)
    }
}

fn label(imc: Imc) -> String {
    imc.label().unwrap_or_else(|| imc.to_string())
}

fn indices(
    stream: &TraceStream,
    orientation: ChannelOrientation,
) -> impl Iterator<Item = usize> + '_ {
    stream
        .iter()
        .enumerate()
        .filter(move |(_, trace)| trace.orientation() == orientation)
        .map(|(index, _)| index)
}

/// Maps `jobs` in order, on the rayon pool when `parallel` is set.
fn ordered_map<T, R, F>(jobs: &[T], parallel: bool, job: F) -> PgmResult<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> PgmResult<R> + Sync + Send,
{
    if parallel {
        jobs.par_iter().map(job).collect()
    } else {
        jobs.iter().map(job).collect()
    }
}
