use crate::domain::{Imc, PgmError, PgmResult, SummaryRequest};
use crate::waveform::{OrientedPair, TraceStream};
use std::collections::BTreeSet;

/// Pre-flight checks run once before any numerical work.
pub fn validate_stream(stream: &TraceStream, request: &SummaryRequest) -> PgmResult<()> {
    if request.imcs.contains(&Imc::Channels) && stream.is_empty() {
        return Err(PgmError::input_validation(
            "INPUT.EMPTY_STREAM",
            "channel combination requested for a stream without traces",
        ));
    }

    let mut seen = BTreeSet::new();
    for trace in stream {
        if !seen.insert(trace.channel_key()) {
            return Err(PgmError::input_validation(
                "INPUT.DUPLICATE_CHANNEL",
                format!(
                    "channel '{}' duplicates another channel of the same axis",
                    trace.channel()
                ),
            ));
        }
    }

    for trace in stream {
        if trace.is_empty() {
            return Err(PgmError::input_validation(
                "INPUT.EMPTY_TRACE",
                format!("channel '{}' contains no samples", trace.channel()),
            ));
        }
        if !trace.units().is_acceleration() {
            return Err(PgmError::input_validation(
                "INPUT.UNIT_MISMATCH",
                format!(
                    "channel '{}' is in '{}', expected an acceleration unit",
                    trace.channel(),
                    trace.units()
                ),
            ));
        }
        if let Some(index) = trace.data().iter().position(|value| !value.is_finite()) {
            return Err(PgmError::input_validation(
                "INPUT.NON_FINITE_SAMPLE",
                format!(
                    "channel '{}' has a non-finite sample at index {index}",
                    trace.channel()
                ),
            ));
        }
    }

    if request.requires_horizontal_pair() {
        OrientedPair::from_stream(stream)?;
    }

    if request.imcs.contains(&Imc::Vertical) {
        let verticals = stream.verticals().len();
        if verticals != 1 {
            return Err(PgmError::input_validation(
                "INPUT.MISSING_VERTICAL",
                format!("expected exactly one vertical channel, found {verticals}"),
            ));
        }
    }

    Ok(())
}
