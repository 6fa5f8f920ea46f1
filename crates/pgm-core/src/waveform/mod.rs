//! Read-only waveform traces as handed over by an upstream record reader.
//!
//! A trace is one channel of evenly sampled data with its sampling interval,
//! channel label and unit tag. The engine never mutates a trace; every
//! transform in this crate produces a new one.

mod pair;

pub use pair::OrientedPair;

use crate::common::units::{convert_samples, SampleUnit};
use crate::domain::{PgmError, PgmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrientation {
    Horizontal,
    Vertical,
}

impl ChannelOrientation {
    /// Channels whose label contains `Z` are vertical, all others horizontal.
    pub fn from_channel(channel: &str) -> Self {
        if channel.to_ascii_uppercase().contains('Z') {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTrace {
    channel: String,
    station: Option<String>,
    delta: f64,
    units: SampleUnit,
    data: Vec<f64>,
}

impl WaveformTrace {
    /// Builds a trace; the sampling interval must be finite and > 0.
    ///
    /// An empty `data` vector is accepted here so that readers can hand over
    /// whatever they found; summaries reject empty traces before computing.
    pub fn new(
        channel: impl Into<String>,
        delta: f64,
        units: SampleUnit,
        data: Vec<f64>,
    ) -> PgmResult<Self> {
        let channel = channel.into();
        if !delta.is_finite() || delta <= 0.0 {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_SAMPLING",
                format!("channel '{channel}' sampling interval must be finite and > 0, got {delta}"),
            ));
        }
        Ok(Self {
            channel,
            station: None,
            delta,
            units,
            data,
        })
    }

    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Channel label with surrounding whitespace and letter case removed;
    /// two traces with the same key record the same physical axis.
    pub fn channel_key(&self) -> String {
        self.channel.trim().to_ascii_uppercase()
    }

    pub fn station(&self) -> Option<&str> {
        self.station.as_deref()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn sampling_rate(&self) -> f64 {
        1.0 / self.delta
    }

    pub fn units(&self) -> SampleUnit {
        self.units
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn orientation(&self) -> ChannelOrientation {
        ChannelOrientation::from_channel(&self.channel)
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation() == ChannelOrientation::Horizontal
    }

    /// A copy of this trace expressed in `units`.
    pub fn converted(&self, units: SampleUnit) -> PgmResult<Self> {
        let data = convert_samples(&self.data, self.units, units).map_err(|error| {
            PgmError::input_validation(
                error.placeholder(),
                format!("channel '{}': {}", self.channel, error.message()),
            )
        })?;
        Ok(self.derive(data, units))
    }

    /// Samples in gal, the internal acceleration unit.
    pub(crate) fn gal_samples(&self) -> PgmResult<Vec<f64>> {
        Ok(self.converted(SampleUnit::Gal)?.data)
    }

    /// A new trace sharing this trace's metadata but carrying other samples.
    pub(crate) fn derive(&self, data: Vec<f64>, units: SampleUnit) -> Self {
        Self {
            channel: self.channel.clone(),
            station: self.station.clone(),
            delta: self.delta,
            units,
            data,
        }
    }
}

pub fn convert_trace(trace: &WaveformTrace, units: SampleUnit) -> PgmResult<WaveformTrace> {
    trace.converted(units)
}

/// All channels recorded by one station for one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceStream {
    traces: Vec<WaveformTrace>,
}

impl TraceStream {
    pub fn new(traces: Vec<WaveformTrace>) -> Self {
        Self { traces }
    }

    pub fn traces(&self) -> &[WaveformTrace] {
        &self.traces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WaveformTrace> {
        self.traces.iter()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn channel(&self, channel: &str) -> Option<&WaveformTrace> {
        self.traces.iter().find(|trace| trace.channel() == channel)
    }

    pub fn horizontals(&self) -> Vec<&WaveformTrace> {
        self.by_orientation(ChannelOrientation::Horizontal)
    }

    pub fn verticals(&self) -> Vec<&WaveformTrace> {
        self.by_orientation(ChannelOrientation::Vertical)
    }

    /// Station code of the first trace that carries one.
    pub fn station_code(&self) -> Option<&str> {
        self.traces.iter().find_map(WaveformTrace::station)
    }

    fn by_orientation(&self, orientation: ChannelOrientation) -> Vec<&WaveformTrace> {
        self.traces
            .iter()
            .filter(|trace| trace.orientation() == orientation)
            .collect()
    }
}

impl FromIterator<WaveformTrace> for TraceStream {
    fn from_iter<I: IntoIterator<Item = WaveformTrace>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TraceStream {
    type Item = &'a WaveformTrace;
    type IntoIter = std::slice::Iter<'a, WaveformTrace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelOrientation, TraceStream, WaveformTrace};
    use crate::common::units::SampleUnit;

    fn trace(channel: &str) -> WaveformTrace {
        WaveformTrace::new(channel, 0.01, SampleUnit::Gal, vec![1.0, -2.0, 3.0])
            .expect("valid trace")
    }

    #[test]
    fn orientation_follows_channel_label() {
        assert_eq!(
            ChannelOrientation::from_channel("HNZ"),
            ChannelOrientation::Vertical
        );
        assert_eq!(
            ChannelOrientation::from_channel("hhz"),
            ChannelOrientation::Vertical
        );
        assert_eq!(
            ChannelOrientation::from_channel("HN1"),
            ChannelOrientation::Horizontal
        );
        assert_eq!(
            ChannelOrientation::from_channel("H2"),
            ChannelOrientation::Horizontal
        );
    }

    #[test]
    fn invalid_sampling_interval_is_rejected() {
        for delta in [0.0, -0.01, f64::INFINITY, f64::NAN] {
            let error = WaveformTrace::new("H1", delta, SampleUnit::Gal, vec![1.0])
                .expect_err("delta should fail");
            assert_eq!(error.placeholder(), "INPUT.INVALID_SAMPLING");
        }
    }

    #[test]
    fn conversion_leaves_source_trace_untouched() {
        let source = trace("H1").with_station("WTMC");
        let converted = source
            .converted(SampleUnit::MetersPerSecondSquared)
            .expect("conversion");

        assert_eq!(source.data(), &[1.0, -2.0, 3.0]);
        for (expected, actual) in [0.01, -0.02, 0.03].iter().zip(converted.data()) {
            assert!((expected - actual).abs() <= 1.0e-15);
        }
        assert_eq!(converted.units(), SampleUnit::MetersPerSecondSquared);
        assert_eq!(converted.station(), Some("WTMC"));
        assert_eq!(converted.channel(), "H1");
    }

    #[test]
    fn stream_selects_channels_by_orientation() {
        let stream: TraceStream = ["HN1", "HN2", "HNZ"].into_iter().map(trace).collect();

        let horizontals: Vec<&str> = stream.horizontals().iter().map(|t| t.channel()).collect();
        assert_eq!(horizontals, vec!["HN1", "HN2"]);
        assert_eq!(stream.verticals().len(), 1);
        assert_eq!(stream.channel("HNZ").map(|t| t.len()), Some(3));
        assert_eq!(stream.station_code(), None);
    }
}
