pub mod errors;

pub use errors::{PgmError, PgmErrorCategory, PgmResult};

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Oscillator natural period in seconds; always finite and > 0.
#[derive(Debug, Clone, Copy)]
pub struct Period(f64);

impl Period {
    pub fn new(seconds: f64) -> PgmResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_PARAMETER",
                format!("oscillator period must be finite and > 0, got {seconds}"),
            ));
        }
        Ok(Self(seconds))
    }

    pub const fn seconds(self) -> f64 {
        self.0
    }
}

/// Rotation percentile in `[0, 100]`.
#[derive(Debug, Clone, Copy)]
pub struct Percentile(f64);

impl Percentile {
    pub const MEDIAN: Self = Self(50.0);
    pub const MAXIMUM: Self = Self(100.0);

    pub fn new(value: f64) -> PgmResult<Self> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(PgmError::input_validation(
                "INPUT.INVALID_PARAMETER",
                format!("percentile must lie in [0, 100], got {value}"),
            ));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

macro_rules! impl_total_order {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.0.total_cmp(&other.0) == Ordering::Equal
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.to_bits().hash(state);
            }
        }
    };
}

impl_total_order!(Period);
impl_total_order!(Percentile);

/// Renders a float the way labels expect it: shortest round-trip digits in
/// fixed-point notation and always at least one decimal (`1.0`, `0.3`,
/// `50.0`, `0.00001`).
pub fn format_label_number(value: f64) -> String {
    let mut rendered = format!("{value}");
    if !rendered.contains('.') {
        rendered.push_str(".0");
    }
    rendered
}

/// Intensity measure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Imt {
    Pga,
    Pgv,
    Sa(Period),
    Arias,
}

impl Imt {
    pub const AVAILABLE: [&'static str; 4] = ["pga", "pgv", "sa<period>", "arias"];

    pub fn sa(period_seconds: f64) -> PgmResult<Self> {
        Period::new(period_seconds).map(Self::Sa)
    }

    pub fn label(self) -> String {
        match self {
            Self::Pga => "PGA".to_string(),
            Self::Pgv => "PGV".to_string(),
            Self::Sa(period) => format!("SA{}", format_label_number(period.seconds())),
            Self::Arias => "ARIAS".to_string(),
        }
    }

    pub fn period(self) -> Option<Period> {
        match self {
            Self::Sa(period) => Some(period),
            _ => None,
        }
    }
}

impl Display for Imt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Imt {
    type Err = PgmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pga" => return Ok(Self::Pga),
            "pgv" => return Ok(Self::Pgv),
            "arias" => return Ok(Self::Arias),
            _ => {}
        }

        let Some(period_text) = normalized.strip_prefix("sa") else {
            return Err(unknown_imt(raw));
        };
        let period_text = period_text
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(period_text);
        let period: f64 = period_text.parse().map_err(|_| unknown_imt(raw))?;
        Self::sa(period).map_err(|error| {
            PgmError::input_validation(
                "INPUT.UNKNOWN_IMT",
                format!("invalid IMT '{raw}': {}", error.message()),
            )
        })
    }
}

fn unknown_imt(raw: &str) -> PgmError {
    PgmError::input_validation("INPUT.UNKNOWN_IMT", format!("unknown IMT '{raw}'"))
}

/// Intensity measure combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Imc {
    Channels,
    GreaterOfTwoHorizontals,
    GeometricMean,
    Vertical,
    RotD(Percentile),
    GmRotD(Percentile),
}

impl Imc {
    pub const AVAILABLE: [&'static str; 6] = [
        "channels",
        "greater_of_two_horizontals",
        "geometric_mean",
        "vertical",
        "rotd<percentile>",
        "gmrotd<percentile>",
    ];

    /// Column label for single-valued combinations; `None` for `Channels`,
    /// whose columns are the channel names.
    pub fn label(self) -> Option<String> {
        match self {
            Self::Channels => None,
            Self::GreaterOfTwoHorizontals => Some("GREATER_OF_TWO_HORIZONTALS".to_string()),
            Self::GeometricMean => Some("GEOMETRIC_MEAN".to_string()),
            Self::Vertical => Some("VERTICAL".to_string()),
            Self::RotD(percentile) => {
                Some(format!("ROTD{}", format_label_number(percentile.value())))
            }
            Self::GmRotD(percentile) => {
                Some(format!("GMROTD{}", format_label_number(percentile.value())))
            }
        }
    }

    pub const fn requires_horizontal_pair(self) -> bool {
        matches!(
            self,
            Self::GreaterOfTwoHorizontals | Self::GeometricMean | Self::RotD(_) | Self::GmRotD(_)
        )
    }
}

impl Display for Imc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.label() {
            Some(label) => f.write_str(&label),
            None => f.write_str("CHANNELS"),
        }
    }
}

impl FromStr for Imc {
    type Err = PgmError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "channels" => return Ok(Self::Channels),
            "greater_of_two_horizontals" => return Ok(Self::GreaterOfTwoHorizontals),
            "geometric_mean" | "gm" => return Ok(Self::GeometricMean),
            "vertical" => return Ok(Self::Vertical),
            _ => {}
        }

        if let Some(rest) = normalized.strip_prefix("gmrotd") {
            return parse_percentile(raw, rest).map(Self::GmRotD);
        }
        if let Some(rest) = normalized.strip_prefix("rotd") {
            return parse_percentile(raw, rest).map(Self::RotD);
        }

        Err(PgmError::input_validation(
            "INPUT.UNKNOWN_IMC",
            format!("unknown IMC '{raw}'"),
        ))
    }
}

fn parse_percentile(raw: &str, text: &str) -> PgmResult<Percentile> {
    if text.is_empty() {
        return Ok(Percentile::MEDIAN);
    }
    let value: f64 = text.parse().map_err(|_| {
        PgmError::input_validation(
            "INPUT.UNKNOWN_IMC",
            format!("invalid percentile in IMC '{raw}'"),
        )
    })?;
    Percentile::new(value).map_err(|error| {
        PgmError::input_validation(
            "INPUT.UNKNOWN_IMC",
            format!("invalid IMC '{raw}': {}", error.message()),
        )
    })
}

/// The parsed, de-duplicated set of combinations and measures a caller asked
/// for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryRequest {
    pub imcs: BTreeSet<Imc>,
    pub imts: BTreeSet<Imt>,
}

impl SummaryRequest {
    pub fn new(imcs: impl IntoIterator<Item = Imc>, imts: impl IntoIterator<Item = Imt>) -> Self {
        Self {
            imcs: imcs.into_iter().collect(),
            imts: imts.into_iter().collect(),
        }
    }

    /// Parses caller strings, skipping (with a warning) anything that is not
    /// a recognised IMC or IMT.
    pub fn from_strings<C, T>(imcs: &[C], imts: &[T]) -> Self
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        let mut request = Self::default();
        for raw in imcs {
            match raw.as_ref().parse::<Imc>() {
                Ok(imc) => {
                    request.imcs.insert(imc);
                }
                Err(error) => tracing::warn!(imc = raw.as_ref(), "{}. Skipping...", error.message()),
            }
        }
        for raw in imts {
            match raw.as_ref().parse::<Imt>() {
                Ok(imt) => {
                    request.imts.insert(imt);
                }
                Err(error) => tracing::warn!(imt = raw.as_ref(), "{}. Skipping...", error.message()),
            }
        }
        request
    }

    pub fn requires_horizontal_pair(&self) -> bool {
        self.imcs.iter().any(|imc| imc.requires_horizontal_pair())
    }

    pub fn is_empty(&self) -> bool {
        self.imcs.is_empty() || self.imts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{format_label_number, Imc, Imt, Percentile, Period, SummaryRequest};

    #[test]
    fn imt_strings_parse_case_insensitively() {
        assert_eq!("PGA".parse::<Imt>().expect("pga"), Imt::Pga);
        assert_eq!(" pgv ".parse::<Imt>().expect("pgv"), Imt::Pgv);
        assert_eq!("Arias".parse::<Imt>().expect("arias"), Imt::Arias);
        assert_eq!(
            "sa1.0".parse::<Imt>().expect("sa"),
            Imt::sa(1.0).expect("period")
        );
        assert_eq!(
            "SA(0.3)".parse::<Imt>().expect("sa"),
            Imt::sa(0.3).expect("period")
        );
    }

    #[test]
    fn imt_labels_are_normalized() {
        assert_eq!("sa1".parse::<Imt>().expect("sa").label(), "SA1.0");
        assert_eq!("sa0.3".parse::<Imt>().expect("sa").label(), "SA0.3");
        assert_eq!("sa3.0".parse::<Imt>().expect("sa").label(), "SA3.0");
        assert_eq!(Imt::Pga.label(), "PGA");
    }

    #[test]
    fn invalid_imts_are_rejected_with_unknown_imt_code() {
        for raw in ["invalid", "sa", "sa-1.0", "sa0", "saX"] {
            let error = raw.parse::<Imt>().expect_err("should fail");
            assert_eq!(error.placeholder(), "INPUT.UNKNOWN_IMT", "{raw}");
        }
    }

    #[test]
    fn imc_strings_parse_percentiles() {
        let rotd50 = "rotd50".parse::<Imc>().expect("rotd50");
        assert_eq!(rotd50, Imc::RotD(Percentile::MEDIAN));
        assert_eq!(rotd50.label().as_deref(), Some("ROTD50.0"));

        let gmrotd = "GMROTD".parse::<Imc>().expect("gmrotd");
        assert_eq!(gmrotd.label().as_deref(), Some("GMROTD50.0"));

        let rotd100 = "rotd100".parse::<Imc>().expect("rotd100");
        assert_eq!(rotd100, Imc::RotD(Percentile::MAXIMUM));

        let rotd = "rotd12.5".parse::<Imc>().expect("rotd12.5");
        assert_eq!(rotd.label().as_deref(), Some("ROTD12.5"));

        assert_eq!(
            "greater_of_two_horizontals".parse::<Imc>().expect("goth"),
            Imc::GreaterOfTwoHorizontals
        );
        assert_eq!("channels".parse::<Imc>().expect("channels").label(), None);
    }

    #[test]
    fn invalid_imcs_are_rejected() {
        for raw in ["invalid", "rotd101", "rotd-5", "rotdx", "gmrotd50invalid"] {
            assert!(raw.parse::<Imc>().is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn pair_requirements_follow_combination_kind() {
        assert!(Imc::RotD(Percentile::MEDIAN).requires_horizontal_pair());
        assert!(Imc::GreaterOfTwoHorizontals.requires_horizontal_pair());
        assert!(!Imc::Channels.requires_horizontal_pair());
        assert!(!Imc::Vertical.requires_horizontal_pair());
    }

    #[test]
    fn request_skips_invalid_entries_and_deduplicates() {
        let request = SummaryRequest::from_strings(
            &["greater_of_two_horizontals", "channels", "invalid", "CHANNELS"],
            &["sa1.0", "PGA", "pgv", "invalid", "SA(1.0)"],
        );

        assert_eq!(request.imcs.len(), 2);
        assert_eq!(request.imts.len(), 3);
        assert!(request.requires_horizontal_pair());
        assert!(!request.is_empty());
    }

    #[test]
    fn parameters_reject_out_of_range_values() {
        assert!(Period::new(0.0).is_err());
        assert!(Period::new(f64::NAN).is_err());
        assert!(Percentile::new(100.5).is_err());
        assert!(Percentile::new(-0.1).is_err());
        assert_eq!(format_label_number(50.0), "50.0");
        assert_eq!(format_label_number(0.3), "0.3");
    }

    #[test]
    fn labels_stay_in_fixed_point_for_extreme_periods() {
        assert_eq!(format_label_number(1.0e-5), "0.00001");
        assert_eq!(format_label_number(12.5), "12.5");
        assert_eq!(format_label_number(1.0e17), "100000000000000000.0");

        let tiny = Imt::Sa(Period::new(1.0e-5).expect("period"));
        assert_eq!(tiny.label(), "SA0.00001");
        let huge = Imt::Sa(Period::new(1.0e20).expect("period"));
        assert_eq!(huge.label(), "SA100000000000000000000.0");
        assert!(!huge.label().contains('e'));
    }
}
