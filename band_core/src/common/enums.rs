use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Calendar granularity a band is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    Weekly,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Monthly, Granularity::Weekly];
}

/// Sampling interval of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum Interval {
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    Daily,
    #[strum(serialize = "1wk")]
    #[serde(rename = "1wk")]
    Weekly,
    #[strum(serialize = "1mo")]
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    /// Period granularity the interval aggregates to, `None` for daily
    pub fn granularity(&self) -> Option<Granularity> {
        match self {
            Self::Daily => None,
            Self::Weekly => Some(Granularity::Weekly),
            Self::Monthly => Some(Granularity::Monthly),
        }
    }
}

/// How a day finds its reference period when the calendar predecessor has no trading days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPeriodPolicy {
    /// Only the immediately preceding calendar period counts
    Calendar,
    /// Skip back over empty periods to the latest completed one
    #[default]
    LatestCompleted,
}

/// What the volatility fit does with a constant-price (zero variance) input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ZeroVariancePolicy {
    #[default]
    Fail,
    #[strum(to_string = "zero", serialize = "zero-volatility")]
    #[serde(rename = "zero")]
    ZeroVolatility,
}
