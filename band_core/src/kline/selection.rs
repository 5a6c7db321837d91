use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::price_series::PriceSeries;
use crate::common::band_error::{BandError, ErrCode};

pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "BTC-USD", "ETH-USD"];

pub const MIN_LOOKBACK_DAYS: u32 = 7;
pub const MAX_LOOKBACK_DAYS: u32 = 365;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

/// Calendar-day window of history to keep before an end date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    days: u32,
}

impl Default for Lookback {
    fn default() -> Self {
        Self {
            days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl Lookback {
    pub fn new(days: u32) -> Result<Self, BandError> {
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(BandError::new(
                format!(
                    "lookback must be within {}..={} days, got {}",
                    MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, days
                ),
                ErrCode::ParaError,
            ));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// First date inside the window ending (exclusively) at `end`
    pub fn start(&self, end: NaiveDate) -> NaiveDate {
        end - Duration::days(i64::from(self.days))
    }

    /// Points with `end - days <= date < end`
    pub fn apply(&self, series: &PriceSeries, end: NaiveDate) -> PriceSeries {
        series.slice_dates(self.start(end), end)
    }
}

/// True for one of the built-in instruments
pub fn is_default_symbol(symbol: &str) -> bool {
    DEFAULT_SYMBOLS.iter().any(|s| s.eq_ignore_ascii_case(symbol))
}
