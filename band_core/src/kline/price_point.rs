use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::band_error::{BandError, ErrCode};

/// One trading day of OHLC prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
        autofix: bool,
    ) -> Result<Self, BandError> {
        let mut point = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        point.check(autofix)?;
        Ok(point)
    }

    /// Flat bar where open, high, low and close are all `close`
    pub fn from_close(date: NaiveDate, close: f64) -> Result<Self, BandError> {
        Self::new(date, close, close, close, close, None, false)
    }

    pub fn is_increasing(&self) -> bool {
        self.close >= self.open
    }

    fn check(&mut self, autofix: bool) -> Result<(), BandError> {
        for (name, price) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(BandError::new(
                    format!("{} {} price={} must be positive", self.date, name, price),
                    ErrCode::PriceBelowZero,
                ));
            }
        }

        let min_price = self.low.min(self.open).min(self.high).min(self.close);
        let max_price = self.low.max(self.open).max(self.high).max(self.close);

        if self.low > min_price {
            if autofix {
                self.low = min_price;
            } else {
                return Err(BandError::new(
                    format!(
                        "{} low price={} is not min of [low={}, open={}, high={}, close={}]",
                        self.date, self.low, self.low, self.open, self.high, self.close
                    ),
                    ErrCode::KlDataInvalid,
                ));
            }
        }

        if self.high < max_price {
            if autofix {
                self.high = max_price;
            } else {
                return Err(BandError::new(
                    format!(
                        "{} high price={} is not max of [low={}, open={}, high={}, close={}]",
                        self.date, self.high, self.low, self.open, self.high, self.close
                    ),
                    ErrCode::KlDataInvalid,
                ));
            }
        }
        Ok(())
    }
}
