use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::common::{
    band_error::{BandError, ErrCode},
    enums::{EmptyPeriodPolicy, Granularity},
    time::PeriodId,
};
use crate::kline::price_series::PriceSeries;

/// Closing anchor of one completed calendar period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodReference {
    pub period: PeriodId,
    /// Trading day the anchor was taken from
    pub date: NaiveDate,
    pub reference_price: f64,
    pub reference_volatility: f64,
}

/// Period references of one granularity, keyed by period
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLookup {
    granularity: Granularity,
    refs: BTreeMap<PeriodId, PeriodReference>,
}

impl ReferenceLookup {
    /// Take the last day of each period that has a volatility estimate.
    ///
    /// `volatility` is aligned with `series`; the first day has no return and
    /// therefore no estimate.
    pub fn aggregate(
        series: &PriceSeries,
        volatility: &[Option<f64>],
        granularity: Granularity,
    ) -> Result<Self, BandError> {
        if series.len() != volatility.len() {
            return Err(BandError::new(
                format!(
                    "volatility length {} does not match series length {}",
                    volatility.len(),
                    series.len()
                ),
                ErrCode::ParaError,
            ));
        }

        let mut refs = BTreeMap::new();
        for (point, vol) in series.iter().zip(volatility) {
            let Some(vol) = vol else {
                continue;
            };
            let period = PeriodId::of(point.date, granularity);
            // later days overwrite earlier ones, leaving the period's last day
            refs.insert(
                period,
                PeriodReference {
                    period,
                    date: point.date,
                    reference_price: point.close,
                    reference_volatility: *vol,
                },
            );
        }

        Ok(Self { granularity, refs })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn get(&self, period: &PeriodId) -> Option<&PeriodReference> {
        self.refs.get(period)
    }

    /// Reference for a day in `day_period`, always from a strictly earlier period
    pub fn resolve(&self, day_period: PeriodId, policy: EmptyPeriodPolicy) -> Option<&PeriodReference> {
        match policy {
            EmptyPeriodPolicy::Calendar => self.refs.get(&day_period.predecessor()),
            EmptyPeriodPolicy::LatestCompleted => {
                self.refs.range(..day_period).next_back().map(|(_, r)| r)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
