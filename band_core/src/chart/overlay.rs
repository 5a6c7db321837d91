//! Plot description of a band series for an external chart renderer.
//!
//! The renderer draws every candle layer and then every line layer in order.
//! Undefined band values serialize as `null` and are left as gaps.

use chrono::NaiveDate;
use serde::Serialize;

use crate::band::band_series::{BandLine, BandSeries};
use crate::common::{
    band_error::{BandError, ErrCode},
    enums::{Granularity, Interval},
};
use crate::kline::{price_series::PriceSeries, resample::resample};

pub const INCREASING_COLOR: &str = "green";
pub const DECREASING_COLOR: &str = "red";

/// Colour of a band line: d=2 orange, d=4 purple, mid gray, everything else light blue
pub fn line_color(line: BandLine) -> &'static str {
    match line {
        BandLine::Mid => "gray",
        BandLine::Upper(2) | BandLine::Lower(2) => "orange",
        BandLine::Upper(4) | BandLine::Lower(4) => "purple",
        _ => "lightblue",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Drawn in the increasing colour when true
    pub increasing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleLayer {
    pub name: String,
    pub interval: Interval,
    pub increasing_color: &'static str,
    pub decreasing_color: &'static str,
    pub candles: Vec<Candle>,
}

impl CandleLayer {
    fn from_series(name: String, interval: Interval, series: &PriceSeries) -> Self {
        Self {
            name,
            interval,
            increasing_color: INCREASING_COLOR,
            decreasing_color: DECREASING_COLOR,
            candles: series
                .iter()
                .map(|p| Candle {
                    date: p.date,
                    open: p.open,
                    high: p.high,
                    low: p.low,
                    close: p.close,
                    increasing: p.is_increasing(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLayer {
    pub name: String,
    pub granularity: Granularity,
    pub line: BandLine,
    pub color: &'static str,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub candles: Vec<CandleLayer>,
    pub lines: Vec<LineLayer>,
}

impl ChartSpec {
    /// Daily candles, an optional coarser candle layer, and every band line
    pub fn build(title: impl Into<String>, bands: &BandSeries, interval: Interval) -> Result<Self, BandError> {
        let daily = PriceSeries::new(bands.rows.iter().map(|row| row.point).collect())?;

        let mut candles = vec![CandleLayer::from_series("daily".to_string(), Interval::Daily, &daily)];
        if interval != Interval::Daily {
            let coarse = resample(&daily, interval)?;
            candles.push(CandleLayer::from_series(interval.to_string(), interval, &coarse));
        }

        let dates: Vec<NaiveDate> = daily.iter().map(|p| p.date).collect();
        let mut lines = Vec::new();
        for granularity in Granularity::ALL {
            for line in BandLine::all() {
                lines.push(LineLayer {
                    name: line.column_name(granularity),
                    granularity,
                    line,
                    color: line_color(line),
                    dates: dates.clone(),
                    values: bands.line(granularity, line),
                });
            }
        }

        Ok(Self {
            title: title.into(),
            candles,
            lines,
        })
    }

    pub fn to_json(&self) -> Result<String, BandError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BandError::new(format!("chart serialization failed: {}", e), ErrCode::CommonError))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::band_set::BandSet;
    use crate::band::band_series::BandRow;
    use crate::band::period_reference::{PeriodReference, ReferenceLookup};
    use crate::common::time::PeriodId;
    use crate::math::garch::{Garch11Params, GarchFit};
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_bands() -> BandSeries {
        let series = PriceSeries::from_closes(&[
            (d(2024, 1, 30), 100.0),
            (d(2024, 1, 31), 101.0),
            (d(2024, 2, 1), 102.0),
            (d(2024, 2, 2), 101.5),
        ])
        .unwrap();
        let volatility = vec![None, Some(0.01), Some(0.012), Some(0.011)];
        let monthly_refs = ReferenceLookup::aggregate(&series, &volatility, Granularity::Monthly).unwrap();
        let weekly_refs = ReferenceLookup::aggregate(&series, &volatility, Granularity::Weekly).unwrap();

        let jan = PeriodReference {
            period: PeriodId::of(d(2024, 1, 31), Granularity::Monthly),
            date: d(2024, 1, 31),
            reference_price: 101.0,
            reference_volatility: 0.01,
        };
        let rows = series
            .iter()
            .zip(volatility)
            .map(|(point, vol)| BandRow {
                point: *point,
                log_return: None,
                volatility: vol,
                monthly: (point.date.month() == 2).then(|| BandSet::compute(&jan)),
                weekly: None,
            })
            .collect();

        BandSeries {
            rows,
            fit: GarchFit {
                params: Garch11Params {
                    mu: 0.0,
                    omega: 0.01,
                    alpha: 0.1,
                    beta: 0.8,
                },
                log_likelihood: None,
                iterations: 0,
                volatility: vec![0.01, 0.012, 0.011],
            },
            monthly_refs,
            weekly_refs,
        }
    }

    #[test]
    fn test_line_colors() {
        assert_eq!(line_color(BandLine::Upper(2)), "orange");
        assert_eq!(line_color(BandLine::Lower(4)), "purple");
        assert_eq!(line_color(BandLine::Mid), "gray");
        assert_eq!(line_color(BandLine::Upper(1)), "lightblue");
        assert_eq!(line_color(BandLine::Lower(5)), "lightblue");
    }

    #[test]
    fn test_build_layers() {
        let chart = ChartSpec::build("AAPL", &sample_bands(), Interval::Weekly).unwrap();
        assert_eq!(chart.candles.len(), 2);
        assert_eq!(chart.candles[0].candles.len(), 4);
        assert_eq!(chart.candles[1].interval, Interval::Weekly);
        assert_eq!(chart.lines.len(), 22);
        assert!(chart.lines.iter().all(|l| l.values.len() == 4 && l.dates.len() == 4));

        let daily_only = ChartSpec::build("AAPL", &sample_bands(), Interval::Daily).unwrap();
        assert_eq!(daily_only.candles.len(), 1);

        // flat bars count as increasing; the weekly bar opens at 100 and closes at 101.5
        let weekly = &chart.candles[1].candles;
        assert!(weekly.iter().all(|c| c.increasing));
        assert_eq!(weekly.last().unwrap().close, 101.5);
    }

    #[test]
    fn test_undefined_values_serialize_as_null() {
        let chart = ChartSpec::build("AAPL", &sample_bands(), Interval::Daily).unwrap();
        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();

        let upper = &json["lines"][0];
        assert_eq!(upper["name"], "upper_garch_monthly_1");
        assert_eq!(upper["color"], "lightblue");
        assert!(upper["values"][0].is_null());
        assert!((upper["values"][2].as_f64().unwrap() - 102.01).abs() < 1e-9);

        let weekly_mid = &json["lines"][21];
        assert_eq!(weekly_mid["color"], "gray");
        assert!(weekly_mid["values"].as_array().unwrap().iter().all(|v| v.is_null()));
    }
}
