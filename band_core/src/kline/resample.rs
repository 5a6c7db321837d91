use tracing::debug;

use super::{price_point::PricePoint, price_series::PriceSeries};
use crate::common::{band_error::BandError, enums::Interval, time::PeriodId};

/// Aggregate a daily series into weekly or monthly OHLC bars.
///
/// Each bar is dated by the last trading day of its period. Volume is summed
/// when every day in the period carries one.
pub fn resample(series: &PriceSeries, interval: Interval) -> Result<PriceSeries, BandError> {
    let Some(granularity) = interval.granularity() else {
        return Ok(series.clone());
    };

    let mut bars: Vec<PricePoint> = Vec::new();
    let mut cur_period: Option<PeriodId> = None;

    for point in series {
        let period = PeriodId::of(point.date, granularity);
        match bars.last_mut() {
            Some(bar) if cur_period == Some(period) => {
                bar.date = point.date;
                bar.high = bar.high.max(point.high);
                bar.low = bar.low.min(point.low);
                bar.close = point.close;
                bar.volume = match (bar.volume, point.volume) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
            }
            _ => {
                bars.push(*point);
                cur_period = Some(period);
            }
        }
    }

    debug!(
        interval = %interval,
        days = series.len(),
        bars = bars.len(),
        "resampled price series"
    );
    PriceSeries::new(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(y: i32, m: u32, d: u32, o: f64, h: f64, l: f64, c: f64) -> PricePoint {
        PricePoint::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), o, h, l, c, Some(10.0), false)
            .unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::new(vec![
            // ISO week 2024-W09 (Thu, Fri)
            bar(2024, 2, 29, 10.0, 11.0, 9.5, 10.5),
            bar(2024, 3, 1, 10.5, 12.0, 10.0, 11.5),
            // ISO week 2024-W10
            bar(2024, 3, 4, 11.5, 11.8, 8.0, 9.0),
            bar(2024, 3, 5, 9.0, 9.5, 8.5, 9.2),
            bar(2024, 3, 8, 9.2, 10.0, 9.1, 9.9),
        ])
        .unwrap()
    }

    #[test]
    fn test_daily_is_identity() {
        let series = sample();
        assert_eq!(resample(&series, Interval::Daily).unwrap(), series);
    }

    #[test]
    fn test_weekly_bars() {
        let weekly = resample(&sample(), Interval::Weekly).unwrap();
        assert_eq!(weekly.len(), 2);

        let first = weekly[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 12.0);
        assert_eq!(first.low, 9.5);
        assert_eq!(first.close, 11.5);
        assert_eq!(first.volume, Some(20.0));

        let second = weekly[1];
        assert_eq!(second.open, 11.5);
        assert_eq!(second.low, 8.0);
        assert_eq!(second.close, 9.9);
        assert_eq!(second.volume, Some(30.0));
    }

    #[test]
    fn test_monthly_bars_split_on_calendar_month() {
        let monthly = resample(&sample(), Interval::Monthly).unwrap();
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].close, 10.5);
        assert_eq!(monthly[1].open, 10.5);
        assert_eq!(monthly[1].high, 12.0);
        assert_eq!(monthly[1].low, 8.0);
        assert_eq!(monthly[1].close, 9.9);
    }
}
