use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::{
    band_error::{BandError, ErrCode},
    enums::Granularity,
};

/// Parse a trading date.
///
/// Supports "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS" (time part dropped) and "YYYYMMDD".
pub fn parse_date(date_str: &str) -> Result<NaiveDate, BandError> {
    let s = date_str.trim();
    let parsed = if s.contains('-') {
        if s.len() > 10 {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.date())
                .or_else(|_| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d"))
        } else {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
        }
    } else {
        NaiveDate::parse_from_str(s, "%Y%m%d")
    };

    parsed.map_err(|e| {
        BandError::new(
            format!("invalid date {:?}: {}", date_str, e),
            ErrCode::SrcDataFormatError,
        )
    })
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Calendar period identifier.
///
/// Months are numbered `year * 12 + month - 1`, ISO weeks (Monday start) are
/// numbered by the Monday's day count from the common era divided by seven,
/// so the preceding period is always `ordinal - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodId {
    pub granularity: Granularity,
    pub ordinal: i32,
}

impl PeriodId {
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        let ordinal = match granularity {
            Granularity::Monthly => date.year() * 12 + date.month0() as i32,
            // 0001-01-01 is a Monday, so Mondays sit at 1 mod 7
            Granularity::Weekly => (week_start(date).num_days_from_ce() - 1).div_euclid(7),
        };
        Self {
            granularity,
            ordinal,
        }
    }

    pub fn predecessor(&self) -> Self {
        Self {
            granularity: self.granularity,
            ordinal: self.ordinal - 1,
        }
    }

    /// First calendar day of the period
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self.granularity {
            Granularity::Monthly => NaiveDate::from_ymd_opt(
                self.ordinal.div_euclid(12),
                self.ordinal.rem_euclid(12) as u32 + 1,
                1,
            ),
            Granularity::Weekly => NaiveDate::from_num_days_from_ce_opt(self.ordinal * 7 + 1),
        }
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Monthly => write!(
                f,
                "{:04}-{:02}",
                self.ordinal.div_euclid(12),
                self.ordinal.rem_euclid(12) + 1
            ),
            Granularity::Weekly => match self.start_date() {
                Some(monday) => {
                    let iw = monday.iso_week();
                    write!(f, "{:04}-W{:02}", iw.year(), iw.week())
                }
                None => write!(f, "W#{}", self.ordinal),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-15").unwrap(), d(2024, 3, 15));
        assert_eq!(parse_date("2024-03-15 00:00:00").unwrap(), d(2024, 3, 15));
        assert_eq!(parse_date("20240315").unwrap(), d(2024, 3, 15));
        assert_eq!(
            parse_date("15/03/2024").unwrap_err().errcode,
            ErrCode::SrcDataFormatError
        );
    }

    #[test]
    fn test_month_predecessor_crosses_year() {
        let jan = PeriodId::of(d(2024, 1, 10), Granularity::Monthly);
        let dec = PeriodId::of(d(2023, 12, 29), Granularity::Monthly);
        assert_eq!(jan.predecessor(), dec);
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!(dec.to_string(), "2023-12");
        assert_eq!(jan.start_date(), Some(d(2024, 1, 1)));
    }

    #[test]
    fn test_week_boundaries_are_monday() {
        // 2024-03-04 is a Monday, 2024-03-10 the following Sunday
        let monday = PeriodId::of(d(2024, 3, 4), Granularity::Weekly);
        let sunday = PeriodId::of(d(2024, 3, 10), Granularity::Weekly);
        let next_monday = PeriodId::of(d(2024, 3, 11), Granularity::Weekly);
        let prev_friday = PeriodId::of(d(2024, 3, 1), Granularity::Weekly);

        assert_eq!(monday, sunday);
        assert_eq!(next_monday.predecessor(), monday);
        assert_eq!(monday.predecessor(), prev_friday);
        assert_eq!(monday.start_date(), Some(d(2024, 3, 4)));
        assert_eq!(monday.to_string(), "2024-W10");
    }

    #[test]
    fn test_iso_week_across_new_year() {
        // 2024-12-30 (Mon) belongs to ISO week 2025-W01 together with 2025-01-03
        let a = PeriodId::of(d(2024, 12, 30), Granularity::Weekly);
        let b = PeriodId::of(d(2025, 1, 3), Granularity::Weekly);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2025-W01");
        assert_eq!(PeriodId::of(d(2025, 1, 5), Granularity::Weekly), a);
        assert_eq!(PeriodId::of(d(2025, 1, 6), Granularity::Weekly).predecessor(), a);
    }

    #[test]
    fn test_week_start() {
        assert_eq!(week_start(d(2024, 3, 7)), d(2024, 3, 4));
        assert_eq!(week_start(d(2024, 3, 4)), d(2024, 3, 4));
    }
}
