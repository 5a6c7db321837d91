use serde::Serialize;

use super::{
    band_set::{BandSet, MAX_DEVIATION},
    period_reference::ReferenceLookup,
};
use crate::common::{
    band_error::{BandError, ErrCode},
    enums::Granularity,
};
use crate::kline::price_point::PricePoint;
use crate::math::garch::GarchFit;

/// Number of derived band columns per row (5 upper + 5 lower + mid, per granularity)
pub const DERIVED_COLUMN_COUNT: usize = 2 * (2 * MAX_DEVIATION + 1);

/// One trading day with its volatility and bands; `None` marks undefined values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRow {
    pub point: PricePoint,
    pub log_return: Option<f64>,
    pub volatility: Option<f64>,
    pub monthly: Option<BandSet>,
    pub weekly: Option<BandSet>,
}

impl BandRow {
    pub fn band_set(&self, granularity: Granularity) -> Option<&BandSet> {
        match granularity {
            Granularity::Monthly => self.monthly.as_ref(),
            Granularity::Weekly => self.weekly.as_ref(),
        }
    }

    /// Bands of `granularity`, or `MISSING_REFERENCE` when no prior period exists
    pub fn bands(&self, granularity: Granularity) -> Result<&BandSet, BandError> {
        self.band_set(granularity).ok_or_else(|| {
            BandError::new(
                format!("{} has no prior {} reference period", self.point.date, granularity),
                ErrCode::MissingReference,
            )
        })
    }

    /// The derived values in `column_names()` order
    pub fn derived_columns(&self) -> Vec<Option<f64>> {
        let mut values = Vec::with_capacity(DERIVED_COLUMN_COUNT);
        for granularity in Granularity::ALL {
            let bands = self.band_set(granularity);
            for d in 1..=MAX_DEVIATION {
                values.push(bands.and_then(|b| b.upper(d)));
            }
            for d in 1..=MAX_DEVIATION {
                values.push(bands.and_then(|b| b.lower(d)));
            }
            values.push(bands.map(|b| b.mid));
        }
        values
    }
}

/// Names of the derived band columns, e.g. `upper_garch_monthly_1`
pub fn column_names() -> Vec<String> {
    let mut names = Vec::with_capacity(DERIVED_COLUMN_COUNT);
    for granularity in Granularity::ALL {
        for d in 1..=MAX_DEVIATION {
            names.push(format!("upper_garch_{}_{}", granularity, d));
        }
        for d in 1..=MAX_DEVIATION {
            names.push(format!("lower_garch_{}_{}", granularity, d));
        }
        names.push(format!("mid_garch_{}", granularity));
    }
    names
}

/// Price series augmented with GARCH bands
#[derive(Debug, Clone, PartialEq)]
pub struct BandSeries {
    pub rows: Vec<BandRow>,
    pub fit: GarchFit,
    pub monthly_refs: ReferenceLookup,
    pub weekly_refs: ReferenceLookup,
}

impl BandSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn references(&self, granularity: Granularity) -> &ReferenceLookup {
        match granularity {
            Granularity::Monthly => &self.monthly_refs,
            Granularity::Weekly => &self.weekly_refs,
        }
    }

    /// Rows whose bands of `granularity` are undefined
    pub fn undefined_count(&self, granularity: Granularity) -> usize {
        self.rows
            .iter()
            .filter(|row| row.band_set(granularity).is_none())
            .count()
    }

    /// One value per row for a single band line, for plotting
    pub fn line(&self, granularity: Granularity, line: BandLine) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| {
                row.band_set(granularity).and_then(|b| match line {
                    BandLine::Upper(d) => b.upper(d),
                    BandLine::Lower(d) => b.lower(d),
                    BandLine::Mid => Some(b.mid),
                })
            })
            .collect()
    }
}

/// A single plotted band line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandLine {
    Upper(usize),
    Lower(usize),
    Mid,
}

impl BandLine {
    pub fn deviation(&self) -> Option<usize> {
        match self {
            Self::Upper(d) | Self::Lower(d) => Some(*d),
            Self::Mid => None,
        }
    }

    pub fn column_name(&self, granularity: Granularity) -> String {
        match self {
            Self::Upper(d) => format!("upper_garch_{}_{}", granularity, d),
            Self::Lower(d) => format!("lower_garch_{}_{}", granularity, d),
            Self::Mid => format!("mid_garch_{}", granularity),
        }
    }

    /// Every line in column order
    pub fn all() -> Vec<BandLine> {
        (1..=MAX_DEVIATION)
            .map(BandLine::Upper)
            .chain((1..=MAX_DEVIATION).map(BandLine::Lower))
            .chain(std::iter::once(BandLine::Mid))
            .collect()
    }
}
