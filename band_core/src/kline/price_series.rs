use std::ops::Index;

use chrono::NaiveDate;

use super::price_point::PricePoint;
use crate::common::band_error::{BandError, ErrCode};

/// Daily price series with strictly increasing dates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    lst: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, BandError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(BandError::new(
                    format!(
                        "dates must be strictly increasing: {} follows {}",
                        pair[1].date, pair[0].date
                    ),
                    ErrCode::KlNotMonotonous,
                ));
            }
        }
        Ok(Self { lst: points })
    }

    /// Sort by date first; duplicate dates are still rejected
    pub fn from_unsorted(mut points: Vec<PricePoint>) -> Result<Self, BandError> {
        points.sort_by_key(|p| p.date);
        Self::new(points)
    }

    /// Build flat bars from (date, close) pairs
    pub fn from_closes(closes: &[(NaiveDate, f64)]) -> Result<Self, BandError> {
        let points = closes
            .iter()
            .map(|&(date, close)| PricePoint::from_close(date, close))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(points)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.lst.iter().map(|p| p.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.lst.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.lst.last()
    }

    pub fn len(&self) -> usize {
        self.lst.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lst.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.lst.iter()
    }

    /// Points with `start <= date < end`
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            lst: self
                .lst
                .iter()
                .filter(|p| p.date >= start && p.date < end)
                .copied()
                .collect(),
        }
    }
}

impl Index<usize> for PriceSeries {
    type Output = PricePoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lst[index]
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.lst.iter()
    }
}
