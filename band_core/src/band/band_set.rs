use serde::Serialize;

use super::period_reference::PeriodReference;

/// Highest deviation multiplier; bands exist for d = 1..=MAX_DEVIATION
pub const MAX_DEVIATION: usize = 5;

/// Upper/lower bands around a prior-period reference price
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandSet {
    pub reference: PeriodReference,
    /// `upper[d - 1] = P * (1 + d * σ)`
    pub upper: [f64; MAX_DEVIATION],
    /// `lower[d - 1] = P * (1 - d * σ)`
    pub lower: [f64; MAX_DEVIATION],
    /// Average of the d = 1 upper and lower band
    pub mid: f64,
}

impl BandSet {
    pub fn compute(reference: &PeriodReference) -> Self {
        let price = reference.reference_price;
        let vol = reference.reference_volatility;

        let mut upper = [0.0; MAX_DEVIATION];
        let mut lower = [0.0; MAX_DEVIATION];
        for (i, (u, l)) in upper.iter_mut().zip(lower.iter_mut()).enumerate() {
            let d = (i + 1) as f64;
            *u = price * (1.0 + d * vol);
            *l = price * (1.0 - d * vol);
        }

        Self {
            reference: *reference,
            upper,
            lower,
            mid: (upper[0] + lower[0]) / 2.0,
        }
    }

    pub fn upper(&self, d: usize) -> Option<f64> {
        d.checked_sub(1).and_then(|i| self.upper.get(i)).copied()
    }

    pub fn lower(&self, d: usize) -> Option<f64> {
        d.checked_sub(1).and_then(|i| self.lower.get(i)).copied()
    }

    pub fn width(&self, d: usize) -> Option<f64> {
        Some(self.upper(d)? - self.lower(d)?)
    }
}
