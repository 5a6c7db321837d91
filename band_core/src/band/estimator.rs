use tracing::{info, warn};

use super::{
    band_series::{BandRow, BandSeries},
    band_set::BandSet,
    period_reference::ReferenceLookup,
};
use crate::common::{
    band_error::BandError,
    enums::Granularity,
    time::PeriodId,
};
use crate::config::band_config::BandConfig;
use crate::kline::price_series::PriceSeries;
use crate::math::{garch::GarchModel, returns::log_returns};

/// Estimator for GARCH supply and demand bands.
///
/// Each day is anchored to the close and conditional volatility of the last
/// trading day of the previous calendar month and ISO week.
#[derive(Debug, Clone)]
pub struct BandEstimator {
    config: BandConfig,
    model: GarchModel,
}

impl BandEstimator {
    pub fn new(config: BandConfig) -> Self {
        let model = GarchModel::new(&config);
        Self { config, model }
    }

    pub fn config(&self) -> &BandConfig {
        &self.config
    }

    pub fn estimate(&self, series: &PriceSeries) -> Result<BandSeries, BandError> {
        if series.is_empty() {
            return Err(BandError::empty_input("price series has no rows"));
        }
        if series.len() < 2 {
            return Err(BandError::insufficient_data(self.config.min_observations, 0));
        }

        let returns = log_returns(&series.closes());
        let fit = self.model.fit(&returns)?;

        // the first day has no return, so no volatility
        let log_return: Vec<Option<f64>> =
            std::iter::once(None).chain(returns.iter().copied().map(Some)).collect();
        let volatility: Vec<Option<f64>> =
            std::iter::once(None).chain(fit.volatility.iter().copied().map(Some)).collect();

        let monthly_refs = ReferenceLookup::aggregate(series, &volatility, Granularity::Monthly)?;
        let weekly_refs = ReferenceLookup::aggregate(series, &volatility, Granularity::Weekly)?;

        let policy = self.config.empty_period_policy;
        let bands_for = |refs: &ReferenceLookup, date| {
            refs.resolve(PeriodId::of(date, refs.granularity()), policy)
                .map(BandSet::compute)
        };

        let rows: Vec<BandRow> = series
            .iter()
            .zip(log_return.into_iter().zip(volatility))
            .map(|(point, (log_return, volatility))| BandRow {
                point: *point,
                log_return,
                volatility,
                monthly: bands_for(&monthly_refs, point.date),
                weekly: bands_for(&weekly_refs, point.date),
            })
            .collect();

        let band_series = BandSeries {
            rows,
            fit,
            monthly_refs,
            weekly_refs,
        };
        self.log_summary(&band_series);
        Ok(band_series)
    }

    fn log_summary(&self, bands: &BandSeries) {
        let params = bands.fit.params;
        info!(
            rows = bands.len(),
            alpha = params.alpha,
            beta = params.beta,
            omega = params.omega,
            monthly_periods = bands.references(Granularity::Monthly).len(),
            weekly_periods = bands.references(Granularity::Weekly).len(),
            "band estimation finished"
        );

        for granularity in Granularity::ALL {
            let undefined = bands.undefined_count(granularity);
            if undefined == bands.len() {
                warn!(%granularity, "no day has a prior reference period, bands undefined");
            } else if undefined > 0 {
                info!(%granularity, undefined, "days without a prior reference period");
            }
        }
    }
}
