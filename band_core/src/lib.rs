pub mod band;
pub mod chart;
pub mod common;
pub mod config;
pub mod kline;
pub mod math;

pub use band::band_series::{BandLine, BandRow, BandSeries};
pub use band::estimator::BandEstimator;
pub use common::band_error::{BandError, ErrCode};
pub use config::band_config::BandConfig;
pub use kline::price_point::PricePoint;
pub use kline::price_series::PriceSeries;
