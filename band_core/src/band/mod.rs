pub mod band_series;
pub mod band_set;
pub mod estimator;
pub mod period_reference;
