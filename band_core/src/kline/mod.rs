pub mod price_point;
pub mod price_series;
pub mod resample;
pub mod selection;
