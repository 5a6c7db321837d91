use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::{
    band_error::{BandError, ErrCode},
    enums::{EmptyPeriodPolicy, ZeroVariancePolicy},
};

/// Band estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandConfig {
    /// Minimum number of log returns required before fitting
    pub min_observations: usize,
    /// Returns are multiplied by this before fitting and volatility divided by it afterwards
    pub return_scale: f64,
    pub empty_period_policy: EmptyPeriodPolicy,
    pub zero_variance_policy: ZeroVariancePolicy,
    /// Optimizer iteration cap; hitting it is a fit failure
    pub max_iterations: usize,
    /// Convergence tolerance on the simplex log-likelihood spread
    pub tolerance: f64,
    /// Widen high/low to cover open/close instead of rejecting the bar
    pub autofix: bool,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            min_observations: 30,
            return_scale: 100.0,
            empty_period_policy: EmptyPeriodPolicy::LatestCompleted,
            zero_variance_policy: ZeroVariancePolicy::Fail,
            max_iterations: 5000,
            tolerance: 1e-9,
            autofix: false,
        }
    }
}

impl BandConfig {
    pub fn new(conf: Option<HashMap<String, serde_json::Value>>) -> Result<Self, BandError> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let default = Self::default();

        let config = Self {
            min_observations: conf.get("min_observations")?.unwrap_or(default.min_observations),
            return_scale: conf.get("return_scale")?.unwrap_or(default.return_scale),
            empty_period_policy: conf
                .get_enum("empty_period_policy")?
                .unwrap_or(default.empty_period_policy),
            zero_variance_policy: conf
                .get_enum("zero_variance_policy")?
                .unwrap_or(default.zero_variance_policy),
            max_iterations: conf.get("max_iterations")?.unwrap_or(default.max_iterations),
            tolerance: conf.get("tolerance")?.unwrap_or(default.tolerance),
            autofix: conf.get("autofix")?.unwrap_or(default.autofix),
        };

        conf.check()?;
        config.validate()?;

        Ok(config)
    }

    /// Load from a JSON object on disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BandError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BandError::new(
                format!("cannot read config {}: {}", path.display(), e),
                ErrCode::ConfigError,
            )
        })?;
        let conf: HashMap<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| {
                BandError::new(
                    format!("config {} is not a JSON object: {}", path.display(), e),
                    ErrCode::ConfigError,
                )
            })?;
        Self::new(Some(conf))
    }

    pub fn validate(&self) -> Result<(), BandError> {
        if self.min_observations < 2 {
            return Err(BandError::new(
                format!("min_observations must be at least 2, got {}", self.min_observations),
                ErrCode::ParaError,
            ));
        }
        if !(self.return_scale.is_finite() && self.return_scale > 0.0) {
            return Err(BandError::new(
                format!("return_scale must be positive, got {}", self.return_scale),
                ErrCode::ParaError,
            ));
        }
        if self.max_iterations == 0 {
            return Err(BandError::new("max_iterations must be positive", ErrCode::ParaError));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(BandError::new(
                format!("tolerance must be positive, got {}", self.tolerance),
                ErrCode::ParaError,
            ));
        }
        Ok(())
    }
}

/// Key/value config where every key must be consumed exactly once
struct ConfigWithCheck {
    conf: HashMap<String, serde_json::Value>,
}

impl ConfigWithCheck {
    fn new(conf: HashMap<String, serde_json::Value>) -> Self {
        Self { conf }
    }

    fn get<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, BandError> {
        match self.conf.remove(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                BandError::new(
                    format!("invalid value for {}: {} ({})", key, value, e),
                    ErrCode::ConfigError,
                )
            }),
        }
    }

    fn get_enum<T: FromStr>(&mut self, key: &str) -> Result<Option<T>, BandError> {
        match self.get::<String>(key)? {
            None => Ok(None),
            Some(s) => T::from_str(&s).map(Some).map_err(|_| {
                BandError::new(format!("unknown {}={}", key, s), ErrCode::ConfigError)
            }),
        }
    }

    fn check(&self) -> Result<(), BandError> {
        if let Some(key) = self.conf.keys().min() {
            return Err(BandError::new(format!("unknown para = {}", key), ErrCode::ParaError));
        }
        Ok(())
    }
}
