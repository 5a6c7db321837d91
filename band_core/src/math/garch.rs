//! GARCH(1,1) conditional volatility fitted by maximum likelihood.
//!
//! Constant mean, normal innovations:
//!
//! ```text
//! ε_t  = r_t − μ
//! σ²_0 = ω + (α + β) · backcast
//! σ²_t = ω + α · ε²_{t−1} + β · σ²_{t−1}
//! ```
//!
//! `backcast` is the exponentially weighted (λ = 0.94) mean of the first
//! 75 squared demeaned returns. The fit runs on returns multiplied by
//! `return_scale`; the reported volatility is divided by it again.

use serde::Serialize;
use tracing::{debug, warn};

use super::{
    nelder_mead::NelderMead,
    returns::{sample_mean, sample_variance},
};
use crate::common::{band_error::BandError, enums::ZeroVariancePolicy};
use crate::config::band_config::BandConfig;

const BACKCAST_WINDOW: usize = 75;
const BACKCAST_DECAY: f64 = 0.94;
const MAX_PERSISTENCE: f64 = 0.9999;
const MIN_VARIANCE: f64 = 1e-12;
const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Fitted GARCH(1,1) parameters, in scaled-return units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Garch11Params {
    pub mu: f64,
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Garch11Params {
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// ω / (1 − α − β), `None` when the process is not covariance stationary
    pub fn unconditional_variance(&self) -> Option<f64> {
        let gap = 1.0 - self.persistence();
        if gap > 0.0 {
            Some(self.omega / gap)
        } else {
            None
        }
    }

    /// Conditional variance path for `scaled` returns
    pub fn conditional_variance(&self, scaled: &[f64], backcast: f64) -> Vec<f64> {
        if scaled.is_empty() {
            return Vec::new();
        }
        let mut sigma2 = Vec::with_capacity(scaled.len());
        let mut prev = self.omega + (self.alpha + self.beta) * backcast;
        sigma2.push(prev);
        for r in &scaled[..scaled.len() - 1] {
            let eps = r - self.mu;
            prev = self.omega + self.alpha * eps * eps + self.beta * prev;
            sigma2.push(prev);
        }
        sigma2
    }

    /// Gaussian negative log-likelihood; +inf on invalid variance
    pub fn negative_log_likelihood(&self, scaled: &[f64], backcast: f64) -> f64 {
        let mut nll = 0.0;
        for (r, s2) in scaled.iter().zip(self.conditional_variance(scaled, backcast)) {
            if !(s2.is_finite() && s2 > MIN_VARIANCE) {
                return f64::INFINITY;
            }
            let eps = r - self.mu;
            nll += 0.5 * (LN_2PI + s2.ln() + eps * eps / s2);
        }
        nll
    }

    /// Map from the unconstrained optimizer space.
    ///
    /// `[μ, ln ω, logit(persistence / MAX_PERSISTENCE), logit(α / persistence)]`
    fn from_unconstrained(x: &[f64]) -> Self {
        let persistence = MAX_PERSISTENCE * logistic(x[2]);
        let share = logistic(x[3]);
        Self {
            mu: x[0],
            omega: x[1].exp(),
            alpha: persistence * share,
            beta: persistence * (1.0 - share),
        }
    }

    fn to_unconstrained(&self) -> Vec<f64> {
        let persistence = self.persistence();
        vec![
            self.mu,
            self.omega.ln(),
            logit(persistence / MAX_PERSISTENCE),
            logit(self.alpha / persistence),
        ]
    }
}

/// Result of a GARCH fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GarchFit {
    pub params: Garch11Params,
    /// `None` for a degenerate (zero variance) input
    pub log_likelihood: Option<f64>,
    pub iterations: usize,
    /// One value per return, in unscaled return units
    pub volatility: Vec<f64>,
}

impl GarchFit {
    pub fn is_degenerate(&self) -> bool {
        self.log_likelihood.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct GarchModel {
    min_observations: usize,
    return_scale: f64,
    zero_variance_policy: ZeroVariancePolicy,
    optimizer: NelderMead,
}

impl GarchModel {
    pub fn new(config: &BandConfig) -> Self {
        Self {
            min_observations: config.min_observations,
            return_scale: config.return_scale,
            zero_variance_policy: config.zero_variance_policy,
            optimizer: NelderMead::new(config.max_iterations, config.tolerance),
        }
    }

    /// Starting point: α = 0.1, β = 0.8, ω set so the long-run variance matches the sample.
    pub fn starting_params(scaled: &[f64]) -> Option<Garch11Params> {
        let mu = sample_mean(scaled)?;
        let variance = sample_variance(scaled)?;
        Some(Garch11Params {
            mu,
            omega: variance * 0.1,
            alpha: 0.1,
            beta: 0.8,
        })
    }

    pub fn backcast(scaled: &[f64], mu: f64) -> f64 {
        let tau = scaled.len().min(BACKCAST_WINDOW);
        let mut weight = 1.0;
        let mut weight_sum = 0.0;
        let mut acc = 0.0;
        for r in &scaled[..tau] {
            let eps = r - mu;
            acc += weight * eps * eps;
            weight_sum += weight;
            weight *= BACKCAST_DECAY;
        }
        if weight_sum > 0.0 {
            acc / weight_sum
        } else {
            0.0
        }
    }

    pub fn scale(&self, returns: &[f64]) -> Vec<f64> {
        returns.iter().map(|r| r * self.return_scale).collect()
    }

    pub fn fit(&self, returns: &[f64]) -> Result<GarchFit, BandError> {
        if returns.is_empty() {
            return Err(BandError::empty_input("no returns to fit"));
        }
        if returns.len() < self.min_observations {
            return Err(BandError::insufficient_data(self.min_observations, returns.len()));
        }
        if let Some(idx) = returns.iter().position(|r| !r.is_finite()) {
            return Err(BandError::fit_failure(format!(
                "return #{} is not finite ({})",
                idx, returns[idx]
            )));
        }

        let scaled = self.scale(returns);
        let start = Self::starting_params(&scaled)
            .ok_or_else(|| BandError::fit_failure("cannot compute sample moments"))?;

        let sample_var = sample_variance(&scaled).unwrap_or(0.0);
        if !(sample_var.is_finite() && sample_var > MIN_VARIANCE) {
            return self.degenerate_fit(returns.len(), start.mu);
        }

        let backcast = Self::backcast(&scaled, start.mu);
        let minimum = self.optimizer.minimize(
            |x| Garch11Params::from_unconstrained(x).negative_log_likelihood(&scaled, backcast),
            &start.to_unconstrained(),
        );

        if !minimum.converged {
            return Err(BandError::fit_failure(format!(
                "optimizer did not converge after {} iterations",
                minimum.iterations
            )));
        }
        if !minimum.value.is_finite() {
            return Err(BandError::fit_failure("log-likelihood is not finite"));
        }

        let params = Garch11Params::from_unconstrained(&minimum.x);
        let volatility: Vec<f64> = params
            .conditional_variance(&scaled, backcast)
            .into_iter()
            .map(|s2| s2.sqrt() / self.return_scale)
            .collect();

        if let Some(idx) = volatility.iter().position(|v| !v.is_finite()) {
            return Err(BandError::fit_failure(format!(
                "conditional volatility #{} is not finite",
                idx
            )));
        }

        debug!(
            mu = params.mu,
            omega = params.omega,
            alpha = params.alpha,
            beta = params.beta,
            iterations = minimum.iterations,
            log_likelihood = -minimum.value,
            "garch fit converged"
        );

        Ok(GarchFit {
            params,
            log_likelihood: Some(-minimum.value),
            iterations: minimum.iterations,
            volatility,
        })
    }

    fn degenerate_fit(&self, len: usize, mu: f64) -> Result<GarchFit, BandError> {
        match self.zero_variance_policy {
            ZeroVariancePolicy::Fail => Err(BandError::fit_failure(
                "returns have zero variance (constant prices)",
            )),
            ZeroVariancePolicy::ZeroVolatility => {
                warn!(observations = len, "zero variance returns, volatility set to zero");
                Ok(GarchFit {
                    params: Garch11Params {
                        mu: mu / self.return_scale,
                        omega: 0.0,
                        alpha: 0.0,
                        beta: 0.0,
                    },
                    log_likelihood: None,
                    iterations: 0,
                    volatility: vec![0.0; len],
                })
            }
        }
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
