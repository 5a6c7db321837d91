/// Log returns `ln(close[i] / close[i-1])` for i >= 1
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

pub fn sample_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by n)
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let mean = sample_mean(values)?;
    let variance = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance)
}
