use std::path::PathBuf;

use band_core::common::enums::{EmptyPeriodPolicy, Interval, ZeroVariancePolicy};
use clap::Parser;

use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "band_cli")]
#[command(about = "GARCH(1,1) supply and demand bands for a daily price series")]
#[command(version)]
pub struct Cli {
    /// Price CSV with columns date,open,high,low,close[,volume]
    #[arg(short, long)]
    pub input: PathBuf,

    /// Instrument label used in the chart title and messages
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Keep only the last N calendar days before --end (7..=365)
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Exclusive end date of the lookback window, defaults to the day after the last row
    #[arg(short, long)]
    pub end: Option<String>,

    /// Coarser candle layer drawn next to the daily candles (1wk, 1mo; 1d draws daily only)
    #[arg(long, default_value = "1wk")]
    pub interval: Interval,

    /// JSON file with estimator settings
    #[arg(short, long, env = "BAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the minimum number of returns required to fit
    #[arg(long)]
    pub min_observations: Option<usize>,

    /// Reference lookup across empty periods (calendar, latest-completed)
    #[arg(long)]
    pub empty_period: Option<EmptyPeriodPolicy>,

    /// Constant-price handling (fail, zero)
    #[arg(long)]
    pub zero_variance: Option<ZeroVariancePolicy>,

    /// Output CSV path, stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the chart overlay as JSON to this path
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "pretty", env = "BAND_LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["band_cli", "--input", "prices.csv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("prices.csv"));
        assert_eq!(cli.interval, Interval::Weekly);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert!(cli.days.is_none());
        assert!(cli.empty_period.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "band_cli",
            "-i",
            "prices.csv",
            "--symbol",
            "MSFT",
            "--days",
            "90",
            "--interval",
            "1mo",
            "--empty-period",
            "calendar",
            "--zero-variance",
            "zero",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.symbol.as_deref(), Some("MSFT"));
        assert_eq!(cli.days, Some(90));
        assert_eq!(cli.interval, Interval::Monthly);
        assert_eq!(cli.empty_period, Some(EmptyPeriodPolicy::Calendar));
        assert_eq!(cli.zero_variance, Some(ZeroVariancePolicy::ZeroVolatility));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_unknown_interval() {
        assert!(Cli::try_parse_from(["band_cli", "-i", "p.csv", "--interval", "4h"]).is_err());
    }
}
