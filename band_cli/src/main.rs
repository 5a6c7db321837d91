mod args;
mod csv_io;
mod logging;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use band_core::chart::overlay::ChartSpec;
use band_core::common::time::parse_date;
use band_core::kline::selection::{is_default_symbol, Lookback};
use band_core::{BandConfig, BandError, BandEstimator, ErrCode, PriceSeries};
use chrono::Duration;
use clap::Parser;
use tracing::{debug, info};

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let label = cli.symbol.as_deref().unwrap_or("the selected input");
            match err.downcast_ref::<BandError>().map(|e| e.errcode) {
                Some(ErrCode::EmptyInput) => eprintln!("No data found for {}", label),
                Some(ErrCode::InsufficientData) => {
                    eprintln!("Not enough history to estimate bands for {}: {:#}", label, err)
                }
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<BandConfig> {
    let mut config = match &cli.config {
        Some(path) => BandConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BandConfig::default(),
    };
    if let Some(n) = cli.min_observations {
        config.min_observations = n;
    }
    if let Some(policy) = cli.empty_period {
        config.empty_period_policy = policy;
    }
    if let Some(policy) = cli.zero_variance {
        config.zero_variance_policy = policy;
    }
    config.validate()?;
    Ok(config)
}

fn select(cli: &Cli, series: PriceSeries) -> Result<PriceSeries> {
    if cli.days.is_none() && cli.end.is_none() {
        return Ok(series);
    }
    let lookback = match cli.days {
        Some(days) => Lookback::new(days)?,
        None => Lookback::default(),
    };
    let end = match (&cli.end, series.last()) {
        (Some(end), _) => parse_date(end)?,
        (None, Some(last)) => last.date + Duration::days(1),
        (None, None) => return Ok(series),
    };
    let selected = lookback.apply(&series, end);
    info!(
        days = lookback.days(),
        start = %lookback.start(end),
        %end,
        rows = selected.len(),
        "lookback window applied"
    );
    Ok(selected)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    debug!(?config, "configuration loaded");

    if let Some(symbol) = &cli.symbol {
        if !is_default_symbol(symbol) {
            debug!(%symbol, "symbol is not in the default catalogue");
        }
    }

    let file = File::open(&cli.input).with_context(|| format!("opening {}", cli.input.display()))?;
    let series = csv_io::read_prices(BufReader::new(file), config.autofix)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let series = select(cli, series)?;
    info!(input = %cli.input.display(), rows = series.len(), "prices loaded");

    let bands = BandEstimator::new(config).estimate(&series)?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            csv_io::write_bands(BufWriter::new(file), &bands)?;
            info!(output = %path.display(), "bands written");
        }
        None => csv_io::write_bands(io::stdout().lock(), &bands)?,
    }

    if let Some(path) = &cli.chart {
        let title = match &cli.symbol {
            Some(symbol) => format!("{} GARCH bands", symbol),
            None => "GARCH bands".to_string(),
        };
        let chart = ChartSpec::build(title, &bands, cli.interval)?;
        std::fs::write(path, chart.to_json()?)
            .with_context(|| format!("writing chart {}", path.display()))?;
        info!(chart = %path.display(), layers = chart.candles.len() + chart.lines.len(), "chart written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// One row per calendar day from 2024-01-01 to 2024-03-31
    fn daily_series() -> PriceSeries {
        let start = d(2024, 1, 1);
        let closes: Vec<(NaiveDate, f64)> = (0..91)
            .map(|i| (start + Duration::days(i), 100.0 + i as f64))
            .collect();
        PriceSeries::from_closes(&closes).unwrap()
    }

    fn cli(extra: &[&str]) -> Cli {
        let mut argv = vec!["band_cli", "--input", "prices.csv"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_select_without_window_flags_keeps_series() {
        let series = daily_series();
        assert_eq!(select(&cli(&[]), series.clone()).unwrap(), series);
    }

    #[test]
    fn test_select_days_ends_at_last_row() {
        let selected = select(&cli(&["--days", "7"]), daily_series()).unwrap();
        assert_eq!(selected.len(), 7);
        assert_eq!(selected.first().unwrap().date, d(2024, 3, 25));
        assert_eq!(selected.last().unwrap().date, d(2024, 3, 31));
    }

    #[test]
    fn test_select_end_uses_default_days() {
        let selected = select(&cli(&["--end", "2024-03-01"]), daily_series()).unwrap();
        assert_eq!(selected.len(), 30);
        assert_eq!(selected.first().unwrap().date, d(2024, 1, 31));
        assert_eq!(selected.last().unwrap().date, d(2024, 2, 29));
    }

    #[test]
    fn test_select_rejects_out_of_range_days() {
        let err = select(&cli(&["--days", "400"]), daily_series()).unwrap_err();
        let band_err = err.downcast_ref::<BandError>().unwrap();
        assert_eq!(band_err.errcode, ErrCode::ParaError);
    }
}
