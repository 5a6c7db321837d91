use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use band_core::band::band_series::column_names;
use band_core::common::time::parse_date;
use band_core::{BandSeries, PricePoint, PriceSeries};
use csv::{Reader, StringRecord, Writer};
use tracing::{debug, warn};

const REQUIRED_COLUMNS: [&str; 5] = ["date", "open", "high", "low", "close"];

/// Column positions resolved from the header row
struct Layout {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let mut idx = [0usize; 5];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = match find(name) {
                Some(i) => i,
                None => bail!("missing column `{}` in header {:?}", name, headers),
            };
        }
        Ok(Self {
            date: idx[0],
            open: idx[1],
            high: idx[2],
            low: idx[3],
            close: idx[4],
            volume: find("volume"),
        })
    }
}

fn field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

/// Read daily bars; rows with a missing price are skipped
pub fn read_prices<R: Read>(reader: R, autofix: bool) -> Result<PriceSeries> {
    let mut rdr = Reader::from_reader(reader);
    let layout = Layout::from_headers(rdr.headers().context("reading CSV header")?)?;

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading CSV row {}", line + 1))?;
        let date_str = field(&record, layout.date)
            .with_context(|| format!("row {} has no date", line + 1))?;
        let date = parse_date(date_str)?;

        let prices = [layout.open, layout.high, layout.low, layout.close]
            .map(|idx| field(&record, idx).map(str::parse::<f64>));
        let [Some(open), Some(high), Some(low), Some(close)] = prices else {
            skipped += 1;
            continue;
        };
        let parse_err = || format!("row {} ({}) has a non-numeric price", line + 1, date);
        let volume = match layout.volume.and_then(|idx| field(&record, idx)) {
            Some(v) => Some(v.parse::<f64>().with_context(parse_err)?),
            None => None,
        };

        points.push(PricePoint::new(
            date,
            open.with_context(parse_err)?,
            high.with_context(parse_err)?,
            low.with_context(parse_err)?,
            close.with_context(parse_err)?,
            volume,
            autofix,
        )?);
    }

    if skipped > 0 {
        warn!(skipped, "rows without a complete price were skipped");
    }
    debug!(rows = points.len(), "price rows read");
    Ok(PriceSeries::from_unsorted(points)?)
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Input columns, `log_return`, `volatility`, then the derived band columns
pub fn write_bands<W: Write>(writer: W, bands: &BandSeries) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header: Vec<String> = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
    header.extend(["volume", "log_return", "volatility"].map(String::from));
    header.extend(column_names());
    wtr.write_record(&header)?;

    for row in &bands.rows {
        let p = &row.point;
        let mut record = vec![
            p.date.format("%Y-%m-%d").to_string(),
            p.open.to_string(),
            p.high.to_string(),
            p.low.to_string(),
            p.close.to_string(),
            cell(p.volume),
            cell(row.log_return),
            cell(row.volatility),
        ];
        record.extend(row.derived_columns().into_iter().map(cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use band_core::{BandConfig, BandEstimator, ErrCode};
    use band_core::common::band_error::BandError;

    const SAMPLE: &str = "Date,Open,High,Low,Close,Volume
2024-01-03,10.5,11,10,10.8,1200
2024-01-02,10,10.6,9.9,10.5,1000
2024-01-04,10.8,,10.7,10.9,900
2024-01-05 00:00:00,10.9,11.2,10.8,11.1,
";

    #[test]
    fn test_read_prices_sorts_and_skips() {
        let series = read_prices(SAMPLE.as_bytes(), false).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].close, 10.5);
        assert_eq!(series[0].volume, Some(1000.0));
        assert_eq!(series[2].date.to_string(), "2024-01-05");
        assert_eq!(series[2].volume, None);
    }

    #[test]
    fn test_missing_column() {
        let err = read_prices("date,close\n2024-01-02,10\n".as_bytes(), false).unwrap_err();
        assert!(err.to_string().contains("missing column `open`"));
    }

    #[test]
    fn test_invalid_bar_is_reported() {
        let csv = "date,open,high,low,close\n2024-01-02,10,9,8,10\n";
        let err = read_prices(csv.as_bytes(), false).unwrap_err();
        let band_err = err.downcast_ref::<BandError>().unwrap();
        assert!(band_err.errcode.is_kldata_err());
        assert_eq!(read_prices(csv.as_bytes(), true).unwrap().len(), 1);
    }

    #[test]
    fn test_write_bands_layout() {
        let mut csv = String::from("date,open,high,low,close\n");
        // GARCH(1,1) returns in percent, driven by an LCG with Box-Muller noise
        let (omega, alpha, beta) = (0.05, 0.1, 0.85);
        let mut state: u64 = 42;
        let mut uniform = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 11) as f64 + 0.5) / (1u64 << 53) as f64
        };
        let mut sigma2: f64 = 1.0;
        let mut price: f64 = 100.0;
        let mut date = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        for _ in 0..120 {
            csv.push_str(&format!("{},{p},{p},{p},{p}\n", date, p = price));
            let z = (-2.0 * uniform().ln()).sqrt() * (2.0 * std::f64::consts::PI * uniform()).cos();
            let eps = sigma2.sqrt() * z;
            price *= (eps / 100.0).exp();
            sigma2 = omega + alpha * eps * eps + beta * sigma2;
            date += chrono::Duration::days(1);
        }
        let series = read_prices(csv.as_bytes(), false).unwrap();
        let bands = BandEstimator::new(BandConfig::default()).estimate(&series).unwrap();

        let mut out = Vec::new();
        write_bands(&mut out, &bands).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header.len(), 8 + 22);
        assert_eq!(header[8], "upper_garch_monthly_1");

        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first.len(), 30);
        assert!(first[6].is_empty() && first[7].is_empty());
        assert!(first[8..].iter().all(|c| c.is_empty()));
        assert_eq!(lines.count(), 119);
    }

    #[test]
    fn test_empty_file_gives_empty_input() {
        let series = read_prices("date,open,high,low,close\n".as_bytes(), false).unwrap();
        let err = BandEstimator::new(BandConfig::default()).estimate(&series).unwrap_err();
        assert_eq!(err.errcode, ErrCode::EmptyInput);
    }
}
