// CSV price files
// One `<SYMBOL>.csv` per instrument with a header row, as exported by most
// market data download tools

use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::PriceSource;
use crate::error::IngestionError;
use crate::history::{DateRange, PriceHistory};

const DATE_COLUMN: &str = "date";
const CLOSE_COLUMNS: [&str; 2] = ["adj close", "close"];

/// Reads daily closes from `<dir>/<SYMBOL>.csv`
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

#[async_trait::async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<PriceHistory, IngestionError> {
        let path = self.path_for(symbol);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(symbol, path = %path.display(), "No price file found");
                return Ok(PriceHistory::empty(symbol));
            }
            Err(e) => {
                return Err(IngestionError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        let observations = parse_prices(&bytes, &path.display().to_string())?;
        let history = PriceHistory::new(symbol, observations).within(range);

        debug!(
            symbol = %history.symbol,
            rows = history.len(),
            "Loaded price file"
        );

        Ok(history)
    }
}

/// Parse `date` and close columns from CSV bytes.
///
/// The close column is `Adj Close` when present, otherwise `Close`; header
/// matching ignores case. Blank and `NaN` prices are kept as NaN so that
/// alignment drops the row.
pub fn parse_prices(bytes: &[u8], path: &str) -> Result<Vec<(NaiveDate, f64)>, IngestionError> {
    let csv_error = |source| IngestionError::Csv {
        path: path.to_string(),
        source,
    };

    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let date_index = headers
        .iter()
        .position(|h| h == DATE_COLUMN)
        .ok_or_else(|| IngestionError::MissingColumn {
            path: path.to_string(),
            column: DATE_COLUMN,
        })?;

    let close_index = CLOSE_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| IngestionError::MissingColumn {
            path: path.to_string(),
            column: "close",
        })?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parse_error = |message: String| IngestionError::Parse {
            path: path.to_string(),
            line,
            message,
        };

        let raw_date = record.get(date_index).unwrap_or("");
        // Timestamped exports carry a time suffix after the calendar date
        let date_part = raw_date.get(..10).unwrap_or(raw_date);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|e| parse_error(format!("invalid date '{}': {}", raw_date, e)))?;

        let raw_price = record.get(close_index).unwrap_or("");
        let price = parse_price(raw_price)
            .ok_or_else(|| parse_error(format!("invalid price '{}'", raw_price)))?;

        observations.push((date, price));
    }

    Ok(observations)
}

fn parse_price(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pairs-prices-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_prefers_adjusted_close() {
        let data = b"Date,Open,High,Low,Close,Adj Close,Volume\n\
2020-01-02,135.0,136.0,134.0,135.8,121.4,5000\n\
2020-01-03,135.5,136.2,135.0,135.4,121.0,4200\n";
        let rows = parse_prices(data, "PEP.csv").unwrap();
        assert_eq!(rows, vec![(day(1, 2), 121.4), (day(1, 3), 121.0)]);
    }

    #[test]
    fn test_falls_back_to_close() {
        let data = b"date,close\n2020-01-02,54.69\n";
        let rows = parse_prices(data, "KO.csv").unwrap();
        assert_eq!(rows, vec![(day(1, 2), 54.69)]);
    }

    #[test]
    fn test_timestamped_dates_and_blank_prices() {
        let data = b"Date,Close\n2020-01-02 00:00:00-05:00,54.69\n2020-01-03 00:00:00-05:00,\n";
        let rows = parse_prices(data, "KO.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (day(1, 2), 54.69));
        assert!(rows[1].1.is_nan());
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_prices(b"day,close\n2020-01-02,1.0\n", "X.csv").unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumn { column: "date", .. }));

        let err = parse_prices(b"date,open\n2020-01-02,1.0\n", "X.csv").unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumn { column: "close", .. }));
    }

    #[test]
    fn test_bad_values_report_line() {
        let err = parse_prices(b"date,close\n2020-01-02,1.0\n2020-13-01,2.0\n", "X.csv").unwrap_err();
        match err {
            IngestionError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }

        let err = parse_prices(b"date,close\n2020-01-02,abc\n", "X.csv").unwrap_err();
        assert!(matches!(err, IngestionError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_reads_uppercased_file_in_range() {
        let dir = temp_dir();
        std::fs::write(
            dir.join("PEP.csv"),
            "Date,Close\n2019-12-31,130.0\n2020-01-02,131.0\n2020-01-03,132.0\n2020-01-06,133.0\n",
        )
        .unwrap();

        let source = CsvPriceSource::new(&dir);
        let range = DateRange::new(day(1, 1), day(1, 6)).unwrap();
        let history = source.fetch("pep", range).await.unwrap();

        assert_eq!(history.symbol, "PEP");
        assert_eq!(history.observations, vec![(day(1, 2), 131.0), (day(1, 3), 132.0)]);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = temp_dir();
        let source = CsvPriceSource::new(&dir);
        let range = DateRange::new(day(1, 1), day(12, 31)).unwrap();

        let history = source.fetch("NOPE", range).await.unwrap();
        assert!(history.is_empty());

        std::fs::remove_dir_all(dir).ok();
    }
}
