//! CSV bar loading.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Column names are
//! matched case-insensitively, `time` is accepted for `timestamp`, and
//! `volume` may be omitted (read as 0). Rows are returned sorted by
//! timestamp. An empty price field is read as NaN and left to the engine,
//! which treats such bars as untradable.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, warn};
use tradesim_core::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: unrecognized timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: invalid {column} value '{value}'")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no bars in input")]
    Empty,
}

const TIMESTAMP_ALIASES: [&str; 2] = ["timestamp", "time"];

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require =
            |name: &str| find(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));

        let timestamp = TIMESTAMP_ALIASES
            .iter()
            .find_map(|name| find(name))
            .ok_or_else(|| LoadError::MissingColumn("timestamp".to_string()))?;

        Ok(Self {
            timestamp,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        })
    }
}

/// Load bars from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(file)?;
    info!(
        path = %path.display(),
        bars = bars.len(),
        first = %bars[0].timestamp,
        last = %bars[bars.len() - 1].timestamp,
        "loaded bars"
    );
    Ok(bars)
}

/// Parse bars from any CSV source. Never returns an empty vector.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = field(columns.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::BadTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let number = |column: &'static str, idx: usize| parse_number(row, column, field(idx));
        bars.push(Bar::new(
            timestamp,
            number("open", columns.open)?,
            number("high", columns.high)?,
            number("low", columns.low)?,
            number("close", columns.close)?,
            match columns.volume {
                Some(idx) => number("volume", idx)?,
                None => 0.0,
            },
        ));
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }

    if bars.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
        warn!("bars out of order; sorting by timestamp");
        bars.sort_by_key(|b| b.timestamp);
    }
    Ok(bars)
}

fn parse_number(row: usize, column: &'static str, raw: &str) -> Result<f64, LoadError> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| LoadError::BadValue {
        row,
        column,
        value: raw.to_string(),
    })
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and bare
/// dates (midnight). Offsets are converted to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
