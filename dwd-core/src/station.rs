//! Station catalog backed by the local reference file.
//!
//! The file is a comma separated table with a header row and eleven
//! positional columns:
//!
//! | index | column | type |
//! |-------|--------|------|
//! | 0 | pk | text |
//! | 1 | name | text |
//! | 2, 3 | x, y | float |
//! | 4, 5 | altitude, priority | integer |
//! | 6, 7, 8 | private, has measurement, has warnregion | flag |
//! | 9 | country | text |
//! | 10 | active | flag |
//!
//! Flags are small integers and count as set only when equal to `1`.

use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use csv::StringRecord;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::DwdError;
use crate::model::Station;

pub const DEFAULT_STATIONS_PATH: &str = "./stations.csv";

/// Lazily loaded, process-lifetime cache of the reference file.
///
/// The first successful [`StationCatalog::stations`] call reads and parses
/// the file; every later call returns the same set without touching the
/// file again. Failed loads leave the cache empty.
#[derive(Debug)]
pub struct StationCatalog {
    path: PathBuf,
    stations: Mutex<Option<Arc<[Station]>>>,
}

impl StationCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stations: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.stations.lock().is_some()
    }

    /// Return the cached stations, loading the reference file on first use.
    pub fn stations(&self) -> Result<Arc<[Station]>, DwdError> {
        // Held across the load so concurrent first callers read the file once.
        let mut cached = self.stations.lock();

        if let Some(stations) = cached.as_ref() {
            debug!(count = stations.len(), "Using cached stations");
            return Ok(Arc::clone(stations));
        }

        let stations: Arc<[Station]> = load_stations(&self.path)?.into();
        info!(
            count = stations.len(),
            path = %self.path.display(),
            "Loaded station catalog"
        );

        *cached = Some(Arc::clone(&stations));
        Ok(stations)
    }

    /// Look up a station by its identifier.
    pub fn find(&self, pk: &str) -> Result<Option<Station>, DwdError> {
        let stations = self.stations()?;
        Ok(stations.iter().find(|s| s.pk == pk).cloned())
    }
}

impl Default for StationCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_STATIONS_PATH)
    }
}

/// Read and parse a reference file without caching.
pub fn load_stations(path: &Path) -> Result<Vec<Station>, DwdError> {
    let file = File::open(path).map_err(|source| DwdError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_stations(file)
}

/// Parse reference file contents. The first row is a header and is skipped.
///
/// Any malformed row fails the whole parse.
pub fn parse_stations<R: Read>(reader: R) -> Result<Vec<Station>, DwdError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut stations = Vec::new();
    for record in reader.records() {
        stations.push(parse_station_record(&record?)?);
    }

    Ok(stations)
}

fn parse_station_record(record: &StringRecord) -> Result<Station, DwdError> {
    Ok(Station {
        pk: field(record, 0, "pk")?.to_string(),
        name: field(record, 1, "name")?.to_string(),
        x: parse_field(record, 2, "x")?,
        y: parse_field(record, 3, "y")?,
        altitude: parse_field(record, 4, "altitude")?,
        priority: parse_field(record, 5, "priority")?,
        private: parse_flag(record, 6, "private")?,
        has_measurement: parse_flag(record, 7, "has_measurement")?,
        has_warnregion: parse_flag(record, 8, "has_warnregion")?,
        country: field(record, 9, "country")?.to_string(),
        active: parse_flag(record, 10, "active")?,
    })
}

fn row_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    column: &'static str,
) -> Result<&'r str, DwdError> {
    record.get(index).ok_or_else(|| DwdError::InvalidField {
        row: row_of(record),
        column,
        value: String::new(),
        reason: format!("missing column {index}"),
    })
}

fn parse_field<T>(record: &StringRecord, index: usize, column: &'static str) -> Result<T, DwdError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = field(record, index, column)?;
    raw.parse().map_err(|e: T::Err| DwdError::InvalidField {
        row: row_of(record),
        column,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_flag(record: &StringRecord, index: usize, column: &'static str) -> Result<bool, DwdError> {
    let value: i8 = parse_field(record, index, column)?;
    Ok(value == 1)
}
