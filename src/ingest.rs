//! Reads the cell dump into sites and cells.
//!
//! A missing column rejects the whole upload before any row is looked at. Rows
//! that can't be parsed are dropped one by one and reported in the
//! [`BatchSummary`], so a dump with a few broken lines still produces a map.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{info, warn};
use serde::Deserialize;

use crate::{
    error::{ConvertError, Result},
    model::{Cell, CellType, Site},
    registry::SiteRegistry,
};

pub const REQUIRED_COLUMNS: [&str; 15] = [
    "SITEID",
    "LAT",
    "LONG",
    "CELLNAME",
    "CELLID",
    "SYS",
    "ARFCN/UARFCN/EARFCN/NR-ARFCN",
    "AZIMUTH",
    "ANT_HEIGHT",
    "TILT",
    "HBW",
    "VBW",
    "DATA",
    "PLT",
    "TYPE",
];

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "SITEID")]
    site_id: String,
    #[serde(rename = "LAT")]
    latitude: f64,
    #[serde(rename = "LONG")]
    longitude: f64,
    #[serde(rename = "CELLNAME")]
    cell_name: String,
    #[serde(rename = "CELLID")]
    cell_id: String,
    #[serde(rename = "SYS")]
    system: String,
    #[serde(rename = "ARFCN/UARFCN/EARFCN/NR-ARFCN")]
    frequency: String,
    #[serde(rename = "AZIMUTH")]
    azimuth: f64,
    #[serde(rename = "ANT_HEIGHT")]
    height: f64,
    #[serde(rename = "TILT")]
    tilt: f64,
    #[serde(rename = "HBW")]
    horizontal_beamwidth: f64,
    #[serde(rename = "VBW")]
    vertical_beamwidth: f64,
    #[serde(rename = "DATA")]
    traffic: f64,
    #[serde(rename = "PLT")]
    tier: f64,
    #[serde(rename = "TYPE")]
    cell_type: u8,
    #[serde(rename = "VENDOR", default)]
    vendor: Option<String>,
    #[serde(rename = "DESC", default)]
    description: Option<String>,
    #[serde(rename = "PROVINCE", default)]
    province: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// 1-based line in the input, header included.
    pub line: u64,
    pub reason: String,
}

/// Result of parsing one data row.
#[derive(Debug)]
pub enum RowOutcome {
    /// The cell's `site` index is filled in once the site is registered.
    Accepted(Site, Cell),
    Dropped(DroppedRow),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub rows: usize,
    pub cells: usize,
    pub sites: usize,
    pub dropped: Vec<DroppedRow>,
}

#[derive(Debug)]
pub struct Batch {
    pub registry: SiteRegistry,
    pub cells: Vec<Cell>,
    pub summary: BatchSummary,
}

/// Opens `input` as csv and checks the header row for every column in `required`.
///
/// Only the header is read, so this fails before any data row is touched.
pub(crate) fn open<'a>(
    input: &'a [u8],
    required: &[&str],
    trim: Trim,
) -> Result<(csv::Reader<&'a [u8]>, StringRecord)> {
    let input = input.strip_prefix(b"\xef\xbb\xbf").unwrap_or(input);
    let mut reader = ReaderBuilder::new().trim(trim).from_reader(input);
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConvertError::MissingColumns(missing));
    }

    Ok((reader, headers))
}

pub(crate) fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

pub(crate) fn line_of_error(error: &csv::Error) -> u64 {
    error.position().map(|p| p.line()).unwrap_or_default()
}

pub fn ingest(input: &[u8]) -> Result<Batch> {
    let (mut reader, headers) = open(input, &REQUIRED_COLUMNS, Trim::All)?;

    let mut registry = SiteRegistry::default();
    let mut cells = Vec::new();
    let mut summary = BatchSummary::default();

    for result in reader.records() {
        summary.rows += 1;
        let outcome = match result {
            Ok(row) => parse_row(&row, &headers),
            Err(e) => RowOutcome::Dropped(DroppedRow {
                line: line_of_error(&e),
                reason: e.to_string(),
            }),
        };

        match outcome {
            RowOutcome::Accepted(site, mut cell) => {
                cell.site = registry.insert(site);
                cells.push(cell);
            }
            RowOutcome::Dropped(dropped) => {
                warn!("skipping line {}: {}", dropped.line, dropped.reason);
                summary.dropped.push(dropped);
            }
        }
    }

    if registry.is_empty() || cells.is_empty() {
        return Err(ConvertError::NoValidData);
    }
    registry.count(&cells);

    summary.cells = cells.len();
    summary.sites = registry.len();
    info!(
        "ingested {} rows: {} cells on {} sites, {} dropped",
        summary.rows,
        summary.cells,
        summary.sites,
        summary.dropped.len()
    );

    Ok(Batch {
        registry,
        cells,
        summary,
    })
}

pub fn parse_row(row: &StringRecord, headers: &StringRecord) -> RowOutcome {
    let line = line_of(row);
    let dropped = |reason: String| RowOutcome::Dropped(DroppedRow { line, reason });

    let record: Record = match row.deserialize(Some(headers)) {
        Ok(x) => x,
        Err(e) => return dropped(e.to_string()),
    };
    if let Err(reason) = check_record(&record) {
        return dropped(reason);
    }
    let Some(cell_type) = CellType::from_repr(record.cell_type) else {
        return dropped(format!("unknown cell type {}", record.cell_type));
    };

    let vendor = record.vendor.unwrap_or_default();
    let site = Site {
        id: record.site_id.clone(),
        latitude: record.latitude,
        longitude: record.longitude,
        description: record.description.unwrap_or_default(),
        province: record.province.unwrap_or_default(),
        vendor: vendor.clone(),
        tier: record.tier.round().clamp(1.0, 6.0) as u8,
    };
    let cell = Cell {
        site_id: record.site_id,
        site: 0,
        name: record.cell_name,
        id: record.cell_id,
        technology: record.system,
        frequency: record.frequency,
        azimuth: record.azimuth.rem_euclid(360.0),
        height: record.height,
        tilt: record.tilt,
        horizontal_beamwidth: record.horizontal_beamwidth,
        vertical_beamwidth: record.vertical_beamwidth,
        traffic: record.traffic,
        vendor,
        cell_type,
    };
    RowOutcome::Accepted(site, cell)
}

/// Value checks the csv deserializer can't express.
fn check_record(record: &Record) -> std::result::Result<(), String> {
    let numbers = [
        ("LAT", record.latitude),
        ("LONG", record.longitude),
        ("AZIMUTH", record.azimuth),
        ("ANT_HEIGHT", record.height),
        ("TILT", record.tilt),
        ("HBW", record.horizontal_beamwidth),
        ("VBW", record.vertical_beamwidth),
        ("DATA", record.traffic),
        ("PLT", record.tier),
    ];
    if let Some((column, value)) = numbers.iter().find(|(_, value)| !value.is_finite()) {
        return Err(format!("{column} is not a finite number: {value}"));
    }

    if !(-90.0..=90.0).contains(&record.latitude) {
        return Err(format!("latitude out of range: {}", record.latitude));
    }
    if !(-180.0..=180.0).contains(&record.longitude) {
        return Err(format!("longitude out of range: {}", record.longitude));
    }
    if record.traffic < 0.0 {
        return Err(format!("negative traffic: {}", record.traffic));
    }
    if record.site_id.is_empty() {
        return Err("empty site id".to_owned());
    }

    Ok(())
}
