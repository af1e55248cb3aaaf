//! Maps arbitrary raw column names onto the canonical record fields.
//!
//! Probe firmware revisions disagree about how they label the geolocation
//! fix and the depth reading, so resolution runs as an ordered list of
//! matcher rules over the case-folded column names. The first rule that
//! resolves wins; an ambiguous match aborts the file instead of guessing.

use polars::prelude::*;
use tracing::debug;

use crate::error::{CleaningError, Result};
use crate::record::ResolvedRecord;

const TIMESTAMP_COLUMN: &str = "timestamp";
const COUNTER_COLUMN: &str = "counter";

/// Case-folded view of a raw table's column names. File-scoped: folding
/// happens once per file, never against global state.
struct ColumnCatalog {
    entries: Vec<CatalogEntry>,
}

struct CatalogEntry {
    folded: String,
    original: String,
}

impl ColumnCatalog {
    fn from_frame(df: &DataFrame) -> Self {
        let entries = df
            .get_column_names()
            .iter()
            .map(|name| CatalogEntry {
                folded: name.as_str().to_lowercase(),
                original: name.as_str().to_string(),
            })
            .collect();
        Self { entries }
    }

    /// All entries whose folded name contains `needle`, sorted
    /// lexicographically by folded name.
    fn matching(&self, needle: &str) -> Vec<&CatalogEntry> {
        let mut found: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.folded.contains(needle))
            .collect();
        found.sort_by(|a, b| a.folded.cmp(&b.folded));
        found
    }

    fn literal(&self, folded: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.folded == folded)
    }

    fn folded_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.folded.as_str()).collect()
    }
}

/// Where the latitude/longitude values live in the raw table.
#[derive(Debug, Clone)]
enum CoordinateSource {
    Paired {
        latitude: String,
        longitude: String,
    },
    SplitDegrees {
        latitude_int: String,
        latitude_frac: String,
        longitude_int: String,
        longitude_frac: String,
    },
}

/// Where the depth values live, and the unit they arrive in.
#[derive(Debug, Clone)]
enum DepthSource {
    Centimeters(String),
    Meters(String),
}

enum RuleOutcome<T> {
    Resolved(T),
    Ambiguous(String),
    NotFound,
}

struct CoordinateRule {
    name: &'static str,
    apply: fn(&ColumnCatalog) -> RuleOutcome<CoordinateSource>,
}

static COORDINATE_RULES: &[CoordinateRule] = &[
    CoordinateRule {
        name: "paired_tude",
        apply: paired_tude,
    },
    CoordinateRule {
        name: "literal_lat_lon",
        apply: literal_lat_lon,
    },
    CoordinateRule {
        name: "split_degrees",
        apply: split_degrees,
    },
];

/// Exactly two "tude" columns: alphabetical order puts `lat*` before
/// `lon*`, so the first is latitude.
fn paired_tude(catalog: &ColumnCatalog) -> RuleOutcome<CoordinateSource> {
    let tude = catalog.matching("tude");
    if tude.len() == 2 {
        RuleOutcome::Resolved(CoordinateSource::Paired {
            latitude: tude[0].original.clone(),
            longitude: tude[1].original.clone(),
        })
    } else {
        RuleOutcome::NotFound
    }
}

fn literal_lat_lon(catalog: &ColumnCatalog) -> RuleOutcome<CoordinateSource> {
    let Some(lat) = catalog.literal("lat") else {
        return RuleOutcome::NotFound;
    };
    match catalog.literal("lon") {
        Some(lon) => RuleOutcome::Resolved(CoordinateSource::Paired {
            latitude: lat.original.clone(),
            longitude: lon.original.clone(),
        }),
        None => RuleOutcome::Ambiguous("found a 'lat' column without a matching 'lon'".to_string()),
    }
}

/// Degrees split across integer-part ("_a") and decimal-fraction ("dd")
/// columns. Latitude sorts before longitude within each subset. The parts
/// combine additively; southern/eastern sign conventions are not handled.
fn split_degrees(catalog: &ColumnCatalog) -> RuleOutcome<CoordinateSource> {
    let tude = catalog.matching("tude");
    if tude.is_empty() {
        return RuleOutcome::NotFound;
    }

    let frac: Vec<&&CatalogEntry> = tude.iter().filter(|e| e.folded.contains("dd")).collect();
    let int_part: Vec<&&CatalogEntry> = tude.iter().filter(|e| e.folded.contains("_a")).collect();
    if frac.len() < 2 || int_part.len() < 2 {
        return RuleOutcome::Ambiguous(format!(
            "split-degree columns incomplete: {} decimal-fraction and {} integer-degree candidates",
            frac.len(),
            int_part.len()
        ));
    }

    RuleOutcome::Resolved(CoordinateSource::SplitDegrees {
        latitude_int: int_part[0].original.clone(),
        latitude_frac: frac[0].original.clone(),
        longitude_int: int_part[1].original.clone(),
        longitude_frac: frac[1].original.clone(),
    })
}

fn resolve_coordinates(catalog: &ColumnCatalog) -> Result<CoordinateSource> {
    for rule in COORDINATE_RULES {
        match (rule.apply)(catalog) {
            RuleOutcome::Resolved(source) => {
                debug!(rule = rule.name, "coordinate schema resolved");
                return Ok(source);
            }
            RuleOutcome::Ambiguous(reason) => {
                return Err(CleaningError::SchemaResolution {
                    field: "coordinates",
                    reason: format!("{}: {reason}", rule.name),
                });
            }
            RuleOutcome::NotFound => {}
        }
    }
    Err(CleaningError::SchemaResolution {
        field: "coordinates",
        reason: format!(
            "no rule matched the raw column names {:?}",
            catalog.folded_names()
        ),
    })
}

/// A single "depth" column is the source; among several, an explicit unit
/// marker decides. Unmarked depth-like columns (e.g. a probe's
/// `depthbattvolts` diagnostic) are never selected.
fn resolve_depth(catalog: &ColumnCatalog) -> Result<DepthSource> {
    let depth = catalog.matching("depth");
    match depth.len() {
        0 => Err(CleaningError::SchemaResolution {
            field: "depth",
            reason: "no raw column name contains 'depth'".to_string(),
        }),
        1 => {
            let entry = depth[0];
            if entry.folded.contains("cm") {
                Ok(DepthSource::Centimeters(entry.original.clone()))
            } else {
                Ok(DepthSource::Meters(entry.original.clone()))
            }
        }
        _ => {
            if let Some(entry) = depth.iter().find(|e| e.folded.contains("cm")) {
                Ok(DepthSource::Centimeters(entry.original.clone()))
            } else if let Some(entry) = depth.iter().find(|e| e.folded.contains("_m")) {
                Ok(DepthSource::Meters(entry.original.clone()))
            } else {
                Err(CleaningError::SchemaResolution {
                    field: "depth",
                    reason: format!(
                        "multiple depth-like columns and none marked 'cm' or '_m': {:?}",
                        depth.iter().map(|e| e.folded.as_str()).collect::<Vec<_>>()
                    ),
                })
            }
        }
    }
}

/// Resolve the raw table's schema and produce canonical records in file
/// order. Every selected cell must parse as a number; a cell that does not
/// aborts the whole file.
pub fn resolve_and_normalize(df: &DataFrame) -> Result<Vec<ResolvedRecord>> {
    let catalog = ColumnCatalog::from_frame(df);

    let coordinates = resolve_coordinates(&catalog)?;
    let depth_source = resolve_depth(&catalog)?;

    let timestamp_column = catalog
        .literal(TIMESTAMP_COLUMN)
        .ok_or_else(|| CleaningError::SchemaResolution {
            field: "timestamp",
            reason: "no raw column named 'timestamp'".to_string(),
        })?
        .original
        .clone();
    let counter_column = catalog
        .literal(COUNTER_COLUMN)
        .ok_or_else(|| CleaningError::SchemaResolution {
            field: "counter",
            reason: "no raw column named 'counter'; calibration screening needs it".to_string(),
        })?
        .original
        .clone();

    let timestamps = string_column(df, &timestamp_column)?;
    let counters = string_column(df, &counter_column)?;

    let (latitudes, longitudes) = match &coordinates {
        CoordinateSource::Paired {
            latitude,
            longitude,
        } => (numeric_column(df, latitude)?, numeric_column(df, longitude)?),
        CoordinateSource::SplitDegrees {
            latitude_int,
            latitude_frac,
            longitude_int,
            longitude_frac,
        } => {
            let lat_int = numeric_column(df, latitude_int)?;
            let lat_frac = numeric_column(df, latitude_frac)?;
            let lon_int = numeric_column(df, longitude_int)?;
            let lon_frac = numeric_column(df, longitude_frac)?;
            let latitudes = lat_int
                .iter()
                .zip(&lat_frac)
                .map(|(int, frac)| int + frac)
                .collect();
            let longitudes = lon_int
                .iter()
                .zip(&lon_frac)
                .map(|(int, frac)| int + frac)
                .collect();
            (latitudes, longitudes)
        }
    };

    let depths = match &depth_source {
        DepthSource::Centimeters(column) => numeric_column(df, column)?
            .into_iter()
            .map(|cm| cm / 100.0)
            .collect(),
        DepthSource::Meters(column) => numeric_column(df, column)?,
    };

    let records = timestamps
        .into_iter()
        .zip(counters)
        .zip(latitudes.into_iter().zip(longitudes).zip(depths))
        .enumerate()
        .map(
            |(sequence_index, ((timestamp, counter), ((latitude, longitude), depth_m)))| {
                ResolvedRecord {
                    timestamp,
                    counter,
                    latitude,
                    longitude,
                    depth_m,
                    sequence_index,
                }
            },
        )
        .collect();

    Ok(records)
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    Ok(values
        .into_iter()
        .map(|cell| cell.unwrap_or("").to_string())
        .collect())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.str()?;
    let mut parsed = Vec::with_capacity(values.len());
    for (row_index, cell) in values.into_iter().enumerate() {
        let text = cell.unwrap_or("").trim();
        match text.parse::<f64>() {
            Ok(value) => parsed.push(value),
            Err(_) => {
                return Err(CleaningError::UnitConversion {
                    column: name.to_string(),
                    row_index,
                    value: text.to_string(),
                })
            }
        }
    }
    Ok(parsed)
}
