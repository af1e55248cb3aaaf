use std::fs;
use std::path::PathBuf;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};

use crate::error::{CleaningError, Result};
use crate::record::ResolvedRecord;

/// Persistence collaborator: accepts the final record sequence plus its
/// projected geometry and writes it somewhere.
pub trait CleanWriter {
    fn write(&self, records: &[ResolvedRecord], projected: &[(f64, f64)]) -> Result<()>;
}

/// Delimited-text output. Column order follows `columns_to_keep`, with the
/// projected `x`/`y` appended.
pub struct CsvWriter {
    path: PathBuf,
    columns: Vec<String>,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>, columns_to_keep: &[String]) -> Self {
        Self {
            path: path.into(),
            columns: columns_to_keep.to_vec(),
        }
    }
}

impl CleanWriter for CsvWriter {
    fn write(&self, records: &[ResolvedRecord], projected: &[(f64, f64)]) -> Result<()> {
        if records.len() != projected.len() {
            return Err(CleaningError::GeometryMismatch {
                records: records.len(),
                points: projected.len(),
            });
        }

        let mut writer = csv::Writer::from_path(&self.path)?;

        let mut header: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        header.push("x");
        header.push("y");
        writer.write_record(&header)?;

        for (record, (x, y)) in records.iter().zip(projected) {
            let mut row: Vec<String> = Vec::with_capacity(header.len());
            for column in &self.columns {
                row.push(match column.as_str() {
                    "timestamp" => record.timestamp.clone(),
                    "counter" => record.counter.clone(),
                    "latitude" => record.latitude.to_string(),
                    "longitude" => record.longitude.to_string(),
                    "depth_m" => record.depth_m.to_string(),
                    other => {
                        return Err(CleaningError::Configuration {
                            message: format!("unknown output column '{other}'"),
                        })
                    }
                });
            }
            row.push(x.to_string());
            row.push(y.to_string());
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// GIS vector output: a GeoJSON FeatureCollection of point features.
/// GeoJSON mandates WGS84, so positions come from the records' geographic
/// coordinates rather than the projected points.
pub struct GeoJsonWriter {
    path: PathBuf,
}

impl GeoJsonWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CleanWriter for GeoJsonWriter {
    fn write(&self, records: &[ResolvedRecord], _projected: &[(f64, f64)]) -> Result<()> {
        let features = records
            .iter()
            .map(|record| {
                let geometry = Geometry::new(geojson::Value::Point(vec![
                    record.longitude,
                    record.latitude,
                ]));
                let mut properties = JsonObject::new();
                properties.insert(
                    "timestamp".to_string(),
                    JsonValue::from(record.timestamp.as_str()),
                );
                properties.insert(
                    "counter".to_string(),
                    JsonValue::from(record.counter.as_str()),
                );
                properties.insert("depth_m".to_string(), JsonValue::from(record.depth_m));
                Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        fs::write(&self.path, GeoJson::FeatureCollection(collection).to_string())?;
        Ok(())
    }
}
