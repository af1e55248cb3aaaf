use std::fs;

use geojson::GeoJson;
use polars::prelude::*;

use snowprobe_core::error::CleaningError;
use snowprobe_core::outputs::{CleanWriter, CsvWriter, GeoJsonWriter};
use snowprobe_core::transform::{CoordinateTransform, TransformError};
use snowprobe_core::{CleaningConfig, CleaningPipeline, WgsPassthrough};

fn raw_probe_frame() -> DataFrame {
    // four real readings, one prefixed calibration row, one low/high pair
    let timestamps = vec!["t0", "t1", "t2", "t3", "t4", "t5", "t6"];
    let counters = vec!["1", "2", "9903", "4", "5", "6", "7"];
    let latitudes = vec!["64.10", "64.11", "64.11", "64.12", "64.13", "64.14", "64.15"];
    let longitudes = vec![
        "-147.20", "-147.21", "-147.21", "-147.22", "-147.23", "-147.24", "-147.25",
    ];
    let depths_cm = vec!["50.0", "48.0", "60.0", "1.0", "120.0", "47.0", "49.0"];

    DataFrame::new(vec![
        Series::new("timestamp".into(), timestamps).into(),
        Series::new("counter".into(), counters).into(),
        Series::new("Latitude".into(), latitudes).into(),
        Series::new("Longitude".into(), longitudes).into(),
        Series::new("DepthCm".into(), depths_cm).into(),
    ])
    .expect("raw frame construction failed")
}

#[test]
fn pipeline_cleans_resolves_and_projects_in_order() {
    let config = CleaningConfig::default();
    let transform = WgsPassthrough;
    let pipeline = CleaningPipeline::new(&config, &transform).expect("pipeline setup failed");

    let cleaned = pipeline.run(&raw_probe_frame()).expect("pipeline run failed");

    // row 2 goes to the prefix detector, rows 3 and 4 to the pattern detector
    let survivors: Vec<usize> = cleaned.records.iter().map(|r| r.sequence_index).collect();
    assert_eq!(survivors, vec![0, 1, 5, 6]);
    assert_eq!(cleaned.counts.before(), 7);
    assert_eq!(cleaned.counts.rows_after_prefix, 6);
    assert_eq!(cleaned.counts.after(), 4);

    // depth arrived in centimeters
    assert_eq!(cleaned.records[0].depth_m, 0.50);

    // passthrough projection: x/y mirror lon/lat, order preserved
    assert_eq!(cleaned.points.len(), cleaned.records.len());
    assert_eq!(cleaned.points[0], (-147.20, 64.10));
    assert_eq!(cleaned.points[3], (-147.25, 64.15));
}

#[test]
fn pipeline_writes_csv_and_geojson_through_the_persistence_seam() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let csv_path = dir.path().join("clean.csv");
    let geojson_path = dir.path().join("clean.geojson");

    let config = CleaningConfig::default();
    let transform = WgsPassthrough;
    let pipeline = CleaningPipeline::new(&config, &transform).expect("pipeline setup failed");

    let csv_writer = CsvWriter::new(&csv_path, &config.columns_to_keep);
    let geojson_writer = GeoJsonWriter::new(&geojson_path);
    let writers: [&dyn CleanWriter; 2] = [&csv_writer, &geojson_writer];

    let cleaned = pipeline
        .run_and_persist(&raw_probe_frame(), &writers)
        .expect("pipeline persist failed");

    let csv_text = fs::read_to_string(&csv_path).expect("CSV missing");
    let mut lines = csv_text.lines();
    assert_eq!(
        lines.next(),
        Some("timestamp,counter,latitude,longitude,depth_m,x,y")
    );
    assert_eq!(lines.count(), cleaned.records.len());

    let geojson_text = fs::read_to_string(&geojson_path).expect("GeoJSON missing");
    let parsed: GeoJson = geojson_text.parse().expect("invalid GeoJSON output");
    match parsed {
        GeoJson::FeatureCollection(collection) => {
            assert_eq!(collection.features.len(), cleaned.records.len());
            let feature = &collection.features[0];
            let properties = feature.properties.as_ref().expect("missing properties");
            assert_eq!(
                properties.get("counter").and_then(|v| v.as_str()),
                Some("1")
            );
            assert_eq!(
                properties.get("depth_m").and_then(|v| v.as_f64()),
                Some(0.50)
            );
        }
        other => panic!("expected a FeatureCollection, got {other:?}"),
    }
}

struct OffsetTransform;

impl CoordinateTransform for OffsetTransform {
    fn reproject(
        &self,
        points: &[(f64, f64)],
        _from_epsg: u32,
        _to_epsg: u32,
    ) -> Result<Vec<(f64, f64)>, TransformError> {
        Ok(points.iter().map(|(x, y)| (x + 100.0, y + 200.0)).collect())
    }
}

#[test]
fn projected_points_flow_from_the_transform_collaborator() {
    let mut config = CleaningConfig::default();
    config.target_epsg = 32606;
    let transform = OffsetTransform;
    let pipeline = CleaningPipeline::new(&config, &transform).expect("pipeline setup failed");

    let cleaned = pipeline.run(&raw_probe_frame()).expect("pipeline run failed");
    assert_eq!(cleaned.points[0], (-47.20, 264.10));
    // geographic coordinates on the records stay untouched
    assert_eq!(cleaned.records[0].longitude, -147.20);
}

#[test]
fn projected_target_without_a_transform_service_fails_fast() {
    let mut config = CleaningConfig::default();
    config.target_epsg = 32606;
    let transform = WgsPassthrough;
    let pipeline = CleaningPipeline::new(&config, &transform).expect("pipeline setup failed");

    let err = pipeline
        .run(&raw_probe_frame())
        .expect_err("unsupported EPSG should fail");
    match err {
        CleaningError::Transform(TransformError::UnsupportedTarget { to_epsg }) => {
            assert_eq!(to_epsg, 32606)
        }
        other => panic!("expected Transform error, got {other:?}"),
    }
}

#[test]
fn invalid_configuration_is_rejected_before_processing() {
    let mut config = CleaningConfig::default();
    config.calibration_lower_bound = 2.0;
    let transform = WgsPassthrough;

    match CleaningPipeline::new(&config, &transform) {
        Err(CleaningError::Configuration { .. }) => {}
        other => panic!("expected Configuration error, got {other:?}"),
    }

    let mut config = CleaningConfig::default();
    config.columns_to_keep = vec!["timestamp".to_string(), "voltage".to_string()];
    match CleaningPipeline::new(&config, &transform) {
        Err(CleaningError::Configuration { message }) => {
            assert!(message.contains("voltage"), "unexpected message: {message}")
        }
        other => panic!("expected Configuration error, got {other:?}"),
    }
}
