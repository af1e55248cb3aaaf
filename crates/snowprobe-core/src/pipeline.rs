use polars::prelude::DataFrame;
use tracing::info;

use crate::calibration::{remove_calibration, CalibrationCounts};
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::outputs::CleanWriter;
use crate::record::ResolvedRecord;
use crate::schema::resolve_and_normalize;
use crate::transform::{CoordinateTransform, WGS84_EPSG};

/// The analysis-ready output for one raw file: cleaned records in original
/// order, their projected points, and the classifier's stage counts.
#[derive(Debug)]
pub struct CleanedFile {
    pub records: Vec<ResolvedRecord>,
    pub points: Vec<(f64, f64)>,
    pub counts: CalibrationCounts,
}

/// Runs the cleaning stages for one file at a time: schema resolution,
/// unit conversion, calibration removal, then the reprojection and
/// persistence handoffs. Any stage error aborts the file; nothing partial
/// is handed downstream.
pub struct CleaningPipeline<'a> {
    config: &'a CleaningConfig,
    transform: &'a dyn CoordinateTransform,
}

impl std::fmt::Debug for CleaningPipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleaningPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> CleaningPipeline<'a> {
    pub fn new(
        config: &'a CleaningConfig,
        transform: &'a dyn CoordinateTransform,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transform })
    }

    pub fn run(&self, raw: &DataFrame) -> Result<CleanedFile> {
        let records = resolve_and_normalize(raw)?;
        let (records, counts) = remove_calibration(
            records,
            &self.config.calibration_prefix,
            self.config.calibration_lower_bound,
            self.config.calibration_upper_bound,
        )?;

        let geographic: Vec<(f64, f64)> = records.iter().map(ResolvedRecord::point).collect();
        let points = self
            .transform
            .reproject(&geographic, WGS84_EPSG, self.config.target_epsg)?;

        info!(
            rows_in = counts.before(),
            rows_out = counts.after(),
            "file cleaned"
        );
        Ok(CleanedFile {
            records,
            points,
            counts,
        })
    }

    /// Run the pipeline, then hand the result to each persistence
    /// collaborator in turn.
    pub fn run_and_persist(
        &self,
        raw: &DataFrame,
        writers: &[&dyn CleanWriter],
    ) -> Result<CleanedFile> {
        let cleaned = self.run(raw)?;
        for writer in writers {
            writer.write(&cleaned.records, &cleaned.points)?;
        }
        Ok(cleaned)
    }
}
