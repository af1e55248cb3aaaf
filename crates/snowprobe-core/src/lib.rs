pub mod calibration;
pub mod config;
pub mod error;
pub mod outputs;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod transform;

pub use calibration::{remove_calibration, CalibrationCounts};
pub use config::CleaningConfig;
pub use error::{CleaningError, Result};
pub use pipeline::{CleanedFile, CleaningPipeline};
pub use record::{ResolvedRecord, CANONICAL_COLUMNS};
pub use schema::resolve_and_normalize;
pub use transform::{CoordinateTransform, TransformError, WgsPassthrough, WGS84_EPSG};
