use thiserror::Error;

pub const WGS84_EPSG: u32 = 4326;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("source EPSG {from_epsg} is not supported: records enter the pipeline as EPSG 4326")]
    UnsupportedSource { from_epsg: u32 },

    #[error(
        "target EPSG {to_epsg} requires an external coordinate-transform service; \
         only the EPSG 4326 passthrough is built in"
    )]
    UnsupportedTarget { to_epsg: u32 },
}

/// Coordinate-transform collaborator. Geodetic reprojection is performed
/// outside this crate; integrators supply an implementation for projected
/// target systems.
pub trait CoordinateTransform {
    /// Transform `(x, y)` points from `from_epsg` to `to_epsg`, preserving
    /// order and length.
    fn reproject(
        &self,
        points: &[(f64, f64)],
        from_epsg: u32,
        to_epsg: u32,
    ) -> std::result::Result<Vec<(f64, f64)>, TransformError>;
}

/// The built-in transform: geographic coordinates stay geographic.
pub struct WgsPassthrough;

impl CoordinateTransform for WgsPassthrough {
    fn reproject(
        &self,
        points: &[(f64, f64)],
        from_epsg: u32,
        to_epsg: u32,
    ) -> std::result::Result<Vec<(f64, f64)>, TransformError> {
        if from_epsg != WGS84_EPSG {
            return Err(TransformError::UnsupportedSource { from_epsg });
        }
        if to_epsg != WGS84_EPSG {
            return Err(TransformError::UnsupportedTarget { to_epsg });
        }
        Ok(points.to_vec())
    }
}
