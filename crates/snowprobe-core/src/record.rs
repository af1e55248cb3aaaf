use serde::Serialize;

/// Canonical output fields every raw schema variant is mapped into.
pub const CANONICAL_COLUMNS: [&str; 5] =
    ["timestamp", "counter", "latitude", "longitude", "depth_m"];

/// One cleaned probe reading.
///
/// `sequence_index` is the record's 0-based position in the original file
/// order. The calibration classifier reads depth neighbors by position, so
/// any upstream reordering invalidates its verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub timestamp: String,
    pub counter: String,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_m: f64,
    pub sequence_index: usize,
}

impl ResolvedRecord {
    /// The record's `(longitude, latitude)` point, in that axis order.
    pub fn point(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}
