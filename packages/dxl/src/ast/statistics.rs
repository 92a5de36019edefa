//! Histogram buckets and derived statistics.

use serde::Serialize;

use super::Datum;

/// One end of a histogram bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketBound {
    pub closed: bool,
    pub datum: Datum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsBucket {
    pub frequency: f64,
    pub distinct_values: f64,
    pub lower: BucketBound,
    pub upper: BucketBound,
}

/// Derived statistics of one output column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumnStats {
    pub col_id: u32,
    pub width: f64,
    pub null_freq: f64,
    pub ndv_remain: f64,
    pub freq_remain: f64,
    pub buckets: Vec<StatsBucket>,
}

/// Derived statistics of an operator's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRelationStats {
    pub rows: f64,
    pub empty: bool,
    pub columns: Vec<DerivedColumnStats>,
}

impl DerivedRelationStats {
    #[must_use]
    pub fn column(&self, col_id: u32) -> Option<&DerivedColumnStats> {
        self.columns.iter().find(|c| c.col_id == col_id)
    }
}
