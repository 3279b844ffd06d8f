//! Geospatial mappers.

use crate::error::{Error, Result};
use crate::ops::Mapper;
use crate::record::{field, Record, Value};
use std::f64::consts::PI;

const EARTH_RADIUS_KM: f64 = 6373.0;

/// Great-circle distance in kilometers between two `[lon, lat]` coordinate
/// columns, stored in a result column.
///
/// The distance is symmetric in start/end and zero for coincident
/// endpoints.
pub struct HaversineDistance {
    result_column: String,
    start: String,
    end: String,
}

impl HaversineDistance {
    pub fn new(
        result_column: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            result_column: result_column.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Mapper for HaversineDistance {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let (lon1, lat1) = coordinate(&row, &self.start)?;
        let (lon2, lat2) = coordinate(&row, &self.end)?;
        let lat1 = lat1 / 180.0 * PI;
        let lon1 = lon1 / 180.0 * PI;
        let lat2 = lat2 / 180.0 * PI;
        let lon2 = lon2 / 180.0 * PI;
        let cosine = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
        // Rounding can push the cosine a hair past ±1, which acos rejects.
        let distance = cosine.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_KM;
        row.insert(self.result_column.clone(), Value::from(distance));
        Ok(vec![row])
    }
}

/// Read a `[lon, lat]` pair from a column.
fn coordinate(row: &Record, name: &str) -> Result<(f64, f64)> {
    let mismatch = || Error::FieldType {
        field: name.to_owned(),
        expected: "a [lon, lat] coordinate pair",
    };
    let Value::Array(parts) = field(row, name)? else {
        return Err(mismatch());
    };
    match parts.as_slice() {
        [lon, lat] => {
            let lon = lon.as_f64().ok_or_else(mismatch)?;
            let lat = lat.as_f64().ok_or_else(mismatch)?;
            Ok((lon, lat))
        }
        _ => Err(mismatch()),
    }
}
