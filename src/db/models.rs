use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use sqlx::FromRow;

// Database entity models, mirroring the externally populated tables
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Measurement {
    pub id: i64,
    pub station: String,
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Station {
    pub id: i64,
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

// Aggregate rows

/// Min/avg/max temperature observed on one date.
///
/// Serialized as a positional `[date, min, avg, max]` array, which is the
/// shape API clients of the stats routes consume.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DailyTemperatureStats {
    pub date: String,
    pub min_tobs: f64,
    pub avg_tobs: f64,
    pub max_tobs: f64,
}

impl Serialize for DailyTemperatureStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.date)?;
        tuple.serialize_element(&self.min_tobs)?;
        tuple.serialize_element(&self.avg_tobs)?;
        tuple.serialize_element(&self.max_tobs)?;
        tuple.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StationActivity {
    pub station: String,
    pub observation_count: i64,
}
