use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::{DailyTemperatureStats, DbError, Measurement, StationActivity};

/// Queries over the `measurement` table, bound to one session.
///
/// Dates are stored as `YYYY-MM-DD` text, so every range filter here is a
/// plain string comparison. Caller-supplied bounds are bound as-is.
pub struct MeasurementRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> MeasurementRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Maximum stored date, or `None` when the table is empty
    #[instrument(skip(self))]
    pub async fn most_recent_date(&mut self) -> Result<Option<String>, DbError> {
        let date = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM measurement")
            .fetch_one(&mut *self.conn)
            .await?;

        debug!("Most recent measurement date: {:?}", date);
        Ok(date)
    }

    /// Every measurement recorded on `date`, all stations
    #[instrument(skip(self))]
    pub async fn find_by_date(&mut self, date: &str) -> Result<Vec<Measurement>, DbError> {
        let measurements = sqlx::query_as::<_, Measurement>(
            r#"
            SELECT id, station, date, prcp, tobs
            FROM measurement
            WHERE date = ?
            ORDER BY station
            "#,
        )
        .bind(date)
        .fetch_all(&mut *self.conn)
        .await?;

        debug!("Found {} measurements on {}", measurements.len(), date);
        Ok(measurements)
    }

    /// `(date, prcp)` pairs on or after `since`, in store order
    #[instrument(skip(self))]
    pub async fn find_precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, DbError> {
        let rows = sqlx::query_as::<_, (String, Option<f64>)>(
            r#"
            SELECT date, prcp
            FROM measurement
            WHERE date >= ?
            "#,
        )
        .bind(since)
        .fetch_all(&mut *self.conn)
        .await?;

        debug!("Found {} precipitation rows since {}", rows.len(), since);
        Ok(rows)
    }

    /// Measurement counts per station, most active first.
    /// Equal counts order by station id.
    #[instrument(skip(self))]
    pub async fn station_activity(&mut self) -> Result<Vec<StationActivity>, DbError> {
        let activity = sqlx::query_as::<_, StationActivity>(
            r#"
            SELECT station, COUNT(station) AS observation_count
            FROM measurement
            GROUP BY station
            ORDER BY observation_count DESC, station ASC
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        debug!("Counted measurements for {} stations", activity.len());
        Ok(activity)
    }

    #[instrument(skip(self))]
    pub async fn most_active_station(&mut self) -> Result<Option<StationActivity>, DbError> {
        let leader = sqlx::query_as::<_, StationActivity>(
            r#"
            SELECT station, COUNT(station) AS observation_count
            FROM measurement
            GROUP BY station
            ORDER BY observation_count DESC, station ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(leader)
    }

    /// Temperature observations for one station on or after `since`, in store order
    #[instrument(skip(self))]
    pub async fn find_temperatures_since(
        &mut self,
        station: &str,
        since: &str,
    ) -> Result<Vec<f64>, DbError> {
        let temperatures = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT tobs
            FROM measurement
            WHERE station = ? AND date >= ?
            "#,
        )
        .bind(station)
        .bind(since)
        .fetch_all(&mut *self.conn)
        .await?;

        debug!(
            "Found {} temperature observations for {} since {}",
            temperatures.len(),
            station,
            since
        );
        Ok(temperatures)
    }

    /// Per-date min/avg/max temperature for `start <= date` and, when given, `date <= end`
    #[instrument(skip(self))]
    pub async fn daily_temperature_stats(
        &mut self,
        start: &str,
        end: Option<&str>,
    ) -> Result<Vec<DailyTemperatureStats>, DbError> {
        let stats = match end {
            Some(end) => {
                sqlx::query_as::<_, DailyTemperatureStats>(
                    r#"
                    SELECT date, MIN(tobs) AS min_tobs, AVG(tobs) AS avg_tobs, MAX(tobs) AS max_tobs
                    FROM measurement
                    WHERE date >= ? AND date <= ?
                    GROUP BY date
                    ORDER BY date
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(&mut *self.conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, DailyTemperatureStats>(
                    r#"
                    SELECT date, MIN(tobs) AS min_tobs, AVG(tobs) AS avg_tobs, MAX(tobs) AS max_tobs
                    FROM measurement
                    WHERE date >= ?
                    GROUP BY date
                    ORDER BY date
                    "#,
                )
                .bind(start)
                .fetch_all(&mut *self.conn)
                .await?
            }
        };

        debug!("Computed temperature stats for {} dates", stats.len());
        Ok(stats)
    }
}
