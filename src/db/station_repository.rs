use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::db::{DbError, Station};

pub struct StationRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> StationRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Each station id once, ascending
    #[instrument(skip(self))]
    pub async fn distinct_station_ids(&mut self) -> Result<Vec<String>, DbError> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT station
            FROM station
            GROUP BY station
            ORDER BY station
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        debug!("Found {} distinct stations", ids.len());
        Ok(ids)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&mut self, station: &str) -> Result<Option<Station>, DbError> {
        let row = sqlx::query_as::<_, Station>(
            r#"
            SELECT id, station, name, latitude, longitude, elevation
            FROM station
            WHERE station = ?
            LIMIT 1
            "#,
        )
        .bind(station)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row)
    }
}
