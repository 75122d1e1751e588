use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::db::{
    DailyTemperatureStats, DbError, DbPool, Measurement, MeasurementRepository, Station,
    StationActivity, StationRepository,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The trailing-year window: `[most_recent - 365 days, most_recent]`, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrailingYear {
    pub most_recent: NaiveDate,
    pub cutoff: NaiveDate,
}

impl TrailingYear {
    pub const DAYS: i64 = 365;

    pub fn ending_at(most_recent: NaiveDate) -> Self {
        Self {
            most_recent,
            cutoff: most_recent - Duration::days(Self::DAYS),
        }
    }

    /// Build the window from a stored `YYYY-MM-DD` date
    pub fn from_stored_date(date: &str) -> Result<Self, DbError> {
        NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map(Self::ending_at)
            .map_err(|_| DbError::MalformedStoredDate(date.to_string()))
    }

    /// Cutoff in the textual form dates are stored in
    pub fn cutoff_param(&self) -> String {
        self.cutoff.format(DATE_FORMAT).to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.cutoff && date <= self.most_recent
    }
}

/// The canned climate queries. Every operation runs on a single session
/// checked out from the pool and returned when the operation ends.
#[derive(Clone)]
pub struct ClimateService {
    pool: DbPool,
}

impl ClimateService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Trailing-year window ending at the most recent measurement
    #[instrument(skip(self))]
    pub async fn trailing_year(&self) -> Result<TrailingYear, DbError> {
        let mut session = self.pool.session().await?;
        let mut measurements = MeasurementRepository::new(&mut session);
        let window = Self::trailing_year_in(&mut measurements).await?;
        Ok(window)
    }

    /// Precipitation by date over the trailing year.
    ///
    /// When several stations report the same date, the row the store yields
    /// last wins. That order is not defined, so for such dates the value may
    /// come from any of the reporting stations.
    #[instrument(skip(self))]
    pub async fn precipitation_last_year(&self) -> Result<BTreeMap<String, Option<f64>>, DbError> {
        let mut session = self.pool.session().await?;
        let mut measurements = MeasurementRepository::new(&mut session);

        let window = Self::trailing_year_in(&mut measurements).await?;
        let rows = measurements
            .find_precipitation_since(&window.cutoff_param())
            .await?;

        let mut by_date = BTreeMap::new();
        for (date, prcp) in rows {
            by_date.insert(date, prcp);
        }

        info!(
            "Collected precipitation for {} dates since {}",
            by_date.len(),
            window.cutoff
        );
        Ok(by_date)
    }

    #[instrument(skip(self))]
    pub async fn all_stations(&self) -> Result<Vec<String>, DbError> {
        let mut session = self.pool.session().await?;
        let stations = StationRepository::new(&mut session)
            .distinct_station_ids()
            .await?;

        info!("Collected {} distinct stations", stations.len());
        Ok(stations)
    }

    #[instrument(skip(self))]
    pub async fn station(&self, station: &str) -> Result<Option<Station>, DbError> {
        let mut session = self.pool.session().await?;
        let found = StationRepository::new(&mut session)
            .find_by_id(station)
            .await?;
        Ok(found)
    }

    /// Stations with their measurement counts, most active first
    #[instrument(skip(self))]
    pub async fn station_activity(&self) -> Result<Vec<StationActivity>, DbError> {
        let mut session = self.pool.session().await?;
        let activity = MeasurementRepository::new(&mut session)
            .station_activity()
            .await?;
        Ok(activity)
    }

    /// Station with the most measurement rows; ties go to the smallest station id
    #[instrument(skip(self))]
    pub async fn most_active_station(&self) -> Result<StationActivity, DbError> {
        let mut session = self.pool.session().await?;
        let leader = MeasurementRepository::new(&mut session)
            .most_active_station()
            .await?;
        leader.ok_or(DbError::EmptyDataset)
    }

    /// Temperature observations of the most active station over the trailing year
    #[instrument(skip(self))]
    pub async fn most_active_station_temperatures(&self) -> Result<Vec<f64>, DbError> {
        let mut session = self.pool.session().await?;
        let mut measurements = MeasurementRepository::new(&mut session);

        let window = Self::trailing_year_in(&mut measurements).await?;
        let leader = measurements
            .most_active_station()
            .await?
            .ok_or(DbError::EmptyDataset)?;

        debug!(
            "Most active station is {} with {} measurements",
            leader.station, leader.observation_count
        );

        let temperatures = measurements
            .find_temperatures_since(&leader.station, &window.cutoff_param())
            .await?;

        info!(
            "Collected {} temperature observations for {} since {}",
            temperatures.len(),
            leader.station,
            window.cutoff
        );
        Ok(temperatures)
    }

    /// Per-date temperature stats for every date on or after `start`.
    /// `start` is compared as text and not validated.
    #[instrument(skip(self))]
    pub async fn temperature_stats_from(
        &self,
        start: &str,
    ) -> Result<Vec<DailyTemperatureStats>, DbError> {
        let mut session = self.pool.session().await?;
        let stats = MeasurementRepository::new(&mut session)
            .daily_temperature_stats(start, None)
            .await?;

        info!("Computed temperature stats for {} dates from {}", stats.len(), start);
        Ok(stats)
    }

    /// Per-date temperature stats for `start..=end`, compared as text
    #[instrument(skip(self))]
    pub async fn temperature_stats_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailyTemperatureStats>, DbError> {
        let mut session = self.pool.session().await?;
        let stats = MeasurementRepository::new(&mut session)
            .daily_temperature_stats(start, Some(end))
            .await?;

        info!(
            "Computed temperature stats for {} dates from {} to {}",
            stats.len(),
            start,
            end
        );
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn measurements_on(&self, date: &str) -> Result<Vec<Measurement>, DbError> {
        let mut session = self.pool.session().await?;
        let measurements = MeasurementRepository::new(&mut session)
            .find_by_date(date)
            .await?;
        Ok(measurements)
    }

    async fn trailing_year_in(
        measurements: &mut MeasurementRepository<'_>,
    ) -> Result<TrailingYear, DbError> {
        let most_recent = measurements
            .most_recent_date()
            .await?
            .ok_or(DbError::EmptyDataset)?;
        TrailingYear::from_stored_date(&most_recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_year_cutoff() {
        let window = TrailingYear::from_stored_date("2017-08-23").unwrap();
        assert_eq!(window.cutoff, NaiveDate::from_ymd_opt(2016, 8, 23).unwrap());
        assert_eq!(window.cutoff_param(), "2016-08-23");
    }

    #[test]
    fn test_trailing_year_spans_leap_day() {
        // 2016 is a leap year, so 365 days back lands one day later than the calendar date
        let window = TrailingYear::from_stored_date("2016-03-01").unwrap();
        assert_eq!(window.cutoff_param(), "2015-03-02");
    }

    #[test]
    fn test_trailing_year_contains_bounds() {
        let window = TrailingYear::from_stored_date("2017-08-23").unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2016, 8, 23).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2017, 8, 23).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2016, 8, 22).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2017, 8, 24).unwrap()));
    }

    #[test]
    fn test_trailing_year_rejects_malformed_date() {
        let result = TrailingYear::from_stored_date("08/23/2017");
        assert!(matches!(result, Err(DbError::MalformedStoredDate(d)) if d == "08/23/2017"));
    }
}
