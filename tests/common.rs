#![allow(dead_code)]

use climate_query_service::db::DbPool;
use climate_query_service::services::ClimateService;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Fresh in-memory store with the climate schema.
/// Limited to a single connection so every session sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn service(pool: &SqlitePool) -> ClimateService {
    ClimateService::new(DbPool::new(pool.clone()))
}

pub async fn insert_station(pool: &SqlitePool, station: &str, name: &str) {
    sqlx::query(
        "INSERT INTO station (station, name, latitude, longitude, elevation) VALUES (?, ?, 21.3, -157.8, 3.0)",
    )
    .bind(station)
    .bind(name)
    .execute(pool)
    .await
    .expect("Failed to insert station");
}

pub async fn insert_measurement(
    pool: &SqlitePool,
    station: &str,
    date: &str,
    prcp: Option<f64>,
    tobs: f64,
) {
    sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
        .bind(station)
        .bind(date)
        .bind(prcp)
        .bind(tobs)
        .execute(pool)
        .await
        .expect("Failed to insert measurement");
}

/// Three measurements across two stations, most recent date 2017-08-23
pub async fn seed_small_scenario(pool: &SqlitePool) {
    insert_station(pool, "USC1", "Station One").await;
    insert_station(pool, "USC2", "Station Two").await;

    insert_measurement(pool, "USC1", "2017-08-01", Some(0.5), 80.0).await;
    insert_measurement(pool, "USC1", "2017-08-23", Some(0.0), 82.0).await;
    insert_measurement(pool, "USC2", "2017-08-23", None, 79.0).await;
}

/// Two years of data where USC00519281 clearly out-reports the others
pub async fn seed_active_station_scenario(pool: &SqlitePool) {
    insert_station(pool, "USC00519281", "WAIHEE 837.5, HI US").await;
    insert_station(pool, "USC00519397", "WAIKIKI 717.2, HI US").await;
    insert_station(pool, "USC00513117", "KANEOHE 838.1, HI US").await;

    // Outside the trailing year (cutoff is 2016-08-23)
    insert_measurement(pool, "USC00519281", "2016-01-10", Some(0.1), 65.0).await;
    insert_measurement(pool, "USC00519281", "2016-08-22", Some(0.2), 70.0).await;

    // Inside the trailing year
    insert_measurement(pool, "USC00519281", "2016-08-23", Some(0.3), 77.0).await;
    insert_measurement(pool, "USC00519281", "2017-02-14", None, 69.0).await;
    insert_measurement(pool, "USC00519281", "2017-08-18", Some(0.06), 79.0).await;

    insert_measurement(pool, "USC00519397", "2017-02-14", Some(0.0), 72.0).await;
    insert_measurement(pool, "USC00519397", "2017-08-23", Some(0.0), 81.0).await;

    insert_measurement(pool, "USC00513117", "2017-08-23", Some(0.15), 76.0).await;
}
