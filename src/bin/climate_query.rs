use clap::{Parser, Subcommand};
use serde::Serialize;

use climate_query_service::config::DEFAULT_DATABASE_URL;
use climate_query_service::db::DbPool;
use climate_query_service::services::ClimateService;

#[derive(Parser)]
#[command(name = "climate-query")]
#[command(about = "Run the climate queries against a dataset and print JSON", long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env, default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Precipitation by date for the trailing year
    Precipitation,
    /// All station ids
    Stations,
    /// Metadata for one station
    Station { station_id: String },
    /// Trailing-year temperatures of the most active station
    Tobs,
    /// Measurement counts per station, most active first
    ActiveStations,
    /// Trailing-year window of the dataset
    Window,
    /// Min/avg/max temperature per date from START, optionally up to END
    Stats { start: String, end: Option<String> },
    /// Every measurement on one date
    Day { date: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let pool = DbPool::connect_read_only(&cli.database_url, 1).await?;
    let service = ClimateService::new(pool);

    match cli.command {
        Command::Precipitation => print_json(&service.precipitation_last_year().await?)?,
        Command::Stations => print_json(&service.all_stations().await?)?,
        Command::Station { station_id } => match service.station(&station_id).await? {
            Some(station) => print_json(&station)?,
            None => return Err(format!("Station {station_id} not found").into()),
        },
        Command::Tobs => print_json(&service.most_active_station_temperatures().await?)?,
        Command::ActiveStations => print_json(&service.station_activity().await?)?,
        Command::Window => print_json(&service.trailing_year().await?)?,
        Command::Stats { start, end } => {
            let stats = match end {
                Some(end) => service.temperature_stats_between(&start, &end).await?,
                None => service.temperature_stats_from(&start).await?,
            };
            print_json(&stats)?
        }
        Command::Day { date } => print_json(&service.measurements_on(&date).await?)?,
    }

    Ok(())
}
