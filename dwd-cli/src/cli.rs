use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dwd_core::{Config, Direction, Forecast, Session, Station, StationCatalog};
use inquire::{CustomType, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dwd", version, about = "DWD station catalog and forecasts")]
pub struct Cli {
    /// Station reference file; overrides the configured path.
    #[arg(long, global = true)]
    pub stations_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the stations file and endpoint settings.
    Configure,

    /// List stations from the reference file.
    Stations {
        /// Only stations in this country, e.g. "DE".
        #[arg(long)]
        country: Option<String>,

        /// Only active stations.
        #[arg(long)]
        active: bool,
    },

    /// Show the multi-day forecast for a station.
    Overview {
        /// Station identifier, e.g. "10637".
        station_id: String,

        /// Print the forecast as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(path) = self.stations_file {
            config.stations_file = Some(path);
        }

        match self.command {
            Command::Configure => configure(config),
            Command::Stations { country, active } => {
                let catalog = StationCatalog::new(config.stations_path());
                let stations = catalog.stations().with_context(|| {
                    format!("Failed to load stations from {}", catalog.path().display())
                })?;

                for station in stations
                    .iter()
                    .filter(|s| country.as_deref().is_none_or(|c| s.country.eq_ignore_ascii_case(c)))
                    .filter(|s| !active || s.active)
                {
                    println!("{}", format_station(station));
                }
                Ok(())
            }
            Command::Overview { station_id, json } => {
                let mut session = Session::new(config.session_config());
                session.init().context("Failed to set up HTTP session")?;

                let forecasts = session
                    .overview(&station_id)
                    .await
                    .with_context(|| format!("Failed to fetch forecast for station {station_id}"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&forecasts)?);
                    return Ok(());
                }

                let catalog = StationCatalog::new(config.stations_path());
                match catalog.find(&station_id) {
                    Ok(Some(station)) => println!("{} ({})", station.name, station.pk),
                    Ok(None) => println!("Station {station_id}"),
                    Err(err) => {
                        tracing::debug!(error = %err, "Station name lookup unavailable");
                        println!("Station {station_id}");
                    }
                }

                for day in &forecasts {
                    println!("{}", format_forecast(day));
                }
                Ok(())
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let stations_file = Text::new("Stations file:")
        .with_default(&config.stations_path().to_string_lossy())
        .prompt()?;

    let user_agent = Text::new("User-Agent header:")
        .with_default(&config.endpoint.user_agent)
        .prompt()?;

    let timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.endpoint.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;

    config.stations_file = Some(PathBuf::from(stations_file));
    config.endpoint.user_agent = user_agent;
    config.endpoint.timeout_secs = timeout_secs;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn format_station(station: &Station) -> String {
    let mut flags = Vec::new();
    if !station.active {
        flags.push("inactive");
    }
    if station.private {
        flags.push("private");
    }
    if station.has_measurement {
        flags.push("measurement");
    }
    if station.has_warnregion {
        flags.push("warnregion");
    }

    format!(
        "{:<6} {:<32} {:>2} {:>5} m  ({:.2}, {:.2})  {}",
        station.pk,
        station.name,
        station.country,
        station.altitude,
        station.x,
        station.y,
        flags.join(",")
    )
    .trim_end()
    .to_string()
}

fn format_forecast(day: &Forecast) -> String {
    format!(
        "{}  {:>5.1} .. {:>5.1} °C  {:>5.1} mm  wind {:>3} km/h (gusts {:>3}) from {:<3} {:>4}  icons {}/{}",
        day.day_date.format("%a %Y-%m-%d"),
        day.temperature_min,
        day.temperature_max,
        day.precipitation,
        day.wind_speed,
        day.wind_gust,
        compass_point(day.wind_direction),
        day.wind_direction.to_string(),
        day.icon1,
        day.icon2,
    )
}

/// Nearest of the eight principal compass points.
fn compass_point(direction: Direction) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let degrees = direction.degrees().rem_euclid(360);
    POINTS[(((degrees + 22) / 45) % 8) as usize]
}
