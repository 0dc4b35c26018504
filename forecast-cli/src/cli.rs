use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{ClientError, Config, ForecastClient, ForecastPoint, Source, config::DEFAULT_API_URL};
use inquire::{Password, Select, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Marine forecast CLI (StormGlass)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the StormGlass API token, URL and preferred source.
    Configure,

    /// Show the hourly forecast for a point.
    Points {
        /// Latitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        lng: f64,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Points { lat, lng, json } => points(lat, lng, json).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if config.is_configured() {
        println!("Updating existing StormGlass configuration.");
    }

    let token = Password::new("StormGlass API token:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API token")?;

    let current_url = config
        .stormglass()
        .map(|sg| sg.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let api_url = Text::new("API base URL:")
        .with_default(&current_url)
        .prompt()
        .context("Failed to read API URL")?;

    let current_source = config
        .stormglass()
        .and_then(|sg| sg.source_id().ok())
        .unwrap_or_default();
    let start = Source::all().iter().position(|s| *s == current_source).unwrap_or(0);
    let source = Select::new("Preferred source:", Source::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read preferred source")?;

    config.upsert_stormglass_token(token);
    config.set_api_url(api_url);
    config.set_source(source);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn points(lat: f64, lng: f64, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = ForecastClient::from_config(&config)?;

    let points = client.fetch_points(lat, lng).await.map_err(with_hint)?;
    log::info!("received {} forecast points", points.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        print_table(&points, client.source());
    }

    Ok(())
}

/// Attach a user-facing hint for the statuses a user can act on.
fn with_hint(err: ClientError) -> anyhow::Error {
    let hint = match err.status() {
        Some(401 | 403) => Some("StormGlass rejected the API token; run `forecast configure`"),
        Some(402 | 429) => Some("StormGlass request quota exhausted"),
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => anyhow::Error::new(err),
    }
}

fn print_table(points: &[ForecastPoint], source: Source) {
    if points.is_empty() {
        println!("No complete forecast hours from source '{source}'.");
        return;
    }

    println!(
        "{:<17} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "time (UTC)", "wave m", "wave °", "swell m", "swell °", "swell s", "wind °", "wind m/s"
    );

    for p in points {
        let time = p
            .timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| p.time.clone());

        println!(
            "{:<17} {:>7.2} {:>7.0} {:>7.2} {:>7.0} {:>7.1} {:>7.0} {:>7.1}",
            time,
            p.wave_height,
            p.wave_direction,
            p.swell_height,
            p.swell_direction,
            p.swell_period,
            p.wind_direction,
            p.wind_speed,
        );
    }
}
