use amap_weather_core::{Config, Forecast, LiveWeather, QueryMode, WeatherOutput, WeatherReport};
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use log::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "AMap weather CLI")]
pub struct Cli {
    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default request timeout.
    Configure,

    /// Show current weather for a city.
    Live(QueryArgs),

    /// Show the multi-day forecast for a city.
    Forecast(QueryArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// City name or administrative code, e.g. "440300".
    pub city: String,

    /// Response format requested from the service: json or xml.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Print the JSON response as-is instead of a summary.
    #[arg(long)]
    pub raw: bool,

    /// API key; overrides the configured one.
    #[arg(long, env = "AMAP_WEATHER_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Request timeout in seconds; overrides the configured one.
    #[arg(long)]
    pub timeout: Option<f64>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Live(args) => show(QueryMode::Live, args).await,
            Command::Forecast(args) => show(QueryMode::Forecast, args).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    cfg.set_api_key(api_key.trim().to_string());

    let current = cfg
        .transport
        .get("timeout")
        .map(|value| value.to_string())
        .unwrap_or_default();
    let timeout = Text::new("Request timeout in seconds (0 for none):")
        .with_default(&current)
        .prompt()
        .context("Failed to read timeout")?;
    match parse_timeout(&timeout)? {
        Some(secs) => {
            cfg.transport.insert("timeout", secs);
        }
        None => {
            cfg.transport = cfg
                .transport
                .iter()
                .filter(|(name, _)| name.as_str() != "timeout")
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
        }
    }

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(mode: QueryMode, args: QueryArgs) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let mut client = cfg.client(args.key.as_deref())?;

    if let Some(secs) = args.timeout {
        let mut options = client.transport_options().clone();
        options.insert("timeout", secs);
        client.set_transport_options(options);
    }

    debug!("fetching {mode} weather for {}", args.city);
    let output = client.fetch_weather(&args.city, mode.as_str(), &args.format).await?;

    match output {
        WeatherOutput::Xml(text) => println!("{text}"),
        WeatherOutput::Json(value) if args.raw => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        WeatherOutput::Json(value) => {
            let report = WeatherReport::from_value(value)
                .context("Unexpected response shape from weather service")?
                .ensure_success()?;
            for line in render(mode, &report) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn parse_timeout(input: &str) -> anyhow::Result<Option<f64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let secs: f64 = input
        .parse()
        .with_context(|| format!("Invalid timeout '{input}': expected a number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        bail!("Invalid timeout '{input}': must be zero or a positive number of seconds");
    }

    Ok(Some(secs))
}

fn render(mode: QueryMode, report: &WeatherReport) -> Vec<String> {
    let lines: Vec<String> = match mode {
        QueryMode::Live => report.lives.iter().map(render_live).collect(),
        QueryMode::Forecast => report.forecasts.iter().flat_map(render_forecast).collect(),
    };

    if lines.is_empty() {
        vec!["No weather data returned for this city.".to_string()]
    } else {
        lines
    }
}

fn render_live(live: &LiveWeather) -> String {
    let reported = live
        .report_time()
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| live.reporttime.clone());

    format!(
        "{} {}: {}, {}°C, humidity {}%, wind {} {} (reported {})",
        live.province,
        live.city,
        live.weather,
        live.temperature,
        live.humidity,
        live.winddirection,
        live.windpower,
        reported,
    )
}

fn render_forecast(forecast: &Forecast) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} (reported {})",
        forecast.province, forecast.city, forecast.reporttime
    )];

    lines.extend(forecast.casts.iter().map(|cast| {
        let day = cast
            .date()
            .map(|date| date.format("%a %m-%d").to_string())
            .unwrap_or_else(|| cast.date.clone());
        format!(
            "  {day}: {} / {}, {}°C .. {}°C, wind {} {}",
            cast.dayweather,
            cast.nightweather,
            cast.nighttemp,
            cast.daytemp,
            cast.daywind,
            cast.daypower,
        )
    }));

    lines
}
