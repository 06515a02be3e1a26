use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use skycast::api::HttpApi;
use skycast::app::{App, Bootstrap};
use skycast::config::RuntimeConfig;
use skycast::error::AppError;
use skycast::model::validate_coordinates;
use skycast::ui;

#[derive(Debug, Parser)]
#[command(author, version, about = "Terminal weather lookup with place autocomplete")]
struct Cli {
    /// Start with this place query instead of the default location.
    #[arg(long, conflicts_with_all = ["lat", "lon", "label"])]
    city: Option<String>,

    /// Bootstrap latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Bootstrap longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Display label for the --lat/--lon bootstrap location.
    #[arg(long, requires = "lat")]
    label: Option<String>,
}

const TICK: Duration = Duration::from_millis(50);

fn main() {
    let cli = Cli::parse();
    let config = RuntimeConfig::from_env();
    if let Err(error) = run(cli, &config) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run(cli: Cli, config: &RuntimeConfig) -> Result<(), AppError> {
    init_tracing(config)?;
    let bootstrap = resolve_bootstrap(&cli)?;
    let api = HttpApi::new(config)
        .map_err(|error| AppError::runtime(format!("http client init failed: {error}")))?;
    let mut app = App::new(Arc::new(api), bootstrap);

    let mut terminal = ui::setup_terminal()
        .map_err(|error| AppError::runtime(format!("terminal setup failed: {error}")))?;
    let outcome = event_loop(&mut terminal, &mut app);
    let restored = ui::restore_terminal(&mut terminal);

    outcome
        .and(restored)
        .map_err(|error| AppError::runtime(error.to_string()))
}

fn event_loop(terminal: &mut ui::Tui, app: &mut App) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

fn resolve_bootstrap(cli: &Cli) -> Result<Bootstrap, AppError> {
    if let Some(city) = &cli.city {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::user("--city must not be empty"));
        }
        return Ok(Bootstrap::Query(city.to_string()));
    }

    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => {
            validate_coordinates(lat, lon)
                .map_err(|error| AppError::user(error.to_string()))?;
            let label = cli
                .label
                .clone()
                .unwrap_or_else(|| format!("{lat:.4}, {lon:.4}"));
            Ok(Bootstrap::Coordinates { lat, lon, label })
        }
        (None, None) => Ok(Bootstrap::default()),
        _ => Err(AppError::user("provide both --lat and --lon")),
    }
}

/// File-backed logging keeps tracing output off the alternate screen;
/// without `SKYCAST_LOG_FILE` the subscriber is simply not installed.
fn init_tracing(config: &RuntimeConfig) -> Result<(), AppError> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| {
            AppError::runtime(format!("open log file {}: {error}", path.display()))
        })?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skycast=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use skycast::config::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PLACE_LABEL};

    use super::*;

    #[test]
    fn bootstrap_defaults_to_natal_by_coordinates() {
        let cli = Cli::parse_from(["skycast"]);
        let bootstrap = resolve_bootstrap(&cli).expect("bootstrap");

        assert_eq!(
            bootstrap,
            Bootstrap::Coordinates {
                lat: DEFAULT_LATITUDE,
                lon: DEFAULT_LONGITUDE,
                label: DEFAULT_PLACE_LABEL.to_string(),
            }
        );
    }

    #[test]
    fn bootstrap_accepts_city_query() {
        let cli = Cli::parse_from(["skycast", "--city", "Tokyo"]);
        assert_eq!(
            resolve_bootstrap(&cli).expect("bootstrap"),
            Bootstrap::Query("Tokyo".to_string())
        );
    }

    #[test]
    fn bootstrap_labels_raw_coordinates() {
        let cli = Cli::parse_from(["skycast", "--lat", "-5.7945", "--lon", "-35.211"]);
        let bootstrap = resolve_bootstrap(&cli).expect("bootstrap");

        assert_eq!(
            bootstrap,
            Bootstrap::Coordinates {
                lat: -5.7945,
                lon: -35.211,
                label: "-5.7945, -35.2110".to_string(),
            }
        );
    }

    #[test]
    fn bootstrap_rejects_out_of_range_coordinates() {
        let cli = Cli::parse_from(["skycast", "--lat", "95.0", "--lon", "10.0"]);
        let error = resolve_bootstrap(&cli).expect_err("must fail");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn cli_rejects_city_combined_with_coordinates() {
        let error = Cli::try_parse_from([
            "skycast", "--city", "Tokyo", "--lat", "35.6", "--lon", "139.7",
        ])
        .expect_err("conflict");
        assert_eq!(error.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn cli_rejects_partial_coordinates() {
        let error =
            Cli::try_parse_from(["skycast", "--lat", "35.6"]).expect_err("missing --lon");
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn cli_help_flag_is_supported() {
        let help = Cli::try_parse_from(["skycast", "--help"]).expect_err("help");
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn tracing_writes_to_the_configured_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("skycast.log");
        let config = RuntimeConfig {
            log_file: Some(path.clone()),
            ..RuntimeConfig::default()
        };

        init_tracing(&config).expect("init");
        tracing::info!(target: "skycast", "log file smoke line");

        let contents = std::fs::read_to_string(&path).expect("log file");
        assert!(contents.contains("log file smoke line"));
    }
}
