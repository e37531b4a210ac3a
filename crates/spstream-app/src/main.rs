// spstream entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout is the report)
// 3. Copy default config files, then load config
// 4. Build the snapshot source and the recommendation service
// 5. Analyze and print the report

use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use spstream_app::cli::{Cli, OutputFormat};
use spstream_app::report;
use spstream_app::source::LocalSource;
use spstream_baseball::service::StreamerService;
use spstream_baseball::window::LeagueCalendar;
use spstream_core::clock::SystemClock;
use spstream_core::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();
    let base_dir = cli.project_dir.clone();

    // 2. Initialize tracing
    init_tracing(&base_dir)?;
    info!("spstream starting up");

    // 3. Load config
    let copied = config::ensure_config_files(&base_dir)
        .context("failed to initialize config from defaults")?;
    for path in &copied {
        info!("Copied default config to {}", path.display());
    }
    let config = config::load_config_from(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, team={}, season starts {}",
        config.league.name, config.league.team_key, config.league.season_start
    );

    // 4. Build source and service
    let source =
        LocalSource::from_config(&config, &base_dir).context("failed to set up data sources")?;
    let settings = cli.apply_overrides(config.analysis.clone());
    let service = StreamerService::new(
        Arc::new(source),
        Arc::new(SystemClock),
        LeagueCalendar::new(config.league.season_start),
        config.league.team_key.clone(),
        settings,
        config.cache.ttl(),
    );

    // 5. Analyze
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let result = match service.recommendations(today).await {
        Ok(result) => result,
        Err(e) if e.is_retryable() => {
            error!("Upstream data unavailable: {}", e);
            return Err(anyhow::Error::new(e).context("upstream data unavailable, try again shortly"));
        }
        Err(e) => {
            error!("Analysis rejected: {}", e);
            return Err(anyhow::Error::new(e).context("analysis failed"));
        }
    };

    let output = match cli.format {
        OutputFormat::Text => report::render(&result),
        OutputFormat::Json => report::render_json(&result).context("failed to serialize result")?,
    };
    println!("{output}");

    info!("spstream finished: {} pitcher(s) found", result.total_found);
    Ok(())
}

/// Initialize tracing to log to a file under `<base_dir>/logs`.
fn init_tracing(base_dir: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("spstream.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spstream=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
