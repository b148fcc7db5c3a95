use chrono::Local;
use tracing::{info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use trendfeed::config::Config;
use trendfeed::errors::TrendResult;
use trendfeed::services::{RunOutcome, SelectionService};
use trendfeed::sources::NewsApiSource;
use trendfeed::storage::YamlFileWriter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

fn run() -> TrendResult<()> {
    let start_time = std::time::Instant::now();

    // Load configuration
    let config = Config::from_env()?;
    info!(?config, "Loaded configuration");

    let source = NewsApiSource::new(&config)?;
    let writer = YamlFileWriter::new(&config.output_path);
    let output_path = config.output_path.clone();
    let service = SelectionService::new(source, writer, config);

    match service.run(Local::now().date_naive())? {
        RunOutcome::Written { count } => {
            info!(count, path = %output_path.display(), "Saved trending articles");
        }
        RunOutcome::Aborted(reason) => {
            warn!(%reason, "No output written");
        }
    }

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Done");
    Ok(())
}
