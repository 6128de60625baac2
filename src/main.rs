use nhl_ingest::{run, IngestConfig, IngestionResult};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> IngestionResult<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let root = std::env::current_dir()?;
    info!(project_root = %root.display(), "startup");

    let config = IngestConfig::from_project_root(root);
    run(&config)?;
    Ok(())
}
