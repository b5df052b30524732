use anyhow::{Context, Result};
use timetable_sync::{store, Config, Pipeline};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,timetable_sync=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("loading .env");
        }
    }
    let config = Config::from_env().context("reading configuration")?;
    info!(page = %config.page_url, sheet = %config.sheet_path.display(), "configured");

    // ─── 3) database ─────────────────────────────────────────────────
    let pool = store::connect(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    store::migrate(&pool).await.context("running migrations")?;

    // ─── 4) sync ─────────────────────────────────────────────────────
    let pipeline = Pipeline::new(config, pool).context("building HTTP client")?;
    match pipeline.run().await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            info!("all done");
            Ok(())
        }
        Err(e) => {
            error!(stage = e.stage(), error = %e, "timetable sync failed");
            Err(e).context("timetable sync failed")
        }
    }
}
