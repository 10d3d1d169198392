use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vacantes_backend::{
    config::{Config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        MemoryStore, PgStore, RecruitingStore,
    },
    routes, AppState, Backends,
};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let store: Arc<dyn RecruitingStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Using PostgreSQL store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; data is kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; summaries will fail");
    }
    if config.azure_speech_key.is_none() || config.azure_speech_region.is_none() {
        tracing::warn!("Azure Speech is not configured; only text capture is available");
    }

    let backends = Backends::from_config(&config, store)?;
    let app_state = AppState::new(config, backends);
    let config = app_state.config.clone();

    {
        let capture = app_state.capture_service.clone();
        let max_idle = Duration::from_secs(config.capture_session_idle_secs);
        let period = (max_idle / 4).clamp(Duration::from_secs(5), Duration::from_secs(60));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let evicted = capture.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!(evicted, "evicted idle capture sessions");
                }
            }
        });
    }

    info!("Serving uploads from: {}", config.uploads_dir);
    let app = routes::build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
