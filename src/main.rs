use anyhow::Context;
use boostline::numerology::{load_rules, NumerologyRule};
use boostline::orchestration::{LogNotificationSink, PollDriver, PollSettings};
use boostline::render::{AppRegistry, LogRenderSink};
use boostline::{api, config::Config, EventSource, HttpEventSource, TimelineStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

fn load_assets(config: &Config) -> anyhow::Result<(Arc<[NumerologyRule]>, Arc<AppRegistry>)> {
    let rules = match &config.numerology_path {
        Some(path) => load_rules(path).context("loading numerology rules")?,
        None => Vec::new(),
    };
    let apps = match &config.apps_path {
        Some(path) => AppRegistry::load(path).context("loading app registry")?,
        None => AppRegistry::default(),
    };
    Ok((Arc::from(rules), Arc::new(apps)))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let (rules, apps) = match load_assets(&config) {
        Ok(assets) => assets,
        Err(e) => {
            eprintln!("Startup error: {:#}", e);
            std::process::exit(1);
        }
    };

    let settings = PollSettings::from_config(&config);
    // Retries must finish inside the request timeout.
    let retry_budget = settings
        .request_timeout
        .saturating_sub(Duration::from_millis(500));
    let source: Arc<dyn EventSource> = Arc::new(
        HttpEventSource::new(config.source_url.clone(), config.feed)
            .with_max_retry_elapsed(retry_budget),
    );
    let store = Arc::new(RwLock::new(TimelineStore::new(rules)));

    let driver = PollDriver::new(
        source,
        store.clone(),
        Arc::new(LogRenderSink::new(config.feed, apps.clone())),
        Arc::new(LogNotificationSink),
        settings,
    );
    let (commands, command_rx) = mpsc::channel(8);
    tokio::spawn(driver.run(command_rx));

    // Create router
    let app = api::create_router(api::AppState::new(store, apps, config.feed, commands));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Following {} at {}, listening on {}",
        config.feed,
        config.source_url,
        addr
    );

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
