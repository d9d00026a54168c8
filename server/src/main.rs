use std::sync::Arc;

use tokio::net::TcpListener;

use agrismart_server::chat::presence::RoomRegistry;
use agrismart_server::chat::router::ChatRouter;
use agrismart_server::chat::store::MessageStore;
use agrismart_server::config::{generate_config_template, Config};
use agrismart_server::directory::UserDirectory;
use agrismart_server::{db, routes, state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "agrismart_server=info".parse().unwrap()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "agrismart_server=info".parse().unwrap()),
            )
            .init();
    }

    tracing::info!("AgriSmart chat server v{} starting", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite database
    let db = db::init_db(&config.data_dir)?;

    // Wire up the messaging core: presence registry, persistence log, and
    // user directory, all owned by the router.
    let router = Arc::new(ChatRouter::new(
        RoomRegistry::new(),
        MessageStore::new(db.clone()),
        UserDirectory::new(db.clone()),
    ));

    let app_state = state::AppState { router };

    // Build router
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
