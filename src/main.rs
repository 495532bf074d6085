use std::sync::Arc;

use log::{info, warn};

use mealie_import::config::AppConfig;
use mealie_import::gemini::GeminiClient;
use mealie_import::mealie::MealieClient;
use mealie_import::server::{build_app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::load()?;
    for error in config.validate() {
        // Missing credentials are surfaced inline in the UI, not fatal here
        warn!("{}", error);
    }

    let extractor = Arc::new(GeminiClient::new(config.gemini.clone()));
    let mealie = MealieClient::new(&config.mealie)?;

    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::new(config, extractor, mealie);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
