use guestbook::{
    config::Settings,
    server,
    telemetry::{self, LogTarget},
    App,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load();
    telemetry::init(&settings.log_filter, LogTarget::Terminal);

    let app = Arc::new(App::from_settings(&settings).await?);
    server::serve(app, settings.listen, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!(error = %err, "failed to listen for ctrl-c, shutting down"),
    }
}
