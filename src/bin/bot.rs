use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use inclusive_bot::api::{ChatApi, MattermostClient};
use inclusive_bot::core::Config;
use inclusive_bot::features::ingest::{EventIngest, EVENT_CHANNEL_CAPACITY};
use inclusive_bot::features::notifier::Notifier;
use inclusive_bot::features::pipeline::Pipeline;
use inclusive_bot::features::session::bootstrap;
use inclusive_bot::features::terms::TermDictionary;

/// How long shutdown waits for the event stream close handshake
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Inclusive Bot v{}...", env!("CARGO_PKG_VERSION"));
    let started_at = Utc::now();

    let dictionary = match TermDictionary::load(&config.word_list_file) {
        Ok(dictionary) => dictionary,
        Err(e) => {
            error!("❌ Failed to load the word list: {e:#}");
            std::process::exit(1);
        }
    };
    info!("📖 Loaded {} flagged terms", dictionary.len());

    let api: Arc<dyn ChatApi> = Arc::new(MattermostClient::new(config.api_url(), &config.bot_token));

    let session = match bootstrap(api.as_ref(), &config).await {
        Ok(session) => session,
        Err(e) => {
            e.log_details();
            std::process::exit(1);
        }
    };

    let notifier = Notifier::new(api.clone(), &config.site_url);
    let cancel = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    // Events queue in the channel until the pipeline task starts
    let ingest = EventIngest::start(
        &config.websocket_url(),
        &config.bot_token,
        events_tx,
        cancel.clone(),
    )
    .await;

    notifier
        .announce_online(&session, ingest.is_connected(), started_at)
        .await;

    // Used for the stopped notice only if the pipeline never hands its session back
    let startup_session = session.clone();
    let pipeline = Pipeline::new(session, dictionary, notifier.clone(), api.clone())?;
    let mut processor = tokio::spawn(pipeline.run(events_rx, cancel.clone()));
    info!("✅ Inclusive Bot is running");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {e}");
    }
    info!("🛑 Shutdown signal received");

    cancel.cancel();
    if tokio::time::timeout(SHUTDOWN_GRACE, ingest.join())
        .await
        .is_err()
    {
        warn!("Event stream did not close in time");
    }

    let session = match tokio::time::timeout(SHUTDOWN_GRACE, &mut processor).await {
        Ok(Ok(session)) => session,
        Ok(Err(e)) => {
            warn!("Event processing task ended abnormally: {e}");
            startup_session
        }
        Err(_) => {
            warn!("Event processing did not stop in time, aborting it");
            processor.abort();
            startup_session
        }
    };

    notifier.announce_stopped(&session).await;
    info!("Inclusive Bot stopped");

    Ok(())
}
