//! offers-console entry point.
//!
//! Loads the offer rules, then follows the live award feed until Ctrl-C or
//! until the feed connection closes.

use chrono::Local;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use offers_console::api::{HttpOffersClient, OffersApi};
use offers_console::config::ConsoleConfig;
use offers_console::feed::{AwardFeed, drain_pending};
use offers_console::registry::RuleRegistry;
use offers_console::render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ConsoleConfig::from_env()?.install()?;
    tracing::info!(api = %config.api_url, ws = %config.ws_url, "starting offers-console");

    // Rule registry
    let api = HttpOffersClient::new(config)?;
    let registry = RuleRegistry::new(api.clone());
    if registry.refresh().await.is_ok() {
        for line in render::offer_table(&registry.offers().await).lines() {
            tracing::info!("{line}");
        }
    } else if let Some(message) = registry.last_error_message().await {
        tracing::error!("{message}");
    }

    // Live feed
    let feed = AwardFeed::new();
    if config.feed_backfill_limit > 0 {
        match api.recent_awards(config.feed_backfill_limit).await {
            Ok(awards) => {
                feed.backfill(awards).await;
                for entry in feed.snapshot().await.iter().rev() {
                    tracing::info!("{}", render::award_row(entry, &Local));
                }
            }
            Err(err) => tracing::warn!(error = %err, "award backfill failed"),
        }
    }

    let mut awards = feed.subscribe();
    let connection = feed.connect(config.ws_url.as_str());
    let mut phase = connection.watch_phase();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!("{}", render::AWARD_HEADER);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
            changed = phase.changed() => {
                if changed.is_err() || phase.borrow_and_update().is_terminal() {
                    tracing::warn!("live feed closed; restart to reconnect");
                    break;
                }
            }
            received = awards.recv() => match received {
                Ok(entry) => tracing::info!("{}", render::award_row(&entry, &Local)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "console fell behind the award feed");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    // Awards that landed just before the close are still queued.
    connection.close().await;
    for entry in drain_pending(&mut awards) {
        tracing::info!("{}", render::award_row(&entry, &Local));
    }
    registry.shutdown().await;
    tracing::info!(
        buffered = feed.len().await,
        discarded = feed.discarded_count(),
        "offers-console stopped"
    );

    Ok(())
}
