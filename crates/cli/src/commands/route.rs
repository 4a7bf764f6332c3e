//! `knowroute route`: Route one conversation payload.
//!
//! The routed payload is printed to stdout as JSON. Status events are
//! written to stderr, one JSON object per line, as they happen.

use super::{load_config, open_catalog, read_input};
use knowroute_config::AppConfig;
use knowroute_core::event::EventBus;
use knowroute_core::payload::ConversationPayload;
use knowroute_router::{KnowledgeRouter, RouteDecision, RouterOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(
    payload_source: &str,
    user: &str,
    catalog: Option<PathBuf>,
    no_status: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!(
            "  ⚠️  No API key configured for provider '{}'",
            config.default_provider
        );
        eprintln!(
            "     Set KNOWROUTE_API_KEY or add api_key to {}",
            AppConfig::config_path().display()
        );
    }

    let raw = read_input(payload_source)?;
    let payload: ConversationPayload =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid payload JSON: {e}"))?;

    let providers = knowroute_providers::build_from_config(&config);
    let provider = providers.default().ok_or("No default provider configured")?;

    let store = Arc::new(open_catalog(&config, catalog)?);
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Ok(line) = serde_json::to_string(event.as_ref()) {
                        eprintln!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Status printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut options = RouterOptions::from(&config);
    options.status = options.status && !no_status;

    let router = KnowledgeRouter::new(provider, store.clone(), store, bus);
    let outcome = router.route(payload, Some(user), &options).await;

    // Dropping the router closes the bus so the printer drains and exits
    drop(router);
    let _ = printer.await;

    let outcome = outcome?;
    if let RouteDecision::Degraded { reason } = &outcome.decision {
        tracing::warn!(%reason, "Routing degraded; payload returned without attachment");
    }

    println!("{}", serde_json::to_string_pretty(&outcome.payload)?);
    Ok(())
}
