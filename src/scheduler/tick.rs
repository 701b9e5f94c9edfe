//! Tick driver: the periodic orchestrator that optionally runs generation
//! and always runs the dispatcher, once per cadence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::generator::GenerationOptions;
use crate::logger::tick_span;
use crate::logger::warn_if_slow;
use tracing::Instrument;

#[derive(Debug, Default)]
pub struct TickOutcome {
    pub generated: Option<u32>,
    pub sent: u32,
    pub failed: u32,
}

/// Runs exactly one tick: bootstrap, conditional generation, dispatch,
/// timestamp update. Best-effort — a failed generation run is logged and
/// does not prevent the dispatcher from running.
pub async fn run_tick(engine: &Engine) -> Result<TickOutcome, EngineError> {
    engine.ensure_defaults().await?;

    let settings = engine.repository.get_settings().await?.ok_or(EngineError::PostingWindowMissing)?;
    let mut outcome = TickOutcome::default();

    if settings.automation_enabled {
        let should_generate = match settings.last_suggestion_generation_at {
            None => true,
            Some(last) => Utc::now() >= last + chrono::Duration::minutes(engine.config.suggestion_interval_minutes),
        };

        if should_generate {
            match engine.generate_suggestions(GenerationOptions::default()).await {
                Ok(result) => outcome.generated = Some(result.inserted),
                Err(err) => error!(error = %err, "suggestion generation failed, continuing tick"),
            }
        }

        let dispatch = warn_if_slow("dispatch_pass", Duration::from_secs(5), engine.run_dispatch()).await?;
        outcome.sent = dispatch.sent;
        outcome.failed = dispatch.failed;
    }

    engine.repository.touch_scheduler_timestamp(Utc::now()).await?;
    Ok(outcome)
}

/// Spawns the background tick loop. `shutdown` flips to `true` to request a
/// graceful stop; the in-flight tick always runs to completion first.
pub fn spawn_tick_loop(engine: Arc<Engine>, tick_seconds: u64, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(tick_seconds.max(5)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut tick_id: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tick_id += 1;
                    let span = tick_span(tick_id);
                    async {
                        match run_tick(&engine).await {
                            Ok(outcome) => {
                                tracing::Span::current().record("generated", outcome.generated.unwrap_or(0) as u64);
                                tracing::Span::current().record("sent", outcome.sent as u64);
                                tracing::Span::current().record("failed", outcome.failed as u64);
                                info!(tick_id, sent = outcome.sent, failed = outcome.failed, "tick complete");
                            }
                            Err(err) => error!(tick_id, error = %err, "tick failed"),
                        }
                    }
                    .instrument(span)
                    .await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("tick loop shutting down");
                        break;
                    }
                }
            }
        }
    })
}
