use std::time::Duration;
use tracing::{Span, field};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter when `RUST_LOG` is unset. This engine talks to a database
/// driver and two HTTP upstreams on every tick, all of which log at `info`
/// by default and would otherwise bury the tick/generation/dispatch events
/// this crate actually cares about.
const DEFAULT_FILTER: &str = "info,sqlx=warn,reqwest=warn,hyper=warn";

pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let base = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    if json {
        tracing_subscriber::registry().with(env_filter).with(base.json()).init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(base.pretty()).init();
    }
}

/// Root span for one tick of the automation loop.
pub fn tick_span(tick_id: u64) -> Span {
    tracing::info_span!(
        "tick",
        tick_id = tick_id,
        generated = field::Empty,
        sent = field::Empty,
        failed = field::Empty,
    )
}

/// Times `fut` and logs when it overruns `max`. A tick that blows well past
/// its budget (more than 3x) risks delaying the next scheduled tick, so that
/// case is raised to `error` instead of `warn`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max * 3 {
        tracing::error!(
            target: "promoflow::performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = max.as_millis() as u64,
            "operation critically slow, may delay next tick"
        );
    } else if elapsed > max {
        tracing::warn!(
            target: "promoflow::performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            budget_ms = max.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
