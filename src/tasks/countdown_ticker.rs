//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, CountdownSnapshot, Phase, TickOutcome};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that drives the countdown one second at a time while it
/// is running. Every start, resume and restart gets a fresh interval, so the
/// first tick always lands a full second after the command.
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task");

    let mut countdown_rx = state.countdown_tx.subscribe();

    loop {
        let current = countdown_rx.borrow_and_update().clone();
        if current.phase == Phase::Running {
            run_ticks(&state, &mut countdown_rx, current.run_id).await;
            // Re-read whatever ended the run before waiting again
            continue;
        }

        if countdown_rx.changed().await.is_err() {
            error!("Countdown channel closed, stopping ticker");
            return;
        }
    }
}

/// Tick until the countdown finishes or a newer command supersedes this run
async fn run_ticks(
    state: &AppState,
    countdown_rx: &mut watch::Receiver<CountdownSnapshot>,
    run_id: u64,
) {
    debug!("Ticker running for run {}", run_id);

    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match state.handle_tick() {
                    Ok(TickOutcome::Ticked { .. }) => {}
                    Ok(TickOutcome::Finished) => {
                        debug!("Run {} finished", run_id);
                        return;
                    }
                    Ok(TickOutcome::Ignored) => return,
                    Err(e) => {
                        error!("Failed to apply countdown tick: {}", e);
                        return;
                    }
                }
            }

            changed = countdown_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                let latest = countdown_rx.borrow().clone();
                if latest.phase != Phase::Running || latest.run_id != run_id {
                    debug!("Run {} superseded ({})", run_id, latest.phase);
                    return;
                }
            }
        }
    }
}
