use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error};

use crate::config::{CredentialSource, ResetCredentials};
use crate::invoker::CreditResetInvoker;
use crate::lifecycle::Lifecycle;

/// A single firing of the reset timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub scheduled_time: DateTime<Utc>,
    pub tick: u64,
}

/// Timer entry point. Hands the reset to `lifecycle` and returns without waiting.
///
/// Failures are logged here and go no further.
pub fn on_schedule(
    event: ScheduledEvent,
    invoker: CreditResetInvoker,
    credentials: ResetCredentials,
    lifecycle: &Lifecycle,
) {
    debug!(
        tick = event.tick,
        scheduled_time = %event.scheduled_time,
        "scheduled credit reset fired"
    );
    lifecycle.register(async move {
        if let Err(err) = invoker.invoke(&credentials).await {
            error!(
                error = %err,
                status = ?err.status(),
                tick = event.tick,
                "Scheduled task failed to execute or complete"
            );
        }
    });
}

/// Starts the in-process reset timer.
///
/// Credentials are loaded from `source` on every tick. Unless `run_on_start` is set the
/// first reset happens one full `interval` after startup.
pub fn spawn(
    invoker: CreditResetInvoker,
    source: CredentialSource,
    lifecycle: Lifecycle,
    interval: Duration,
    run_on_start: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !run_on_start {
            // the first tick of a tokio interval completes immediately
            ticker.tick().await;
        }

        let mut tick = 0u64;
        loop {
            ticker.tick().await;
            tick += 1;
            let event = ScheduledEvent {
                scheduled_time: Utc::now(),
                tick,
            };
            on_schedule(event, invoker.clone(), source.load(), &lifecycle);
        }
    })
}
