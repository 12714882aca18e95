use std::time::Duration;

use log::{error, info, warn};
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;

use crate::config::MonitorOptions;
use crate::error::Error;
use crate::notifier::Notifier;
use crate::sampler::Sampler;

/// Which side of the usage limit the last completed check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    OverLimit,
}

/// Handle to a running repeat-warning timer.
#[derive(Debug)]
pub struct RepeaterHandle {
    token: CancellationToken,
}

impl RepeaterHandle {
    /// Stops the timer before its next firing. Safe to call more than once;
    /// a notification already in flight is left to finish.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Only the watchdog loop writes to this.
#[derive(Debug)]
struct MonitorState {
    phase: Phase,
    repeater: Option<RepeaterHandle>,
}

/// Renders the warning template, substituting the first `%m` with the usage
/// percentage at two decimal places.
pub fn render_message(template: &str, used: f64) -> String {
    template.replacen("%m", &format!("{used:.2}"), 1)
}

/// Memory watchdog. Owns the threshold state machine and the repeat timer's
/// lifecycle; the repeat timer itself only re-sends warnings and never
/// touches the state.
pub struct Monitor<S, N> {
    limit: f64,
    check_interval: Duration,
    warning_interval: Duration,
    content: String,
    sampler: S,
    notifier: N,
    state: MonitorState,
}

impl<S, N> Monitor<S, N>
where
    S: Sampler + Clone + 'static,
    N: Notifier + Clone + 'static,
{
    pub fn new(options: &MonitorOptions, sampler: S, notifier: N) -> Self {
        Self {
            limit: options.limit,
            check_interval: Duration::from_millis(options.check_interval_ms),
            warning_interval: Duration::from_secs(options.warning_interval_secs),
            content: options.content.clone(),
            sampler,
            notifier,
            state: MonitorState {
                phase: Phase::Normal,
                repeater: None,
            },
        }
    }

    /// Which side of the limit the monitor last observed.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Runs the watchdog until `token` is cancelled.
    pub async fn run(mut self, token: CancellationToken) {
        info!("Starting memory monitoring...");
        info!("Usage limit: {:.1}%", self.limit);
        info!("Check interval: {} ms", self.check_interval.as_millis());
        if self.warning_interval.is_zero() {
            info!("Repeat warnings are disabled, each crossing warns once");
        } else {
            info!(
                "Repeat warnings every {} seconds while over the limit",
                self.warning_interval.as_secs()
            );
        }

        loop {
            // Check if we should shutdown before starting a new check
            if token.is_cancelled() {
                info!("Shutdown requested, stopping monitor");
                break;
            }

            if let Err(e) = self.tick().await {
                error!("Error checking memory usage: {e}");
            }

            // Interruptible sleep
            select! {
                () = sleep(self.check_interval) => {},
                () = token.cancelled() => {
                    info!("Shutdown requested during sleep");
                    break;
                }
            }
        }

        if let Some(repeater) = self.state.repeater.take() {
            repeater.cancel();
        }
        info!("Memory monitoring stopped gracefully");
    }

    /// One watchdog pass: sample, compare against the limit, drive the state
    /// machine. Crossing the limit warns exactly once per excursion; dropping
    /// back under it cancels any repeat timer.
    async fn tick(&mut self) -> Result<(), Error> {
        let used = self.sampler.sample().await?;

        if used <= self.limit {
            if self.state.phase == Phase::OverLimit {
                if let Some(repeater) = self.state.repeater.take() {
                    repeater.cancel();
                }
                self.state.phase = Phase::Normal;
                info!("Memory usage back down to {used:.2}%");
            }
            return Ok(());
        }

        if self.state.phase == Phase::Normal {
            self.state.phase = Phase::OverLimit;
            warn!(
                "Memory usage at {used:.2}%, over the {:.1}% limit",
                self.limit
            );

            // A delivery failure does not stop the repeat timer from starting.
            let delivered = self
                .notifier
                .notify(&render_message(&self.content, used))
                .await;
            if !self.warning_interval.is_zero() {
                self.state.repeater = Some(self.spawn_repeater());
            }
            delivered?;
        }

        Ok(())
    }

    /// Starts the repeat-warning timer. Each firing re-samples on its own,
    /// since the watchdog's last reading has gone stale by then.
    fn spawn_repeater(&self) -> RepeaterHandle {
        let token = CancellationToken::new();
        let interval = self.warning_interval;
        let content = self.content.clone();
        let sampler = self.sampler.clone();
        let notifier = self.notifier.clone();
        let task_token = token.clone();

        tokio::spawn(async move {
            loop {
                select! {
                    () = task_token.cancelled() => break,
                    () = sleep(interval) => {
                        match sampler.sample().await {
                            Ok(used) => {
                                if let Err(e) =
                                    notifier.notify(&render_message(&content, used)).await
                                {
                                    error!("Error re-sending memory warning: {e}");
                                }
                            }
                            Err(e) => error!("Error checking memory usage: {e}"),
                        }
                    }
                }
            }
        });

        RepeaterHandle { token }
    }
}
