use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::pipeline::orchestrator::Signal;

/// Periodic tick source for one countdown. Only sends ticks; the orchestrator
/// decides what they mean. Dropping it stops the timer.
pub(crate) struct Countdown {
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start ticking every `period`; each tick carries `id` so ticks from an
    /// earlier countdown can be told apart.
    pub fn start(id: u64, period: Duration, signals: mpsc::UnboundedSender<Signal>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if signals.send(Signal::Tick { countdown: id }).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
