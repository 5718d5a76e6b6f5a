//! Periodic position sampler
//!
//! One task per open resource. The engine owns the handle and aborts it on
//! teardown; the tick closure may also end the task by returning `Break`.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Shortest accepted sampling period
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawn a task that runs `tick` every `period`
///
/// The first tick fires one full period after spawning. Ticks missed while
/// a previous tick was still running are skipped rather than bunched up.
pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval yields immediately on the first call
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if tick().await.is_break() {
                break;
            }
        }
    })
}
