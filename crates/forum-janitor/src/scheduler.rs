//! Fixed-interval garbage collection timer.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::ForumApi;
use crate::clock::Clock;
use crate::collector::Collector;

pub struct Scheduler<A: ForumApi, C: Clock> {
    collector: Collector<A, C>,
    interval: Duration,
}

impl<A: ForumApi, C: Clock> Scheduler<A, C> {
    pub fn new(collector: Collector<A, C>, interval: Duration) -> Self {
        Self {
            collector,
            interval,
        }
    }

    /// Sweep every `interval`, forever. The first sweep runs one interval
    /// after start. A sweep that overruns delays the next tick; sweeps never
    /// overlap.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "starting garbage collector");

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let started = Instant::now();
            let reports = self.collector.collect().await;
            debug!(
                guilds = reports.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "sweep finished"
            );
        }
    }
}
