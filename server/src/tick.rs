use std::time::Duration;

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// One monotonic clock reading, broadcast to every map actor. Coarse timers
/// (wander, despawn, respawn) compare against `seconds`, attack cooldowns
/// against the finer `millis` count. Both are measured from server start, so
/// wall-clock adjustments never touch them.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub seconds: u64,
    pub millis: u64,
    pub monotonic_time: Instant,
}

#[cfg(test)]
impl Tick {
    pub fn at(seconds: u64, millis: u64) -> Self {
        Self { seconds, millis, monotonic_time: Instant::now() }
    }
}

pub type Sender = broadcast::Sender<Tick>;
pub type Receiver = broadcast::Receiver<Tick>;

pub static TICK_INTERVAL: Duration = Duration::from_millis(100);

pub fn spawn_producer() -> (broadcast::Sender<Tick>, JoinHandle<()>) {
    let (tick_sender, _) = broadcast::channel(8);
    let spawn_tick_sender = tick_sender.clone();
    let join_handle = tokio::spawn(async move {
        let started_at = Instant::now();
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let monotonic_time = interval.tick().await;
            let since_start = monotonic_time - started_at;
            let tick = Tick {
                seconds: since_start.as_secs(),
                millis: since_start.as_millis() as u64,
                monotonic_time,
            };

            // Ignore errors if there are no receivers
            let _ = spawn_tick_sender.send(tick);
        }
    });
    (tick_sender, join_handle)
}
