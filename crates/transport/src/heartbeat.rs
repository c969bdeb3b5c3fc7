use std::time::{Duration, Instant};

use tokio::time::{Interval, MissedTickBehavior, interval};

/// Drives the "keeper" side of a heartbeat and tracks peer liveness for the
/// connection-owning task to consult.
///
/// `HeartbeatClock` is not itself a task: per the protocol's design notes
/// (no mixed-purpose monitor threads), the owning task `select!`s on
/// [`HeartbeatClock::tick`] alongside its normal frame reads, sending a
/// `HEARTBEAT` frame on every tick and calling [`HeartbeatClock::note_traffic`]
/// whenever any frame — heartbeat or otherwise — arrives from the peer.
pub struct HeartbeatClock {
    ticker: Interval,
    interval: Duration,
    last_seen: Instant,
}

impl HeartbeatClock {
    /// Creates a clock that ticks every `interval` and considers the peer
    /// alive as of now.
    #[must_use]
    pub fn new(interval_period: Duration) -> Self {
        let mut ticker = interval(interval_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            interval: interval_period,
            last_seen: Instant::now(),
        }
    }

    /// Awaits the next send-a-heartbeat tick.
    pub async fn tick(&mut self) {
        self.ticker.tick().await;
    }

    /// Records that traffic (of any kind) was just observed from the peer.
    pub fn note_traffic(&mut self) {
        self.last_seen = Instant::now();
    }

    /// True once no traffic has been observed for `2 * interval` (§4.2, P6).
    #[must_use]
    pub fn is_peer_dead(&self) -> bool {
        self.last_seen.elapsed() >= self.interval * 2
    }

    /// Time since the peer was last heard from.
    #[must_use]
    pub fn since_last_traffic(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fresh_clock_does_not_report_peer_dead() {
        let clock = HeartbeatClock::new(Duration::from_millis(50));
        assert!(!clock.is_peer_dead());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_peer_is_eventually_reported_dead() {
        let mut clock = HeartbeatClock::new(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(25)).await;
        assert!(clock.is_peer_dead());
        clock.note_traffic();
        assert!(!clock.is_peer_dead());
    }
}
