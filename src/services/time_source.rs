//! Clocks driving the game tick.
//!
//! `TickClock` decides when the game advances. It reads and waits on time
//! through a `TimeSource`, so loop tests can run on a `SimulatedClock`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Where the loop gets "now" from and how it waits.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Wall clock and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn shared() -> SharedTimeSource {
        Arc::new(SystemClock)
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to. `sleep` returns at once after moving
/// the clock forward by the requested amount.
#[derive(Debug)]
pub struct SimulatedClock {
    start: Instant,
    now: Mutex<Instant>,
}

impl SimulatedClock {
    pub fn shared() -> Arc<Self> {
        let start = Instant::now();
        Arc::new(Self {
            start,
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += duration;
    }

    /// Simulated time passed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now() - self.start
    }
}

impl TimeSource for SimulatedClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Fixed-period tick scheduler.
///
/// A tick is due once a full period has passed since the previous one. When
/// it is not due, the caller waits half of what remains, so input keeps being
/// polled while the deadline approaches.
#[derive(Debug)]
pub struct TickClock {
    source: SharedTimeSource,
    period: Duration,
    last_tick: Instant,
    ticks: u64,
}

impl TickClock {
    pub fn new(source: SharedTimeSource, period: Duration) -> Self {
        let last_tick = source.now();
        Self {
            source,
            period,
            last_tick,
            ticks: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start the first period from now.
    pub fn restart(&mut self) {
        self.last_tick = self.source.now();
    }

    /// Returns true and starts a new period if a tick is due; otherwise
    /// sleeps for half the time left in the current period.
    pub fn tick_or_wait(&mut self) -> bool {
        let now = self.source.now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed >= self.period {
            self.last_tick = now;
            self.ticks += 1;
            true
        } else {
            self.source.sleep((self.period - elapsed) / 2);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PERIOD: Duration = Duration::from_millis(300);

    fn clock() -> (Arc<SimulatedClock>, TickClock) {
        let time = SimulatedClock::shared();
        let ticker = TickClock::new(time.clone(), PERIOD);
        (time, ticker)
    }

    #[test]
    fn test_no_tick_before_period() {
        let (time, mut ticker) = clock();
        time.advance(Duration::from_millis(100));

        assert!(!ticker.tick_or_wait());
        // Waited half of the remaining 200ms
        assert_eq!(time.elapsed(), Duration::from_millis(200));
        assert_eq!(ticker.ticks(), 0);
    }

    #[test]
    fn test_waits_converge_on_deadline() {
        let (time, mut ticker) = clock();
        let mut waits = 0;
        while !ticker.tick_or_wait() {
            // Each loop iteration also spends a little time polling input
            time.advance(Duration::from_millis(5));
            waits += 1;
            assert!(waits < 64, "never reached the tick");
        }
        assert!(time.elapsed() >= PERIOD);
        assert_eq!(ticker.ticks(), 1);
    }

    #[test]
    fn test_late_tick_starts_period_from_now() {
        let (time, mut ticker) = clock();
        time.advance(Duration::from_millis(1000));
        assert!(ticker.tick_or_wait());

        time.advance(Duration::from_millis(299));
        assert!(!ticker.tick_or_wait());
    }

    #[test]
    fn test_restart_resets_period() {
        let (time, mut ticker) = clock();
        time.advance(Duration::from_millis(500));
        ticker.restart();
        time.advance(Duration::from_millis(100));
        assert!(!ticker.tick_or_wait());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() > before);
    }

    proptest! {
        #[test]
        fn prop_ticks_never_closer_than_period(
            steps in proptest::collection::vec(0u64..700, 1..200),
        ) {
            let (time, mut ticker) = clock();
            let mut tick_times = Vec::new();
            for step in steps {
                time.advance(Duration::from_millis(step));
                if ticker.tick_or_wait() {
                    tick_times.push(time.now());
                }
            }
            for pair in tick_times.windows(2) {
                prop_assert!(pair[1] - pair[0] >= PERIOD);
            }
        }
    }
}
