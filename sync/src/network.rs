//! Network simulation.
//!
//! The remote store asks a [`NetworkSimulator`] how long a round trip takes
//! and whether it fails. Production wiring uses [`RandomNetwork`]; tests plug
//! in [`FixedNetwork`] or [`ScriptedNetwork`] for deterministic runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;

use crate::config::SyncConfig;

/// Source of latency and transient failures for simulated round trips.
pub trait NetworkSimulator: Send + Sync {
    /// Latency of the next round trip.
    fn delay(&self) -> Duration;

    /// Whether the next round trip fails.
    fn should_fail(&self) -> bool;
}

/// Uniformly random latency with a fixed failure probability.
#[derive(Debug, Clone)]
pub struct RandomNetwork {
    latency_min: Duration,
    latency_max: Duration,
    failure_rate: f64,
}

impl RandomNetwork {
    /// `failure_rate` is clamped into `0.0..=1.0`.
    pub fn new(latency_min: Duration, latency_max: Duration, failure_rate: f64) -> Self {
        Self {
            latency_min: latency_min.min(latency_max),
            latency_max,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.latency_min, config.latency_max, config.failure_rate)
    }
}

impl NetworkSimulator for RandomNetwork {
    fn delay(&self) -> Duration {
        rand::thread_rng().gen_range(self.latency_min..=self.latency_max)
    }

    fn should_fail(&self) -> bool {
        rand::thread_rng().gen_bool(self.failure_rate)
    }
}

/// Constant latency, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNetwork {
    delay: Duration,
}

impl FixedNetwork {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl NetworkSimulator for FixedNetwork {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn should_fail(&self) -> bool {
        false
    }
}

/// Plays back scripted delays and failures in call order.
///
/// Once a script runs out, the fallback delay is used and calls succeed.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    delays: Mutex<VecDeque<Duration>>,
    failures: Mutex<VecDeque<bool>>,
    fallback: Duration,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub fn new(fallback: Duration) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Queue delays for the next round trips.
    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        lock(&self.delays).extend(delays);
        self
    }

    /// Queue failure decisions for the next round trips.
    pub fn with_failures(self, failures: impl IntoIterator<Item = bool>) -> Self {
        lock(&self.failures).extend(failures);
        self
    }

    /// Number of round trips started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NetworkSimulator for ScriptedNetwork {
    fn delay(&self) -> Duration {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.delays).pop_front().unwrap_or(self.fallback)
    }

    fn should_fail(&self) -> bool {
        lock(&self.failures).pop_front().unwrap_or(false)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_within_bounds() {
        let network = RandomNetwork::new(Duration::from_millis(400), Duration::from_millis(900), 0.15);
        for _ in 0..200 {
            let delay = network.delay();
            assert!(delay >= Duration::from_millis(400));
            assert!(delay <= Duration::from_millis(900));
        }
    }

    #[test]
    fn random_delay_keeps_sub_millisecond_precision() {
        let network = RandomNetwork::new(Duration::from_micros(1500), Duration::from_micros(1500), 0.0);
        assert_eq!(network.delay(), Duration::from_micros(1500));

        let network = RandomNetwork::new(Duration::from_micros(200), Duration::from_micros(800), 0.0);
        for _ in 0..200 {
            let delay = network.delay();
            assert!(delay >= Duration::from_micros(200));
            assert!(delay <= Duration::from_micros(800));
        }
    }

    #[test]
    fn random_failure_extremes() {
        let never = RandomNetwork::new(Duration::ZERO, Duration::ZERO, 0.0);
        let always = RandomNetwork::new(Duration::ZERO, Duration::ZERO, 1.0);
        for _ in 0..50 {
            assert!(!never.should_fail());
            assert!(always.should_fail());
        }
    }

    #[test]
    fn random_clamps_bad_input() {
        let network = RandomNetwork::new(Duration::from_millis(10), Duration::from_millis(5), 7.0);
        assert!(network.should_fail());
        assert_eq!(network.delay(), Duration::from_millis(5));
    }

    #[test]
    fn scripted_plays_back_then_falls_back() {
        let network = ScriptedNetwork::new(Duration::from_millis(1))
            .with_delays([Duration::from_millis(300), Duration::from_millis(10)])
            .with_failures([true]);

        assert_eq!(network.delay(), Duration::from_millis(300));
        assert!(network.should_fail());
        assert_eq!(network.delay(), Duration::from_millis(10));
        assert!(!network.should_fail());
        assert_eq!(network.delay(), Duration::from_millis(1));
        assert_eq!(network.calls(), 3);
    }
}
