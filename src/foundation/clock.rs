use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

/// Monotonic time source in milliseconds.
///
/// Engines read time only through this trait so playback can be driven deterministically.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds relative to an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// High-resolution wall clock backed by [`Instant`].
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock. Clones share the same time value.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now_bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock starting at `0 ms`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute time.
    pub fn set_ms(&self, now_ms: f64) {
        self.now_bits.store(now_ms.to_bits(), Ordering::SeqCst);
    }

    /// Move time forward by `delta_ms` and return the new time.
    pub fn advance_ms(&self, delta_ms: f64) -> f64 {
        let next = self.now_ms() + delta_ms;
        self.set_ms(next);
        next
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }
}
