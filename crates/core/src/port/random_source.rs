// Random Source Port (for deterministic testing)

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Random source interface (allows seeded or scripted durations in tests)
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[low, high)`; callers guarantee `low < high`
    fn sample_range(&self, low: u64, high: u64) -> u64;
}

/// Thread-local RNG (production)
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn sample_range(&self, low: u64, high: u64) -> u64 {
        rand::thread_rng().gen_range(low..high)
    }
}

/// Reproducible RNG seeded once at construction
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn sample_range(&self, low: u64, high: u64) -> u64 {
        // A poisoned lock still holds a usable RNG state
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(low..high)
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted values, clamped into the requested range.
    /// Falls back to `low` once the script runs out.
    pub struct FixedRandomSource {
        values: Mutex<VecDeque<u64>>,
    }

    impl FixedRandomSource {
        pub fn new(values: Vec<u64>) -> Self {
            Self {
                values: Mutex::new(values.into()),
            }
        }
    }

    impl RandomSource for FixedRandomSource {
        fn sample_range(&self, low: u64, high: u64) -> u64 {
            let next = self
                .values
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front();
            match next {
                Some(v) => v.clamp(low, high.saturating_sub(1).max(low)),
                None => low,
            }
        }
    }
}
