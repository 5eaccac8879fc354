// Worker and front-end constants (no magic values)

/// Default worker pool size
pub const DEFAULT_WORKER_COUNT: usize = 1;

/// Progress cadence used by interactive front-ends (~ one 60Hz frame)
pub const FRAME_PROGRESS_INTERVAL_MS: u64 = 16;

/// Upper bound of `Worker::progress`
pub const MAX_PROGRESS_PERCENT: f64 = 100.0;
