use std::time::Duration;

/// Fixed simulation rate of the reference build.
pub const FRAMES_PER_SECOND: u32 = 60;

/// Wall-clock length of one tick at `rate` Hz.
pub fn tick_interval(rate: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate.max(1)))
}

/// Convert a frame count to seconds at the reference rate.
pub fn frames_to_secs(frames: u64) -> f64 {
    frames as f64 / f64::from(FRAMES_PER_SECOND)
}
