use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A display-refresh timestamp in milliseconds on the host's monotonic clock
/// (the value a `requestAnimationFrame` callback receives).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FrameTime {
    millis: f64,
}

impl FrameTime {
    /// Create a timestamp from milliseconds.
    pub fn from_millis(ms: f64) -> Self {
        Self { millis: ms }
    }

    /// Create a timestamp from seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self::from_millis(s * 1000.0)
    }

    /// The time origin.
    pub fn zero() -> Self {
        Self { millis: 0.0 }
    }

    pub fn as_millis(&self) -> f64 {
        self.millis
    }

    pub fn as_seconds(&self) -> f64 {
        self.millis / 1000.0
    }

    /// Seconds elapsed since `earlier`. A clock that steps backwards yields
    /// zero rather than a negative delta.
    pub fn seconds_since(&self, earlier: FrameTime) -> f64 {
        ((self.millis - earlier.millis) / 1000.0).max(0.0)
    }
}

impl Default for FrameTime {
    fn default() -> Self {
        FrameTime::zero()
    }
}

impl Add<f64> for FrameTime {
    type Output = FrameTime;

    /// Advance by a number of milliseconds.
    fn add(self, rhs: f64) -> FrameTime {
        FrameTime::from_millis(self.millis + rhs)
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.millis.max(0.0) as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1_000;
        let ms = total_ms % 1_000;
        write!(f, "{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_since() {
        let a = FrameTime::from_millis(1000.0);
        let b = a + 16.0;
        assert!((b.seconds_since(a) - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_since_never_negative() {
        let a = FrameTime::from_millis(500.0);
        let b = FrameTime::from_millis(400.0);
        assert_eq!(b.seconds_since(a), 0.0);
    }

    #[test]
    fn test_frame_time_display() {
        let ts = FrameTime::from_seconds(3661.5);
        assert_eq!(format!("{}", ts), "01:01:01.500");
    }
}
