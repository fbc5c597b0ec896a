//! Frame rate counter shown over the viewport

use std::collections::VecDeque;

use crate::constants::STATS_WINDOW;

/// Rolling frame statistics
///
/// Timestamps come from the caller's clock (seconds), which keeps the
/// counter independent of the platform timer.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    /// Frame timestamps inside the rolling window
    frames: VecDeque<f64>,
    last: Option<f64>,
    frame_time: f64,
    max_frame_time: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame presented at `now`
    pub fn record(&mut self, now: f64) {
        if let Some(last) = self.last {
            self.frame_time = (now - last).max(0.0);
        }
        self.last = Some(now);
        self.frames.push_back(now);
        while self
            .frames
            .front()
            .is_some_and(|&t| now - t > STATS_WINDOW)
        {
            self.frames.pop_front();
        }
        self.max_frame_time = self
            .frames
            .iter()
            .zip(self.frames.iter().skip(1))
            .map(|(a, b)| b - a)
            .fold(self.frame_time, f64::max);
    }

    /// Frames per second over the last window
    pub fn fps(&self) -> f64 {
        match (self.frames.front(), self.frames.back()) {
            (Some(first), Some(last)) if last > first => {
                (self.frames.len() - 1) as f64 / (last - first)
            }
            _ => 0.0,
        }
    }

    /// Duration of the last frame in milliseconds
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time * 1000.0
    }

    /// Slowest frame of the window in milliseconds
    pub fn max_frame_time_ms(&self) -> f64 {
        self.max_frame_time * 1000.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_steady_rate() {
        let mut stats = FrameStats::new();
        for i in 0..=120 {
            stats.record(i as f64 / 60.0);
        }
        assert_relative_eq!(stats.fps(), 60.0, epsilon = 1e-6);
        assert_relative_eq!(stats.frame_time_ms(), 1000.0 / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_window_forgets_old_frames() {
        let mut stats = FrameStats::new();
        // A long stall followed by fast frames
        stats.record(0.0);
        stats.record(2.0);
        for i in 1..=10 {
            stats.record(2.0 + i as f64 * 0.01);
        }
        assert_relative_eq!(stats.fps(), 100.0, epsilon = 1e-6);
        assert_relative_eq!(stats.max_frame_time_ms(), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.fps(), 0.0);
        stats.record(1.0);
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.frame_time_ms(), 0.0);
        stats.reset();
        assert!(stats.last.is_none());
    }
}
