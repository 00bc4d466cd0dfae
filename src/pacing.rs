use std::time::{Duration, Instant};

use bevy::prelude::*;

/// Caps the frame rate by sleeping away the rest of each frame's budget
pub struct FramePacingPlugin {
    /// 0 disables the limiter
    pub target_fps: u32,
}

#[derive(Resource, Debug)]
pub struct FramePacer {
    budget: Option<Duration>,
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32) -> Self {
        Self {
            budget: frame_budget(target_fps),
            frame_start: Instant::now(),
        }
    }
}

impl Plugin for FramePacingPlugin {
    fn build(&self, app: &mut App) {
        // Blocking the browser's main thread is not an option
        if cfg!(target_arch = "wasm32") {
            return;
        }
        app.insert_resource(FramePacer::new(self.target_fps))
            .add_systems(Last, pace_frame);
    }
}

pub fn frame_budget(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_nanos(1_000_000_000 / target_fps as u64))
}

/// Time left to wait once `elapsed` of the frame `budget` is spent
pub fn remaining(budget: Option<Duration>, elapsed: Duration) -> Option<Duration> {
    budget
        .and_then(|budget| budget.checked_sub(elapsed))
        .filter(|wait| !wait.is_zero())
}

fn pace_frame(mut pacer: ResMut<FramePacer>) {
    if let Some(wait) = remaining(pacer.budget, pacer.frame_start.elapsed()) {
        std::thread::sleep(wait);
    }
    pacer.frame_start = Instant::now();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_budget() {
        assert_eq!(frame_budget(0), None);
        assert_eq!(frame_budget(50), Some(Duration::from_millis(20)));
        let sixty = frame_budget(60).unwrap();
        assert!(sixty > Duration::from_micros(16_600) && sixty < Duration::from_micros(16_700));
    }

    #[test]
    fn test_remaining() {
        let budget = Some(Duration::from_millis(20));
        assert_eq!(
            remaining(budget, Duration::from_millis(5)),
            Some(Duration::from_millis(15))
        );
        assert_eq!(remaining(budget, Duration::from_millis(20)), None);
        assert_eq!(remaining(budget, Duration::from_millis(35)), None);
        assert_eq!(remaining(None, Duration::ZERO), None);
    }
}
