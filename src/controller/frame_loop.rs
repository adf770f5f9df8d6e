use super::animation::AnimationUpdater;
use super::input::InputState;
use super::input_sampler::{FrameRequests, InputSampler};
use crate::model::SimulationState;

/// Wall-clock bookkeeping for per-frame delta time.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_timestamp: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick (or since 0 on the first tick).
    pub fn tick(&mut self, now: f64) -> f64 {
        let delta = now - self.last_timestamp;
        self.last_timestamp = now;
        delta
    }

    pub fn last_timestamp(&self) -> f64 {
        self.last_timestamp
    }
}

/// Main loop state and per-frame update order
pub struct FrameLoopContext {
    pub clock: FrameClock,
    pub sampler: InputSampler,
    pub animator: AnimationUpdater,
    /// Upper bound on the delta handed to the simulation, in seconds.
    pub max_frame_delta: f32,
    last_dt: f32,
}

impl FrameLoopContext {
    pub fn new(sampler: InputSampler, max_frame_delta: f32) -> Self {
        Self {
            clock: FrameClock::new(),
            sampler,
            animator: AnimationUpdater::new(),
            max_frame_delta,
            last_dt: 0.0,
        }
    }

    /// One frame: time step, input, then animation. `now` is in seconds.
    pub fn tick(&mut self, state: &mut SimulationState, input: &mut InputState, now: f64) -> FrameRequests {
        let dt = (self.clock.tick(now) as f32).clamp(0.0, self.max_frame_delta);
        self.last_dt = dt;

        let requests = self.sampler.sample(state, input, dt);
        self.animator.update(state, dt);
        requests
    }

    /// Delta used by the most recent tick.
    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_reports_time_since_last_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(0.5), 0.5);
        assert!((clock.tick(0.75) - 0.25).abs() < 1e-12);
        assert_eq!(clock.last_timestamp(), 0.75);
    }
}
