//! Fixed-timestep game clock using an accumulator pattern.
//!
//! The host calls `update()` once per animation frame with a wall-clock
//! timestamp. GameTime turns the variable frame delta into a whole number of
//! fixed `dt` steps, so the simulation is deterministic and testable.

/// Upper bound on steps handed out by a single `update()`.
pub const MAX_STEPS_PER_FRAME: u32 = 1000;

pub struct GameTime {
    /// Simulation steps per real-time second (e.g. 60).
    tick_rate: u32,
    /// Accumulated seconds not yet consumed as steps.
    accumulator: f64,
    /// Total steps handed out since creation.
    pub total_steps: u64,
    /// Timestamp of the last update (ms), None if first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_rate: tick_rate.max(1),
            accumulator: 0.0,
            total_steps: 0,
            last_timestamp: None,
        }
    }

    /// Seconds simulated by one step.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Change the step rate. Accumulated time carries over.
    pub fn set_tick_rate(&mut self, tick_rate: u32) {
        self.tick_rate = tick_rate.max(1);
    }

    /// Feed a wall-clock timestamp in milliseconds and get back the number
    /// of `dt` steps to simulate this frame.
    ///
    /// At most [`MAX_STEPS_PER_FRAME`] steps are returned. When the cap is
    /// hit, the leftover accumulated time is dropped rather than carried into
    /// the next frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => ((now_ms - prev) / 1000.0).max(0.0),
            None => 0.0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let dt = self.dt();
        let mut steps = 0;
        while self.accumulator >= dt && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= dt;
            steps += 1;
        }
        if steps >= MAX_STEPS_PER_FRAME {
            self.accumulator = 0.0;
        }
        self.total_steps += steps as u64;
        steps
    }

    /// Forget pending time, e.g. after the state was replaced wholesale.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_timestamp = None;
    }
}
