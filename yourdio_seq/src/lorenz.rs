// Lorenz attractor trajectory, integrated with a fixed Euler step.
//
//   dx/dt = sigma * (y - x)
//   dy/dt = x * (rho - z) - y
//   dz/dt = x * y - beta * z
//
// The drone layer samples `x` once per controller event. Mapping to a
// controller range uses a fixed expected attractor span (`X_SPAN`), never a
// running min/max, so a sample's value does not depend on how long the
// trajectory has been running.

use serde::{Deserialize, Serialize};

/// Default integration step.
pub const DEFAULT_DT: f64 = 0.01;

/// Expected extent of the `x` coordinate for the classic parameter set.
/// Samples outside this band clamp to the ends of the output range.
pub const X_SPAN: (f64, f64) = (-20.0, 20.0);

/// The three Lorenz system parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LorenzParams {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

/// A point on the trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LorenzState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LorenzState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Stateful trajectory cursor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lorenz {
    params: LorenzParams,
    initial: LorenzState,
    state: LorenzState,
    dt: f64,
    steps: u64,
}

impl Lorenz {
    pub fn new(params: LorenzParams, initial: LorenzState) -> Self {
        Self::with_step(params, initial, DEFAULT_DT)
    }

    pub fn with_step(params: LorenzParams, initial: LorenzState, dt: f64) -> Self {
        Self {
            params,
            initial,
            state: initial,
            dt,
            steps: 0,
        }
    }

    pub fn params(&self) -> LorenzParams {
        self.params
    }

    pub fn state(&self) -> LorenzState {
        self.state
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Advance one Euler step and return the new state.
    pub fn step(&mut self) -> LorenzState {
        let LorenzParams { sigma, rho, beta } = self.params;
        let LorenzState { x, y, z } = self.state;
        let dx = sigma * (y - x) * self.dt;
        let dy = (x * (rho - z) - y) * self.dt;
        let dz = (x * y - beta * z) * self.dt;
        self.state = LorenzState::new(x + dx, y + dy, z + dz);
        self.steps += 1;
        self.state
    }

    /// Rewind to the initial state.
    pub fn reset(&mut self) {
        self.state = self.initial;
        self.steps = 0;
    }

    /// Step once and map the new `x` into `[low, high]`.
    pub fn next_controller_value(&mut self, low: u8, high: u8) -> u8 {
        let state = self.step();
        normalize_x(state.x, low, high)
    }
}

impl Iterator for Lorenz {
    type Item = LorenzState;

    fn next(&mut self) -> Option<LorenzState> {
        Some(self.step())
    }
}

/// Min-max map of an `x` sample over `X_SPAN` into `[low, high]`.
pub fn normalize_x(x: f64, low: u8, high: u8) -> u8 {
    let (span_low, span_high) = X_SPAN;
    let t = ((x - span_low) / (span_high - span_low)).clamp(0.0, 1.0);
    let value = low as f64 + t * (high as f64 - low as f64);
    value
        .round()
        .clamp(low.min(high) as f64, low.max(high) as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Lorenz {
        Lorenz::new(LorenzParams::default(), LorenzState::new(0.1, 0.0, 0.0))
    }

    #[test]
    fn first_step_matches_euler() {
        let mut lorenz = classic();
        let s = lorenz.step();
        assert!((s.x - (0.1 + 10.0 * (0.0 - 0.1) * 0.01)).abs() < 1e-12);
        assert!((s.y - (0.1 * 28.0 * 0.01)).abs() < 1e-12);
        assert_eq!(s.z, 0.0);
    }

    #[test]
    fn deterministic_and_restartable() {
        let mut a = classic();
        let first: Vec<LorenzState> = a.by_ref().take(500).collect();
        a.reset();
        assert_eq!(a.steps_taken(), 0);
        let again: Vec<LorenzState> = a.take(500).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn trajectory_stays_bounded() {
        for s in classic().take(20_000) {
            assert!(s.x.is_finite() && s.y.is_finite() && s.z.is_finite());
            assert!(s.x.abs() < 30.0, "x escaped: {}", s.x);
        }
    }

    #[test]
    fn normalize_endpoints() {
        assert_eq!(normalize_x(-20.0, 0, 127), 0);
        assert_eq!(normalize_x(20.0, 0, 127), 127);
        assert_eq!(normalize_x(0.0, 0, 127), 64);
        assert_eq!(normalize_x(-500.0, 30, 100), 30);
        assert_eq!(normalize_x(500.0, 30, 100), 100);
    }

    #[test]
    fn controller_values_change_gradually() {
        let mut lorenz = classic();
        // Warm up past the initial transient.
        lorenz.by_ref().take(1000).for_each(drop);
        let mut prev = lorenz.next_controller_value(0, 127) as i32;
        for _ in 0..2000 {
            let v = lorenz.next_controller_value(0, 127) as i32;
            assert!((v - prev).abs() <= 16, "jump from {prev} to {v}");
            prev = v;
        }
    }
}
