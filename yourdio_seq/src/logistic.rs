// Logistic map cursor: x[n+1] = r * x[n] * (1 - x[n]).
//
// There is no closed form for jumping ahead, so the cursor keeps its seed and
// its current iterate. Restarting replays from the seed; `advance(n)` steps
// forward explicitly. The ambient-event layer owns one cursor per generation
// call and steps it once per checkpoint.

use serde::{Deserialize, Serialize};

/// Stateful logistic-map iterator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticMap {
    r: f64,
    seed: f64,
    x: f64,
    steps: u64,
}

impl LogisticMap {
    /// A cursor at `x0` that has not been stepped.
    pub fn new(r: f64, x0: f64) -> Self {
        Self {
            r,
            seed: x0,
            x: x0,
            steps: 0,
        }
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// The most recent iterate (the seed before the first step).
    pub fn current(&self) -> f64 {
        self.x
    }

    /// How many times the map has been applied since the seed.
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Apply the map once and return the new iterate.
    pub fn step(&mut self) -> f64 {
        self.x = self.r * self.x * (1.0 - self.x);
        self.steps += 1;
        self.x
    }

    /// Apply the map `n` times and return the final iterate.
    pub fn advance(&mut self, n: u64) -> f64 {
        for _ in 0..n {
            self.step();
        }
        self.x
    }

    /// Rewind to the seed.
    pub fn reset(&mut self) {
        self.x = self.seed;
        self.steps = 0;
    }
}

impl Iterator for LogisticMap {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_iterate() {
        let mut map = LogisticMap::new(3.86, 0.5);
        assert_eq!(map.step(), 3.86 * 0.5 * 0.5);
        assert_eq!(map.steps_taken(), 1);
    }

    #[test]
    fn threshold_pattern_regression() {
        // r = 3.86, x0 = 0.5, threshold 0.87: the first 20 iterates cross
        // the threshold at these indices and nowhere else.
        let fired: Vec<usize> = LogisticMap::new(3.86, 0.5)
            .take(20)
            .enumerate()
            .filter(|&(_, x)| x > 0.87)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(fired, vec![0, 3, 6, 9, 11]);
    }

    #[test]
    fn reset_replays_from_seed() {
        let mut map = LogisticMap::new(3.7, 0.31);
        let first: Vec<f64> = map.by_ref().take(50).collect();
        map.reset();
        assert_eq!(map.current(), 0.31);
        let again: Vec<f64> = map.take(50).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn advance_matches_stepping() {
        let mut a = LogisticMap::new(3.86, 0.42);
        let mut b = a.clone();
        let advanced = a.advance(17);
        let stepped = b.by_ref().take(17).last().unwrap();
        assert_eq!(advanced, stepped);
        assert_eq!(a.steps_taken(), b.steps_taken());
    }

    #[test]
    fn iterates_stay_in_unit_interval() {
        for x in LogisticMap::new(3.99, 0.123).take(10_000) {
            assert!((0.0..=1.0).contains(&x), "iterate out of range: {x}");
        }
    }

    #[test]
    fn zero_seed_is_a_fixed_point() {
        assert!(LogisticMap::new(3.86, 0.0).take(64).all(|x| x == 0.0));
    }
}
