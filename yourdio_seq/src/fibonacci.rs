// Fibonacci sequence: 1, 1, 2, 3, 5, 8, ...
//
// The melodic layer scales these by a theme-supplied `base_unit` to get note
// durations. Terms saturate at `u64::MAX` rather than overflow; nothing in a
// theme asks for more than a few dozen terms.

use serde::{Deserialize, Serialize};

/// Restartable Fibonacci iterator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fibonacci {
    current: u64,
    next: u64,
    index: usize,
}

impl Fibonacci {
    /// A stream positioned at the first term.
    pub fn new() -> Self {
        Self {
            current: 1,
            next: 1,
            index: 0,
        }
    }

    /// A stream whose first item is term `index` (zero-indexed).
    pub fn starting_at(index: usize) -> Self {
        let mut fib = Self::new();
        for _ in 0..index {
            fib.advance();
        }
        fib
    }

    /// Index of the term the next call to `next()` will return.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Back to the first term.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    fn advance(&mut self) {
        let sum = self.current.saturating_add(self.next);
        self.current = self.next;
        self.next = sum;
        self.index += 1;
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Fibonacci {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let term = self.current;
        self.advance();
        Some(term)
    }
}

/// The first `n` Fibonacci terms.
pub fn fibonacci(n: usize) -> Vec<u64> {
    Fibonacci::new().take(n).collect()
}
