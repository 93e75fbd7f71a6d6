// Ascending prime numbers, cached for window slicing.
//
// The composer needs arbitrary contiguous windows of the prime sequence
// (chapter 3's drone layer might read primes[19..27]). `PrimeTable` grows a
// shared cache by trial division against the primes it already knows, so a
// second window request never recomputes what an earlier one produced.
// `PrimeStream` is the iterator form: a cursor over a table that can be
// seeked to any index.

use serde::{Deserialize, Serialize};

/// Growable cache of the first N primes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrimeTable {
    primes: Vec<u64>,
}

impl PrimeTable {
    pub fn new() -> Self {
        Self { primes: Vec::new() }
    }

    /// Number of primes currently cached.
    pub fn cached(&self) -> usize {
        self.primes.len()
    }

    /// Extend the cache until it holds at least `count` primes.
    pub fn extend_to(&mut self, count: usize) {
        if self.primes.len() >= count {
            return;
        }
        self.primes.reserve(count - self.primes.len());
        let mut candidate = match self.primes.last().copied() {
            None => 2,
            Some(2) => 3,
            Some(p) => p + 2,
        };
        while self.primes.len() < count {
            if self.is_prime_against_cache(candidate) {
                self.primes.push(candidate);
            }
            candidate += if candidate == 2 { 1 } else { 2 };
        }
    }

    /// Trial division by cached primes. Valid because candidates are tested
    /// in ascending order, so every prime below sqrt(candidate) is cached.
    fn is_prime_against_cache(&self, candidate: u64) -> bool {
        for &p in &self.primes {
            if p * p > candidate {
                break;
            }
            if candidate % p == 0 {
                return false;
            }
        }
        true
    }

    /// The `n`th prime, zero-indexed (`nth(0) == 2`).
    pub fn nth(&mut self, n: usize) -> u64 {
        self.extend_to(n + 1);
        self.primes[n]
    }

    /// The contiguous window `primes[start..start + len]`.
    pub fn window(&mut self, start: usize, len: usize) -> Vec<u64> {
        self.extend_to(start + len);
        self.primes[start..start + len].to_vec()
    }
}

/// Iterator over the prime sequence, restartable from any index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrimeStream {
    table: PrimeTable,
    index: usize,
}

impl PrimeStream {
    /// A stream positioned at 2.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A stream whose first item is the `index`th prime.
    pub fn starting_at(index: usize) -> Self {
        Self {
            table: PrimeTable::new(),
            index,
        }
    }

    /// Index of the prime the next call to `next()` will return.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Reposition the cursor. Cached primes are kept.
    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }
}

impl Iterator for PrimeStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let p = self.table.nth(self.index);
        self.index += 1;
        Some(p)
    }
}
