// Per-call generation context.
//
// Built by the assembler immediately before the layer generators run and
// dropped afterwards. It pins down everything that varies between chapters
// (or between event soundscapes): position in the piece, length in beats,
// intensity and the tuning derived from it, the chaos seed, and one prime
// window per layer.
//
// Layers must not share a prime window, or their rhythms would move in lock
// step. Long-form chapters take consecutive windows of the prime stream
// (layer N starts `N * PRIME_WINDOW_LEN` primes after the chapter's base
// index); event soundscapes rotate their fixed prime list by the layer index.

use yourdio_seq::PrimeTable;

use crate::arc::ChapterTuning;
use crate::error::{CompositionError, Result};
use crate::event::TrackId;

/// Primes per layer window in long-form chapters.
pub const PRIME_WINDOW_LEN: usize = 8;

/// Modulus for deriving a chapter's chaos seed from its base prime.
const CHAOS_SEED_MODULUS: u64 = 97;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub chapter_index: usize,
    pub total_chapters: usize,
    pub duration_beats: f64,
    pub tuning: ChapterTuning,
    /// The chapter's base prime window (the harmonic bed's window).
    pub prime_window: Vec<u64>,
    /// Seed for the logistic map and the Lorenz attractor, in [0, 1].
    pub chaos_seed: f64,
    layer_windows: [Vec<u64>; 4],
}

impl GenerationContext {
    /// Context for one chapter of a long-form piece, drawing its prime
    /// windows from `primes`.
    pub fn for_chapter(
        primes: &mut PrimeTable,
        chapter_index: usize,
        total_chapters: usize,
        duration_beats: f64,
        tuning: ChapterTuning,
    ) -> Result<Self> {
        let layer_windows = TrackId::ALL.map(|track| {
            primes.window(
                chapter_index + track.index() * PRIME_WINDOW_LEN,
                PRIME_WINDOW_LEN,
            )
        });
        let chaos_seed =
            (primes.nth(chapter_index) % CHAOS_SEED_MODULUS) as f64 / CHAOS_SEED_MODULUS as f64;
        Self::build(
            chapter_index,
            total_chapters,
            duration_beats,
            tuning,
            layer_windows,
            chaos_seed,
        )
    }

    /// Context for a single short piece with an explicit prime list.
    pub fn for_fixed_primes(
        primes: &[u64],
        chaos_seed: f64,
        duration_beats: f64,
        tuning: ChapterTuning,
    ) -> Result<Self> {
        if primes.is_empty() {
            return Err(CompositionError::computation("fixed prime list for a soundscape is empty"));
        }
        let layer_windows = TrackId::ALL.map(|track| {
            let mut window = primes.to_vec();
            window.rotate_left(track.index() % primes.len());
            window
        });
        Self::build(0, 1, duration_beats, tuning, layer_windows, chaos_seed)
    }

    fn build(
        chapter_index: usize,
        total_chapters: usize,
        duration_beats: f64,
        tuning: ChapterTuning,
        layer_windows: [Vec<u64>; 4],
        chaos_seed: f64,
    ) -> Result<Self> {
        if !(duration_beats.is_finite() && duration_beats > 0.0) {
            return Err(CompositionError::config(
                "duration_beats",
                format!("{duration_beats} is not a positive length"),
            ));
        }
        if !(0.0..=1.0).contains(&chaos_seed) {
            return Err(CompositionError::config(
                "chaos_seed",
                format!("{chaos_seed} is outside [0, 1]"),
            ));
        }
        Ok(GenerationContext {
            chapter_index,
            total_chapters,
            duration_beats,
            tuning,
            prime_window: layer_windows[TrackId::HarmonicBed.index()].clone(),
            chaos_seed,
            layer_windows,
        })
    }

    /// The prime window reserved for one layer.
    pub fn primes_for(&self, track: TrackId) -> &[u64] {
        &self.layer_windows[track.index()]
    }

    /// Beats per minute at this context's tempo.
    pub fn beats_per_minute(&self) -> f64 {
        self.tuning.tempo_bpm as f64
    }
}

/// Cycles through a prime window by step index.
#[derive(Debug, Clone, Copy)]
pub struct PrimeCycle<'a> {
    window: &'a [u64],
}

impl<'a> PrimeCycle<'a> {
    pub fn new(window: &'a [u64]) -> Result<Self> {
        if window.is_empty() {
            return Err(CompositionError::computation("prime window is empty"));
        }
        Ok(PrimeCycle { window })
    }

    pub fn at(&self, step: usize) -> u64 {
        self.window[step % self.window.len()]
    }
}
