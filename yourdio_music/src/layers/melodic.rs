// Melodic texture: the motif, restated every `interval_minutes`.
//
// Each statement reads one prime. Notes fall two beats apart, nudged by
// `(prime % 3) * 0.1` beats so repeated statements do not land on an
// identical grid. Durations cycle through the first `sequence_length`
// Fibonacci terms scaled by `base_unit` (plus one beat). When the prime is
// divisible by `register_shift_modulus` the statement moves an octave, up on
// even statements and down on odd ones.
//
// Notes that would start at or after the end of the context are dropped;
// a statement near the end is cut short rather than spilling over.
//
// Ornaments are short upper-neighbor notes half a beat after a motif note.
// `prime % ornament_density_modulus` sets how many residues (out of the
// modulus) carry an ornament; note `i` is ornamented when `i * prime` falls
// in one of them.

use yourdio_seq::Fibonacci;

use crate::context::{GenerationContext, PrimeCycle};
use crate::error::{CompositionError, Result};
use crate::event::{MusicEvent, TrackId, clamp_velocity, sort_by_onset};
use crate::layers::{LayerGenerator, OCTAVE};
use crate::mode::{Scale, fold_to_midi};
use crate::theme::{MelodicRhythm, Motif, PrimeVelocity, ThemeConfig, ensure};

const NOTE_SPACING: f64 = 2.0;
const JITTER_STEP: f64 = 0.1;
const ORNAMENT_DELAY: f64 = 0.5;
const ORNAMENT_LENGTH: f64 = 0.5;
const ORNAMENT_VELOCITY_DROP: i64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct MelodicTexture<'a> {
    pub motif: &'a Motif,
    pub rhythm: &'a MelodicRhythm,
    pub dynamics: &'a PrimeVelocity,
}

impl<'a> MelodicTexture<'a> {
    pub fn from_theme(theme: &'a ThemeConfig) -> Self {
        MelodicTexture {
            motif: &theme.motif,
            rhythm: &theme.rhythmic_language.melodic_texture,
            dynamics: &theme.dynamics.melodic_texture,
        }
    }

    /// Note lengths in beats, one per Fibonacci term.
    fn durations(&self) -> Vec<f64> {
        Fibonacci::new()
            .take(self.rhythm.sequence_length)
            .map(|term| term as f64 * self.rhythm.base_unit + 1.0)
            .collect()
    }

    fn register_shift(&self, prime: u64, statement: usize) -> i32 {
        if prime % self.motif.register_shift_modulus != 0 {
            0
        } else if statement % 2 == 0 {
            OCTAVE
        } else {
            -OCTAVE
        }
    }
}

/// Whether note `note_index` of a statement driven by `prime` is ornamented.
fn ornament_due(note_index: usize, prime: u64, modulus: u64) -> bool {
    (note_index as u64).wrapping_mul(prime) % modulus < prime % modulus
}

impl LayerGenerator for MelodicTexture<'_> {
    const TRACK: TrackId = TrackId::MelodicTexture;

    fn check(&self) -> Result<()> {
        ensure(
            self.rhythm.sequence_length > 0,
            "rhythmic_language.melodic_texture.sequence_length",
            "must be at least 1",
        )?;
        ensure(
            self.rhythm.base_unit.is_finite() && self.rhythm.base_unit >= 0.0,
            "rhythmic_language.melodic_texture.base_unit",
            "must be a non-negative number of beats",
        )?;
        ensure(
            self.dynamics.base_velocity <= 127,
            "dynamics.melodic_texture.base_velocity",
            "must be within 0-127",
        )?;
        ensure(
            self.dynamics.prime_mod_range > 0,
            "dynamics.melodic_texture.prime_mod_range",
            "must be positive",
        )?;
        ensure(
            !self.motif.core_pattern.is_empty(),
            "motif.core_pattern",
            "must list at least one scale degree",
        )?;
        ensure(
            self.motif.interval_minutes.is_finite() && self.motif.interval_minutes > 0.0,
            "motif.interval_minutes",
            "must be a positive number of minutes",
        )?;
        ensure(
            self.motif.register_shift_modulus > 0,
            "motif.register_shift_modulus",
            "must be positive",
        )?;
        ensure(
            self.motif.ornament_density_modulus > 0,
            "motif.ornament_density_modulus",
            "must be positive",
        )
    }

    fn generate(
        &self,
        scale: &Scale,
        ctx: &GenerationContext,
        instrument: u8,
    ) -> Result<Vec<MusicEvent>> {
        self.check()?;
        scale.root()?;
        let primes = PrimeCycle::new(ctx.primes_for(Self::TRACK))?;

        let spacing = self.motif.interval_minutes * ctx.beats_per_minute();
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(CompositionError::computation(format!(
                "motif statements would be {spacing} beats apart"
            )));
        }
        let durations = self.durations();
        let ornament_mod = self.motif.ornament_density_modulus;

        let mut events = Vec::new();
        let mut start = 0.0;
        let mut statement = 0usize;

        while start < ctx.duration_beats {
            let prime = primes.at(statement);
            let shift = self.register_shift(prime, statement) + ctx.tuning.register_offset;
            let jitter = (prime % 3) as f64 * JITTER_STEP;
            let velocity = clamp_velocity(
                self.dynamics.base_velocity as i64
                    + (prime % self.dynamics.prime_mod_range) as i64
                    + ctx.tuning.velocity_offset as i64,
            );
            let ornament_velocity = clamp_velocity(velocity as i64 - ORNAMENT_VELOCITY_DROP);

            for (i, &degree) in self.motif.core_pattern.iter().enumerate() {
                let onset = start + i as f64 * NOTE_SPACING + jitter;
                if onset >= ctx.duration_beats {
                    break;
                }
                let pitch = fold_to_midi(scale.degree_pitch(degree as i64)? + shift);
                events.push(MusicEvent::note(
                    Self::TRACK,
                    onset,
                    pitch,
                    velocity,
                    durations[i % durations.len()],
                    instrument,
                ));

                let ornament_onset = onset + ORNAMENT_DELAY;
                if ornament_due(i, prime, ornament_mod) && ornament_onset < ctx.duration_beats {
                    let neighbor = fold_to_midi(scale.degree_pitch(degree as i64 + 1)? + shift);
                    events.push(MusicEvent::note(
                        Self::TRACK,
                        ornament_onset,
                        neighbor,
                        ornament_velocity,
                        ORNAMENT_LENGTH,
                        instrument,
                    ));
                }
            }

            start += spacing;
            statement += 1;
        }

        sort_by_onset(&mut events);
        Ok(events)
    }
}
