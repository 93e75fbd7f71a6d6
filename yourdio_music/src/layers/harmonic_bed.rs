// Harmonic bed: slow-moving chords.
//
// Each step reads the next prime from the layer's window. The prime sets the
// chord length (`base_duration + prime % prime_mod_factor`), the velocity
// (`base_velocity + prime % prime_mod_range`), whether the harmony rule's
// variation voicing replaces the regular one (`prime % variation_chance_mod
// == 0`), and whether the chord drops an octave (even primes). The chord
// root walks the scale two degrees per step.

use crate::context::{GenerationContext, PrimeCycle};
use crate::error::{CompositionError, Result};
use crate::event::{MusicEvent, TrackId, clamp_velocity};
use crate::layers::{LayerGenerator, OCTAVE};
use crate::mode::{Scale, build_chord, fold_to_midi};
use crate::theme::{BedRhythm, HarmonyRules, PrimeVelocity, ThemeConfig, ensure};

/// Fraction of the chord slot a chord actually sounds, leaving a small gap
/// before the next one.
const SUSTAIN_RATIO: f64 = 0.95;

/// Scale degrees the chord root advances per step.
const ROOT_STRIDE: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct HarmonicBed<'a> {
    pub harmony: &'a HarmonyRules,
    pub rhythm: &'a BedRhythm,
    pub dynamics: &'a PrimeVelocity,
}

impl<'a> HarmonicBed<'a> {
    pub fn from_theme(theme: &'a ThemeConfig) -> Self {
        HarmonicBed {
            harmony: &theme.harmony_rules,
            rhythm: &theme.rhythmic_language.harmonic_bed,
            dynamics: &theme.dynamics.harmonic_bed,
        }
    }

    /// Intervals for a chord driven by `prime`.
    fn intervals_for(&self, prime: u64) -> &'a [i32] {
        match self.harmony.variation {
            Some(_) if prime % self.harmony.variation_chance_mod == 0 => {
                &self.harmony.variation_intervals
            }
            _ => &self.harmony.intervals,
        }
    }
}

impl LayerGenerator for HarmonicBed<'_> {
    const TRACK: TrackId = TrackId::HarmonicBed;

    fn check(&self) -> Result<()> {
        ensure(
            !self.harmony.intervals.is_empty(),
            "harmony_rules.intervals",
            "must list at least one interval",
        )?;
        if self.harmony.variation.is_some() {
            ensure(
                !self.harmony.variation_intervals.is_empty(),
                "harmony_rules.variation_intervals",
                "must list at least one interval when a variation is set",
            )?;
            ensure(
                self.harmony.variation_chance_mod > 0,
                "harmony_rules.variation_chance_mod",
                "must be positive",
            )?;
        }
        ensure(
            self.rhythm.base_duration.is_finite() && self.rhythm.base_duration >= 0.0,
            "rhythmic_language.harmonic_bed.base_duration",
            "must be a non-negative number of beats",
        )?;
        ensure(
            self.rhythm.prime_mod_factor > 0,
            "rhythmic_language.harmonic_bed.prime_mod_factor",
            "must be positive",
        )?;
        ensure(
            self.dynamics.base_velocity <= 127,
            "dynamics.harmonic_bed.base_velocity",
            "must be within 0-127",
        )?;
        ensure(
            self.dynamics.prime_mod_range > 0,
            "dynamics.harmonic_bed.prime_mod_range",
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

        let mut events = Vec::new();
        let mut onset = 0.0;
        let mut step = 0usize;

        while onset < ctx.duration_beats {
            let prime = primes.at(step);
            let chord_length =
                self.rhythm.base_duration + (prime % self.rhythm.prime_mod_factor) as f64;
            if chord_length <= 0.0 {
                return Err(CompositionError::computation(format!(
                    "harmonic bed chord {step} has non-positive length {chord_length}"
                )));
            }

            let velocity = clamp_velocity(
                self.dynamics.base_velocity as i64
                    + (prime % self.dynamics.prime_mod_range) as i64
                    + ctx.tuning.velocity_offset as i64,
            );
            let octave_drop = if prime % 2 == 0 { -OCTAVE } else { 0 };
            let shift = octave_drop + ctx.tuning.register_offset;
            let root = ((step * ROOT_STRIDE) % scale.len()) as i64;

            for pitch in build_chord(root, self.intervals_for(prime), scale)? {
                events.push(MusicEvent::note(
                    Self::TRACK,
                    onset,
                    fold_to_midi(pitch as i32 + shift),
                    velocity,
                    chord_length * SUSTAIN_RATIO,
                    instrument,
                ));
            }

            onset += chord_length;
            step += 1;
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::tuning;
    use crate::mode::{ModeInstance, resolve};

    fn ctx(primes: &[u64], beats: f64) -> GenerationContext {
        GenerationContext::for_fixed_primes(primes, 0.5, beats, tuning()).unwrap()
    }

    #[test]
    fn chord_timing_follows_primes() {
        let theme = ThemeConfig::default();
        let scale = resolve("D_dorian", None).unwrap();
        let events = HarmonicBed::from_theme(&theme)
            .generate(&scale, &ctx(&[3, 5], 100.0), 89)
            .unwrap();

        // Chords of 32 + 3 % 8 = 35 and 32 + 5 % 8 = 37 beats, three notes each.
        let onsets: Vec<f64> = events.iter().map(|e| e.onset_beat).collect();
        assert_eq!(
            onsets,
            vec![0.0, 0.0, 0.0, 35.0, 35.0, 35.0, 72.0, 72.0, 72.0]
        );
        assert_eq!(events[0].duration_beats, 35.0 * SUSTAIN_RATIO);
        // 45 + 3 % 20
        assert_eq!(events[0].velocity, 48);
        assert!(
            events
                .iter()
                .all(|e| e.instrument == 89 && e.track == TrackId::HarmonicBed)
        );
    }

    #[test]
    fn pitches_stay_in_mode() {
        let theme = ThemeConfig::default();
        let mode = ModeInstance::parse("D_dorian").unwrap();
        let events = HarmonicBed::from_theme(&theme)
            .generate(&mode.scale(), &ctx(&[2, 3, 5, 7, 11, 13], 2000.0), 89)
            .unwrap();
        assert!(!events.is_empty());
        for e in &events {
            assert!(mode.is_in_mode(e.pitch), "pitch {} out of mode", e.pitch);
        }
    }

    #[test]
    fn even_prime_drops_an_octave() {
        let theme = ThemeConfig::default();
        let scale = resolve("D_dorian", None).unwrap();
        let bed = HarmonicBed::from_theme(&theme);
        let odd = bed.generate(&scale, &ctx(&[3], 10.0), 89).unwrap();
        let even = bed.generate(&scale, &ctx(&[2], 10.0), 89).unwrap();
        assert_eq!(odd[0].pitch, 62);
        assert_eq!(even[0].pitch, 50);
    }

    #[test]
    fn variation_intervals_on_trigger() {
        let mut theme = ThemeConfig::default();
        theme.harmony_rules.variation = Some("triadic".to_string());
        theme.harmony_rules.variation_intervals = vec![0, 2];
        theme.harmony_rules.variation_chance_mod = 3;
        let scale = resolve("D_dorian", None).unwrap();
        let events = HarmonicBed::from_theme(&theme)
            .generate(&scale, &ctx(&[3, 5], 60.0), 89)
            .unwrap();
        // Prime 3 triggers the two-note variation; prime 5 uses the regular triad.
        assert_eq!(events.iter().filter(|e| e.onset_beat == 0.0).count(), 2);
        assert_eq!(events.iter().filter(|e| e.onset_beat == 35.0).count(), 3);
    }

    #[test]
    fn zero_length_chord_is_computation_error() {
        let mut theme = ThemeConfig::default();
        theme.rhythmic_language.harmonic_bed.base_duration = 0.0;
        theme.rhythmic_language.harmonic_bed.prime_mod_factor = 1;
        let scale = resolve("D_dorian", None).unwrap();
        let err = HarmonicBed::from_theme(&theme)
            .generate(&scale, &ctx(&[3], 60.0), 89)
            .unwrap_err();
        assert!(matches!(err, CompositionError::Computation(_)));
    }

    #[test]
    fn empty_scale_is_configuration_error() {
        let theme = ThemeConfig::default();
        let err = HarmonicBed::from_theme(&theme)
            .generate(&Scale::new(Vec::new()), &ctx(&[3], 60.0), 89)
            .unwrap_err();
        assert_eq!(err.field(), Some("scale"));
    }
}
