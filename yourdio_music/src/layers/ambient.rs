// Ambient events: rare dramatic figures gated by the logistic map.
//
// The chapter is divided into `event_count` evenly spaced checkpoints. At
// each checkpoint the map is iterated once; an iterate above `threshold`
// fires an event whose intensity is how far past the threshold it landed,
// rescaled to [0, 1]. The intensity picks the figure (quiet shimmer, swell,
// thunder roll) and scales its velocities. A chapter where the map never
// crosses the threshold has an empty ambient track. Figure notes that would
// start after the end of the context are dropped.
//
// Figures use fixed registers rather than the theme's scale; they are color,
// not harmony.

use yourdio_seq::LogisticMap;

use crate::context::GenerationContext;
use crate::error::Result;
use crate::event::{MusicEvent, PitchBendChange, TrackId, clamp_velocity, sort_by_onset};
use crate::layers::LayerGenerator;
use crate::mode::Scale;
use crate::theme::{AmbientRhythm, Chaos, EventDynamics, ThemeConfig, ensure};

/// Bend applied at the start of a thunder roll, released one beat later.
const THUNDER_BEND: i16 = -4096;

/// A checkpoint where the logistic map crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub checkpoint: usize,
    /// Iterate value that fired.
    pub value: f64,
    /// `(value - threshold) / (1 - threshold)`.
    pub intensity: f64,
}

/// Iterate `map` once per checkpoint and collect the ones above `threshold`.
pub fn trigger_points(map: &mut LogisticMap, threshold: f64, checkpoints: usize) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    for checkpoint in 0..checkpoints {
        let value = map.step();
        if value > threshold {
            triggers.push(Trigger {
                checkpoint,
                value,
                intensity: ((value - threshold) / (1.0 - threshold)).clamp(0.0, 1.0),
            });
        }
    }
    triggers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    /// Four rising high notes.
    Shimmer,
    /// Twelve overlapping notes, crescendo.
    Swell,
    /// Low repeated notes with a pitch dip.
    ThunderRoll,
}

impl Figure {
    pub fn for_intensity(intensity: f64) -> Figure {
        if intensity > 0.9 {
            Figure::ThunderRoll
        } else if intensity > 0.7 {
            Figure::Swell
        } else {
            Figure::Shimmer
        }
    }

    /// Notes of this figure starting at `beat`.
    fn render(
        self,
        beat: f64,
        intensity: f64,
        dynamics: &EventDynamics,
        velocity_offset: i32,
        instrument: u8,
    ) -> Vec<MusicEvent> {
        let base = dynamics.base_velocity as f64;
        let scaling = dynamics.intensity_scaling;
        let velocity = |v: f64| clamp_velocity(v.round() as i64 + velocity_offset as i64);
        let note = |onset: f64, pitch: u8, vel: u8, duration: f64| {
            MusicEvent::note(
                TrackId::AmbientEvents,
                onset,
                pitch,
                vel,
                duration,
                instrument,
            )
        };

        match self {
            Figure::ThunderRoll => {
                let vel = velocity(base + scaling * intensity);
                let mut notes: Vec<MusicEvent> = (0..8)
                    .map(|i| note(beat + i as f64 * 0.125, 36, vel, 0.25))
                    .collect();
                notes[0].pitch_bends = vec![
                    PitchBendChange {
                        beat,
                        value: THUNDER_BEND,
                    },
                    PitchBendChange {
                        beat: beat + 1.0,
                        value: 0,
                    },
                ];
                notes
            }
            Figure::Swell => (0..12u8)
                .map(|i| {
                    let rise = i as f64 / 12.0 * intensity * 2.0 * scaling;
                    note(
                        beat + i as f64 * 0.5,
                        84 + i % 5,
                        velocity(base / 2.0 + rise),
                        2.0,
                    )
                })
                .collect(),
            Figure::Shimmer => {
                let vel = velocity(base - 25.0 + intensity * scaling * 2.0 / 3.0);
                (0..4u8)
                    .map(|i| note(beat + i as f64 * 0.25, 72 + 2 * i, vel, 1.5))
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AmbientEvents<'a> {
    pub chaos: &'a Chaos,
    pub rhythm: &'a AmbientRhythm,
    pub dynamics: &'a EventDynamics,
}

impl<'a> AmbientEvents<'a> {
    pub fn from_theme(theme: &'a ThemeConfig) -> Self {
        AmbientEvents {
            chaos: &theme.chaos,
            rhythm: &theme.rhythmic_language.ambient_events,
            dynamics: &theme.dynamics.ambient_events,
        }
    }

    /// Where this layer fires for a given chaos seed.
    pub fn triggers(&self, chaos_seed: f64) -> Vec<Trigger> {
        let mut map = LogisticMap::new(self.chaos.logistic_r, chaos_seed);
        trigger_points(&mut map, self.rhythm.threshold, self.rhythm.event_count)
    }
}

impl LayerGenerator for AmbientEvents<'_> {
    const TRACK: TrackId = TrackId::AmbientEvents;

    fn check(&self) -> Result<()> {
        ensure(
            self.rhythm.threshold > 0.0 && self.rhythm.threshold < 1.0,
            "rhythmic_language.ambient_events.threshold",
            format!("{} is outside (0, 1)", self.rhythm.threshold),
        )?;
        ensure(
            self.rhythm.event_count > 0,
            "rhythmic_language.ambient_events.event_count",
            "must be at least 1",
        )?;
        ensure(
            self.dynamics.base_velocity <= 127,
            "dynamics.ambient_events.base_velocity",
            "must be within 0-127",
        )?;
        ensure(
            self.dynamics.intensity_scaling.is_finite() && self.dynamics.intensity_scaling >= 0.0,
            "dynamics.ambient_events.intensity_scaling",
            "must be a non-negative number",
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

        let spacing = ctx.duration_beats / self.rhythm.event_count as f64;
        let mut events: Vec<MusicEvent> = self
            .triggers(ctx.chaos_seed)
            .into_iter()
            .flat_map(|t| {
                Figure::for_intensity(t.intensity).render(
                    t.checkpoint as f64 * spacing,
                    t.intensity,
                    self.dynamics,
                    ctx.tuning.velocity_offset,
                    instrument,
                )
            })
            .filter(|note| note.onset_beat < ctx.duration_beats)
            .collect();

        sort_by_onset(&mut events);
        Ok(events)
    }
}
