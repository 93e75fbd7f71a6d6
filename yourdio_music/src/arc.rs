// Intensity arc: how dramatic each chapter of a long-form piece is.
//
// `intensity` places a chapter on the theme's structural arc and returns a
// scalar in [min_intensity, max_intensity]. `ChapterTuning::derive` turns
// that scalar into the concrete knobs the layer generators read (tempo,
// voice budget, velocity and register offsets), each gated by its
// `parameter_evolution` flag.
//
// All arc shapes are piecewise linear in the chapter index. Interpolation is
// written as `min * (1 - t) + max * t` so the endpoints come out exactly.

use serde::{Deserialize, Serialize};

use crate::error::{CompositionError, Result};
use crate::theme::{ArcKind, StructuralArc, ThemeConfig};

/// Intensity of `chapter_index` out of `total_chapters` under `arc`.
///
/// A single-chapter piece sits at position 0 of its arc.
pub fn intensity(chapter_index: usize, total_chapters: usize, arc: &StructuralArc) -> Result<f64> {
    if total_chapters == 0 {
        return Err(CompositionError::config(
            "total_chapters",
            "a piece needs at least one chapter",
        ));
    }
    if chapter_index >= total_chapters {
        return Err(CompositionError::config(
            "chapter_index",
            format!("chapter {chapter_index} is past the last of {total_chapters} chapters"),
        ));
    }

    let (min, max) = (arc.min_intensity, arc.max_intensity);
    if min.is_nan() || max.is_nan() || min > max {
        return Err(CompositionError::config(
            "structural_arc",
            format!("min_intensity ({min}) exceeds max_intensity ({max})"),
        ));
    }
    let last = total_chapters - 1;
    let t = match arc.kind {
        ArcKind::Flat => 0.5,
        ArcKind::SlowBurn => ratio(chapter_index, last),
        ArcKind::Descending => 1.0 - ratio(chapter_index, last),
        ArcKind::Parabolic => {
            let climax = arc.climax_chapter.unwrap_or(total_chapters / 2).min(last);
            if chapter_index <= climax {
                if climax == 0 {
                    1.0
                } else {
                    ratio(chapter_index, climax)
                }
            } else {
                ratio(last - chapter_index, last - climax)
            }
        }
    };

    Ok(lerp(min, max, t).clamp(min, max))
}

/// `num / den`, with an empty span counting as the start.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn lerp(low: f64, high: f64, t: f64) -> f64 {
    low * (1.0 - t) + high * t
}

/// Semitones per register step.
const OCTAVE: i32 = 12;

/// Concrete per-chapter parameters derived from intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChapterTuning {
    pub intensity: f64,
    pub tempo_bpm: u16,
    /// Polyphony limit applied to every track.
    pub max_voices: usize,
    /// Added to each layer's base velocity.
    pub velocity_offset: i32,
    /// Semitone shift for the bed and melodic layers (whole octaves).
    pub register_offset: i32,
}

impl ChapterTuning {
    pub fn derive(theme: &ThemeConfig, intensity: f64) -> Self {
        let evo = &theme.parameter_evolution;
        // Downstream mappings read intensity as a fraction.
        let i = intensity.clamp(0.0, 1.0);

        let tempo_bpm = if evo.tempo {
            let [low, high] = theme.tempo.variation_range;
            lerp(low as f64, high as f64, i).round() as u16
        } else {
            theme.tempo.base
        };

        let poly = &theme.polyphony;
        let max_voices = if evo.polyphony {
            lerp(poly.min_voices as f64, poly.max_voices as f64, i).round() as usize
        } else {
            poly.default_voices
        };

        let velocity_offset = if evo.velocity {
            ((i - 0.5) * 2.0 * evo.velocity_swing).round() as i32
        } else {
            0
        };

        let register_offset = if evo.register {
            OCTAVE * ((i - 0.5) * 2.0).round() as i32
        } else {
            0
        };

        ChapterTuning {
            intensity,
            tempo_bpm,
            max_voices,
            velocity_offset,
            register_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(kind: ArcKind, min: f64, max: f64, climax: Option<usize>) -> StructuralArc {
        StructuralArc {
            kind,
            min_intensity: min,
            max_intensity: max,
            climax_chapter: climax,
        }
    }

    #[test]
    fn slow_burn_endpoints() {
        let a = arc(ArcKind::SlowBurn, 0.4, 0.95, None);
        assert_eq!(intensity(0, 12, &a).unwrap(), 0.4);
        assert_eq!(intensity(11, 12, &a).unwrap(), 0.95);
        let mut prev = 0.0;
        for c in 0..12 {
            let v = intensity(c, 12, &a).unwrap();
            assert!(v > prev);
            prev = v;
        }
    }

    #[test]
    fn descending_endpoints() {
        let a = arc(ArcKind::Descending, 0.1, 0.7, None);
        assert_eq!(intensity(0, 8, &a).unwrap(), 0.7);
        assert_eq!(intensity(7, 8, &a).unwrap(), 0.1);
    }

    #[test]
    fn flat_is_midpoint() {
        let a = arc(ArcKind::Flat, 0.2, 0.6, None);
        for c in 0..5 {
            assert!((intensity(c, 5, &a).unwrap() - 0.4).abs() < 1e-12);
        }
    }

    #[test]
    fn parabolic_climax() {
        let a = arc(ArcKind::Parabolic, 0.2, 0.8, Some(6));
        let values: Vec<f64> = (0..12).map(|c| intensity(c, 12, &a).unwrap()).collect();
        assert_eq!(values[6], 0.8);
        assert_eq!(values[0], 0.2);
        assert_eq!(values[11], 0.2);
        for c in 1..=6 {
            assert!(values[c] > values[c - 1], "not rising at {c}");
        }
        for c in 7..12 {
            assert!(values[c] < values[c - 1], "not falling at {c}");
        }
    }

    #[test]
    fn parabolic_degenerate_climaxes() {
        let first = arc(ArcKind::Parabolic, 0.0, 1.0, Some(0));
        assert_eq!(intensity(0, 5, &first).unwrap(), 1.0);
        assert_eq!(intensity(4, 5, &first).unwrap(), 0.0);

        let last = arc(ArcKind::Parabolic, 0.0, 1.0, Some(4));
        assert_eq!(intensity(0, 5, &last).unwrap(), 0.0);
        assert_eq!(intensity(4, 5, &last).unwrap(), 1.0);

        // A climax past the end behaves like the last chapter.
        let beyond = arc(ArcKind::Parabolic, 0.0, 1.0, Some(40));
        assert_eq!(intensity(4, 5, &beyond).unwrap(), 1.0);
    }

    #[test]
    fn intensity_within_bounds_for_all_shapes() {
        for kind in [
            ArcKind::Parabolic,
            ArcKind::SlowBurn,
            ArcKind::Descending,
            ArcKind::Flat,
        ] {
            for total in 1..20 {
                for climax in [None, Some(0), Some(3), Some(19)] {
                    let a = arc(kind, 0.13, 0.87, climax);
                    for c in 0..total {
                        let v = intensity(c, total, &a).unwrap();
                        assert!((0.13..=0.87).contains(&v), "{kind:?} {c}/{total}: {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn single_chapter() {
        let a = arc(ArcKind::SlowBurn, 0.3, 0.9, None);
        assert_eq!(intensity(0, 1, &a).unwrap(), 0.3);
    }

    #[test]
    fn bad_indices_rejected() {
        let a = StructuralArc::default();
        let err = intensity(0, 0, &a).unwrap_err();
        assert_eq!(err.field(), Some("total_chapters"));
        let err = intensity(12, 12, &a).unwrap_err();
        assert_eq!(err.field(), Some("chapter_index"));
    }

    #[test]
    fn tuning_follows_intensity() {
        let theme = ThemeConfig::default();
        let low = ChapterTuning::derive(&theme, 0.0);
        let high = ChapterTuning::derive(&theme, 1.0);
        assert_eq!((low.tempo_bpm, high.tempo_bpm), (52, 68));
        assert_eq!((low.max_voices, high.max_voices), (18, 32));
        assert_eq!((low.velocity_offset, high.velocity_offset), (-10, 10));
        assert_eq!((low.register_offset, high.register_offset), (-12, 12));

        let mid = ChapterTuning::derive(&theme, 0.5);
        assert_eq!(mid.tempo_bpm, 60);
        assert_eq!(mid.velocity_offset, 0);
        assert_eq!(mid.register_offset, 0);
    }

    #[test]
    fn disabled_evolution_keeps_base_values() {
        let mut theme = ThemeConfig::default();
        theme.parameter_evolution.tempo = false;
        theme.parameter_evolution.polyphony = false;
        theme.parameter_evolution.velocity = false;
        theme.parameter_evolution.register = false;
        for i in [0.0, 0.37, 1.0] {
            let t = ChapterTuning::derive(&theme, i);
            assert_eq!(t.tempo_bpm, 58);
            assert_eq!(t.max_voices, 32);
            assert_eq!(t.velocity_offset, 0);
            assert_eq!(t.register_offset, 0);
        }
    }
}
