// Scale and harmony resolution.
//
// A theme names its pitch material either as a modal center like
// `D_dorian` or as an explicit `custom_scale`. Either way the composer ends
// up with a `Scale`: an ordered list of MIDI pitches, one per scale degree,
// spanning a single octave. Degrees outside `0..len` wrap around the scale
// and shift by an octave per wrap, so degree 9 of a seven-note scale is
// degree 2 an octave up. The shift is capped at `MAX_WRAP_OCTAVES` in either
// direction so large motif offsets cannot drift out of the playable range.
//
// Used by every layer generator: the harmonic bed builds chords with
// `build_chord`, the melodic layer walks `degree_pitch`, the drone takes the
// root.

use crate::error::{CompositionError, Result};

/// Octave in which named modes place their final (C4 = 60).
const FINAL_OCTAVE_BASE: u8 = 60;

/// Degree wrapping never moves a pitch more than this many octaves from the
/// scale's home octave.
pub const MAX_WRAP_OCTAVES: i64 = 2;

/// The six diatonic modes, each defined by its interval pattern from the final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// D E F G A B C: natural minor with raised 6th
    Dorian,
    /// E F G A B C D: half step from 1 to 2
    Phrygian,
    /// F G A B C D E: raised 4th
    Lydian,
    /// G A B C D E F: major with lowered 7th
    Mixolydian,
    /// A B C D E F G: natural minor
    Aeolian,
    /// C D E F G A B: major
    Ionian,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Ionian,
    ];

    /// Semitone intervals from the final to each scale degree.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => [0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => [0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => [0, 2, 3, 5, 7, 8, 10],
            Mode::Ionian => [0, 2, 4, 5, 7, 9, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Ionian => "ionian",
        }
    }

    pub fn from_name(name: &str) -> Option<Mode> {
        let lower = name.to_ascii_lowercase();
        Mode::ALL.into_iter().find(|m| m.name() == lower)
    }
}

/// A mode plus its final pitch class, parsed from names like `D_dorian`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInstance {
    pub mode: Mode,
    /// Pitch class of the final (0 = C, 2 = D, 4 = E, etc.)
    pub final_pc: u8,
}

impl ModeInstance {
    pub fn new(mode: Mode, final_pc: u8) -> Self {
        ModeInstance {
            mode,
            final_pc: final_pc % 12,
        }
    }

    /// Parse `<final>_<mode>`, where the final is a letter with an optional
    /// `#` or `b`. Case-insensitive on the mode, not on `b`.
    pub fn parse(name: &str) -> Option<Self> {
        let (final_name, mode_name) = name.split_once('_')?;
        let mut chars = final_name.chars();
        let letter_pc: i8 = match chars.next()?.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let accidental: i8 = match chars.as_str() {
            "" => 0,
            "#" => 1,
            "b" => -1,
            _ => return None,
        };
        let mode = Mode::from_name(mode_name)?;
        Some(ModeInstance::new(mode, (letter_pc + accidental).rem_euclid(12) as u8))
    }

    /// Check if a MIDI pitch is in this mode.
    pub fn is_in_mode(&self, pitch: u8) -> bool {
        let pc = (pitch + 12 - self.final_pc) % 12;
        self.mode.intervals().contains(&pc)
    }

    /// The seven degrees with the final in octave 4.
    pub fn scale(&self) -> Scale {
        let root = FINAL_OCTAVE_BASE + self.final_pc;
        Scale::new(self.mode.intervals().iter().map(|&iv| root + iv).collect())
    }
}

/// Ordered pitch set, one entry per scale degree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale {
    pitches: Vec<u8>,
}

impl Scale {
    pub fn new(pitches: Vec<u8>) -> Self {
        Scale { pitches }
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// First degree, or a configuration error for an empty scale.
    pub fn root(&self) -> Result<u8> {
        self.pitches
            .first()
            .copied()
            .ok_or_else(|| CompositionError::config("scale", "scale has no pitches"))
    }

    /// Pitch of an arbitrary (possibly negative or out-of-range) degree.
    ///
    /// Wraps the degree modulo the scale length and transposes by 12
    /// semitones per wrap, capped at `MAX_WRAP_OCTAVES`. The result is an
    /// unclamped semitone value; callers fold it into MIDI range.
    pub fn degree_pitch(&self, degree: i64) -> Result<i32> {
        if self.pitches.is_empty() {
            return Err(CompositionError::config("scale", "scale has no pitches"));
        }
        let len = self.pitches.len() as i64;
        let index = degree.rem_euclid(len) as usize;
        let octaves = degree
            .div_euclid(len)
            .clamp(-MAX_WRAP_OCTAVES, MAX_WRAP_OCTAVES);
        Ok(self.pitches[index] as i32 + 12 * octaves as i32)
    }
}

/// Resolve a theme's modal center (or custom scale) to a concrete scale.
pub fn resolve(modal_center: &str, custom_scale: Option<&[u8]>) -> Result<Scale> {
    if let Some(custom) = custom_scale {
        if custom.is_empty() {
            return Err(CompositionError::config(
                "custom_scale",
                "custom scale must contain at least one pitch",
            ));
        }
        if let Some(&bad) = custom.iter().find(|&&p| p > 127) {
            return Err(CompositionError::config(
                "custom_scale",
                format!("pitch {bad} is outside MIDI range 0-127"),
            ));
        }
        return Ok(Scale::new(custom.to_vec()));
    }
    ModeInstance::parse(modal_center)
        .map(|m| m.scale())
        .ok_or_else(|| {
            CompositionError::config(
                "modal_center",
                format!("unknown mode '{modal_center}' and no custom_scale given"),
            )
        })
}

/// Build a chord by stacking scale-degree `intervals` on `root_index`.
pub fn build_chord(root_index: i64, intervals: &[i32], scale: &Scale) -> Result<Vec<u8>> {
    if scale.is_empty() {
        return Err(CompositionError::config("scale", "cannot build a chord from an empty scale"));
    }
    if intervals.is_empty() {
        return Err(CompositionError::config(
            "harmony_rules.intervals",
            "chord needs at least one interval",
        ));
    }
    intervals
        .iter()
        .map(|&iv| Ok(fold_to_midi(scale.degree_pitch(root_index + iv as i64)?)))
        .collect()
}

/// Move a semitone value into 0..=127 by whole octaves.
pub fn fold_to_midi(pitch: i32) -> u8 {
    let mut p = pitch;
    while p < 0 {
        p += 12;
    }
    while p > 127 {
        p -= 12;
    }
    p as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d_dorian() -> Scale {
        resolve("D_dorian", None).unwrap()
    }

    #[test]
    fn test_named_scales() {
        assert_eq!(d_dorian().pitches(), &[62, 64, 65, 67, 69, 71, 72]);
        assert_eq!(
            resolve("A_aeolian", None).unwrap().pitches(),
            &[69, 71, 72, 74, 76, 77, 79]
        );
        assert_eq!(
            resolve("E_phrygian", None).unwrap().pitches(),
            &[64, 65, 67, 69, 71, 72, 74]
        );
    }

    #[test]
    fn test_parse_accidentals() {
        let bb = ModeInstance::parse("Bb_lydian").unwrap();
        assert_eq!(bb.final_pc, 10);
        assert_eq!(bb.mode, Mode::Lydian);
        let fs = ModeInstance::parse("F#_Mixolydian").unwrap();
        assert_eq!(fs.final_pc, 6);
        assert!(ModeInstance::parse("H_dorian").is_none());
        assert!(ModeInstance::parse("D_locrian").is_none());
        assert!(ModeInstance::parse("dorian").is_none());
    }

    #[test]
    fn test_custom_scale_overrides_name() {
        let scale = resolve("not_a_mode", Some(&[60, 63, 67])).unwrap();
        assert_eq!(scale.pitches(), &[60, 63, 67]);
    }

    #[test]
    fn test_unknown_mode_is_configuration_error() {
        let err = resolve("Q_wobbly", None).unwrap_err();
        assert_eq!(err.field(), Some("modal_center"));
        let err = resolve("D_dorian", Some(&[])).unwrap_err();
        assert_eq!(err.field(), Some("custom_scale"));
    }

    #[test]
    fn test_degree_wrap_goes_up_an_octave() {
        let scale = d_dorian();
        // Degree 9 of 7 is degree 2 (F4 = 65) one octave up.
        assert_eq!(scale.degree_pitch(9).unwrap(), 65 + 12);
        assert_eq!(scale.degree_pitch(-1).unwrap(), 72 - 12);
        assert_eq!(scale.degree_pitch(0).unwrap(), 62);
    }

    #[test]
    fn test_chord_wraps_within_bounded_range() {
        let scale = d_dorian();
        let root = scale.pitches()[0] as i32;
        for offset in -200..200 {
            let chord = build_chord(0, &[offset], &scale).unwrap();
            let p = chord[0] as i32;
            assert!(
                p >= root - 12 * MAX_WRAP_OCTAVES as i32
                    && p < root + 12 * (MAX_WRAP_OCTAVES as i32 + 1),
                "offset {offset} drifted to {p}"
            );
        }
    }

    #[test]
    fn test_quartal_chord() {
        let chord = build_chord(0, &[0, 3, 6], &d_dorian()).unwrap();
        assert_eq!(chord, vec![62, 67, 72]);
        let chord = build_chord(4, &[0, 3, 6], &d_dorian()).unwrap();
        // A, D (wrapped), G (wrapped)
        assert_eq!(chord, vec![69, 74, 79]);
    }

    #[test]
    fn test_empty_scale_rejected() {
        let err = build_chord(0, &[0, 2, 4], &Scale::new(Vec::new())).unwrap_err();
        assert!(matches!(err, CompositionError::Configuration { .. }));
    }

    #[test]
    fn test_is_in_mode() {
        let mode = ModeInstance::parse("D_dorian").unwrap();
        assert!(mode.is_in_mode(62));
        assert!(mode.is_in_mode(71));
        assert!(!mode.is_in_mode(63));
        assert!(!mode.is_in_mode(66));
    }

    #[test]
    fn test_fold_to_midi() {
        assert_eq!(fold_to_midi(-5), 7);
        assert_eq!(fold_to_midi(130), 118);
        assert_eq!(fold_to_midi(64), 64);
    }
}
