// Shared fixtures for the Yourdio integration tests.
//
// Provides the end-to-end theme (D Dorian over a slow-burn arc), a helper
// that assembles every chapter of a piece, and a few MIDI inspection helpers
// built on `midly`, so tests can check what actually lands in the file
// rather than only the in-memory composition.
//
// This crate has no runtime role; it exists so the pipeline tests in
// `tests/` can share setup code.

use midly::{MidiMessage, Smf, TrackEventKind};
use yourdio_music::{Composition, CompositionError, ThemeConfig, assemble_minutes};

/// Theme used by the long-form pipeline tests.
pub const END_TO_END_THEME: &str = r#"
name: Dorian Dusk
description: Quartal pads rising slowly toward a bright close
modal_center: D_dorian
harmony_rules:
  type: quartal
  intervals: [0, 3, 6]
tempo:
  base: 72
  variation_range: [64, 80]
structural_arc:
  type: slow_burn
  min_intensity: 0.4
  max_intensity: 0.95
motif:
  core_pattern: [0, 2, 5, 7]
  interval_minutes: 17
"#;

/// The end-to-end theme, parsed and validated.
pub fn end_to_end_theme() -> ThemeConfig {
    ThemeConfig::from_yaml_str(END_TO_END_THEME).expect("end-to-end theme should be valid")
}

/// Assemble every chapter of a piece, in chapter order.
pub fn assemble_piece(
    theme: &ThemeConfig,
    chapters: usize,
    chapter_minutes: f64,
) -> Result<Vec<Composition>, CompositionError> {
    (0..chapters)
        .map(|chapter| assemble_minutes(theme, chapter, chapters, chapter_minutes))
        .collect()
}

/// JSON snapshot of a piece, for byte-level determinism checks.
pub fn piece_json(piece: &[Composition]) -> String {
    serde_json::to_string(piece).expect("compositions serialize")
}

/// Number of sounding note-ons on each track of an SMF, tempo track included.
pub fn note_on_counts(bytes: &[u8]) -> Vec<usize> {
    let smf = Smf::parse(bytes).expect("valid SMF");
    smf.tracks
        .iter()
        .map(|track| {
            track
                .iter()
                .filter(|e| {
                    matches!(
                        e.kind,
                        TrackEventKind::Midi {
                            message: MidiMessage::NoteOn { vel, .. },
                            ..
                        } if vel.as_int() > 0
                    )
                })
                .count()
        })
        .collect()
}

/// Every note-on key on one SMF track.
pub fn note_on_keys(bytes: &[u8], track: usize) -> Vec<u8> {
    let smf = Smf::parse(bytes).expect("valid SMF");
    smf.tracks[track]
        .iter()
        .filter_map(|e| match e.kind {
            TrackEventKind::Midi {
                message: MidiMessage::NoteOn { key, vel },
                ..
            } if vel.as_int() > 0 => Some(key.as_int()),
            _ => None,
        })
        .collect()
}
