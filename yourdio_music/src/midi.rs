// MIDI output from assembled compositions.
//
// Converts a Composition into a Standard MIDI File (SMF Format 1). Track 0
// carries tempo and time signature; each layer then gets its own named track
// on its own channel (bed 0, melody 1, drone 2, events 3), starting with a
// program change to the layer's GM patch.
//
// Events are laid out at absolute ticks and sorted before being converted to
// deltas. At equal ticks note-offs go first, then controller and pitch-bend
// changes, then note-ons, so a repeated pitch is released before it is
// struck again.
//
// Uses the `midly` crate for MIDI writing.

use std::path::{Path, PathBuf};

use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, Track, TrackEvent,
    TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};

use crate::assembler::Composition;
use crate::event::{MusicEvent, TrackId};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Largest value of the 24-bit tempo field.
const MAX_TEMPO_MICROSECONDS: u32 = 0xFF_FFFF;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("failed to encode MIDI: {0}")]
    Encode(#[from] std::io::Error),

    #[error("tempo of {0} BPM cannot be written as a MIDI tempo event")]
    Tempo(u16),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Encode a composition as SMF bytes.
pub fn encode_smf(composition: &Composition) -> Result<Vec<u8>, MidiError> {
    let smf = composition_to_smf(composition)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Encode a composition and write it to `path`.
pub fn write_midi(composition: &Composition, path: &Path) -> Result<(), MidiError> {
    let bytes = encode_smf(composition)?;
    std::fs::write(path, &bytes).map_err(|source| MidiError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Microseconds per quarter note, if it fits the 24-bit tempo field.
pub fn tempo_microseconds(bpm: u16) -> Result<u32, MidiError> {
    match bpm {
        0 => Err(MidiError::Tempo(bpm)),
        _ => {
            let micros = 60_000_000 / bpm as u32;
            if micros > MAX_TEMPO_MICROSECONDS {
                Err(MidiError::Tempo(bpm))
            } else {
                Ok(micros)
            }
        }
    }
}

/// Absolute tick of a beat position.
pub fn beat_to_tick(beat: f64) -> u32 {
    (beat * TICKS_PER_QUARTER as f64).round().max(0.0) as u32
}

// Sort rank for events sharing a tick.
const RANK_NOTE_OFF: u8 = 0;
const RANK_CONTROL: u8 = 1;
const RANK_NOTE_ON: u8 = 2;

fn composition_to_smf(composition: &Composition) -> Result<Smf<'static>, MidiError> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let tempo = tempo_microseconds(composition.tempo_bpm())?;
    let tempo_track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ];
    smf.tracks.push(tempo_track);

    for track in TrackId::ALL {
        let program = composition.instruments.get(&track).copied().unwrap_or(0);
        smf.tracks
            .push(layer_track(track, program, composition.track(track)));
    }

    Ok(smf)
}

fn layer_track(track: TrackId, program: u8, events: &[MusicEvent]) -> Track<'static> {
    let channel = u4::new(track.index() as u8);
    let midi = |message: MidiMessage| TrackEventKind::Midi { channel, message };

    let mut timed: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::new();
    for event in events {
        let on = beat_to_tick(event.onset_beat);
        let off = beat_to_tick(event.end_beat()).max(on + 1);
        let key = u7::new(event.pitch.min(127));
        timed.push((
            on,
            RANK_NOTE_ON,
            midi(MidiMessage::NoteOn {
                key,
                vel: u7::new(event.velocity.min(127)),
            }),
        ));
        timed.push((
            off,
            RANK_NOTE_OFF,
            midi(MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            }),
        ));
        for cc in &event.controller_changes {
            timed.push((
                beat_to_tick(cc.beat),
                RANK_CONTROL,
                midi(MidiMessage::Controller {
                    controller: u7::new(cc.controller.min(127)),
                    value: u7::new(cc.value.min(127)),
                }),
            ));
        }
        for bend in &event.pitch_bends {
            timed.push((
                beat_to_tick(bend.beat),
                RANK_CONTROL,
                midi(MidiMessage::PitchBend {
                    bend: PitchBend::from_int(bend.value.clamp(-8192, 8191)),
                }),
            ));
        }
    }
    timed.sort_by_key(|(tick, rank, _)| (*tick, *rank));

    let mut out: Track<'static> = Vec::with_capacity(timed.len() + 3);
    out.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(track.name().as_bytes())),
    });
    out.push(TrackEvent {
        delta: u28::new(0),
        kind: midi(MidiMessage::ProgramChange {
            program: u7::new(program.min(127)),
        }),
    });

    let mut last_tick = 0;
    for (tick, _, kind) in timed {
        out.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }

    out.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{assemble, assemble_event};
    use crate::soundscape::EventType;
    use crate::theme::ThemeConfig;

    fn midi_kinds<'a>(track: &'a [TrackEvent<'a>]) -> Vec<&'a TrackEventKind<'a>> {
        track.iter().map(|e| &e.kind).collect()
    }

    #[test]
    fn one_track_per_layer_plus_tempo() {
        let c = assemble_event(&ThemeConfig::default(), EventType::Victory).unwrap();
        let bytes = encode_smf(&c).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 5);
        assert_eq!(
            smf.header.timing,
            Timing::Metrical(u15::new(TICKS_PER_QUARTER))
        );

        let tempo = u24::new(60_000_000 / c.tempo_bpm() as u32);
        assert!(midi_kinds(&smf.tracks[0])
            .iter()
            .any(|k| **k == TrackEventKind::Meta(MetaMessage::Tempo(tempo))));
    }

    #[test]
    fn note_counts_and_programs_survive() {
        let c = assemble(&ThemeConfig::default(), 2, 12, 600.0).unwrap();
        let bytes = encode_smf(&c).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        for track in TrackId::ALL {
            let kinds = midi_kinds(&smf.tracks[track.index() + 1]);
            let note_ons = kinds
                .iter()
                .filter(|k| {
                    matches!(
                        k,
                        TrackEventKind::Midi {
                            message: MidiMessage::NoteOn { .. },
                            ..
                        }
                    )
                })
                .count();
            assert_eq!(note_ons, c.track(track).len(), "{track:?}");

            let program = c.instruments[&track];
            assert!(kinds.iter().any(|k| **k
                == TrackEventKind::Midi {
                    channel: u4::new(track.index() as u8),
                    message: MidiMessage::ProgramChange {
                        program: u7::new(program)
                    },
                }));
        }
    }

    #[test]
    fn drone_sweep_is_encoded() {
        let c = assemble(&ThemeConfig::default(), 0, 12, 400.0).unwrap();
        let expected: usize = c
            .track(TrackId::Drone)
            .iter()
            .map(|e| e.controller_changes.len())
            .sum();
        assert!(expected > 0);

        let bytes = encode_smf(&c).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        let ccs = midi_kinds(&smf.tracks[TrackId::Drone.index() + 1])
            .iter()
            .filter(|k| {
                matches!(
                    k,
                    TrackEventKind::Midi {
                        message: MidiMessage::Controller { controller, .. },
                        ..
                    } if controller.as_int() == 74
                )
            })
            .count();
        assert_eq!(ccs, expected);
    }

    #[test]
    fn beat_ticks() {
        assert_eq!(beat_to_tick(0.0), 0);
        assert_eq!(beat_to_tick(1.0), 480);
        assert_eq!(beat_to_tick(0.125), 60);
        assert_eq!(beat_to_tick(-1.0), 0);
    }

    #[test]
    fn tempo_field_limits() {
        assert_eq!(tempo_microseconds(60).unwrap(), 1_000_000);
        assert_eq!(tempo_microseconds(4).unwrap(), 15_000_000);
        assert!(matches!(tempo_microseconds(3), Err(MidiError::Tempo(3))));
        assert!(matches!(tempo_microseconds(0), Err(MidiError::Tempo(0))));
    }

    #[test]
    fn unencodable_tempo_is_an_error() {
        let mut c = assemble_event(&ThemeConfig::default(), EventType::Death).unwrap();
        c.tuning.tempo_bpm = 2;
        assert!(matches!(encode_smf(&c), Err(MidiError::Tempo(2))));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("death.mid");
        let c = assemble_event(&ThemeConfig::default(), EventType::Death).unwrap();
        write_midi(&c, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
