// Output events: what the composer hands to the MIDI encoder.
//
// Each layer renders to its own track. A `MusicEvent` is one note with an
// absolute onset in beats, plus any controller or pitch-bend changes that
// ride along with it (the drone's filter sweep, the thunder roll's bend).
// Pitches, velocities, programs and controller values are already inside
// the 0-127 MIDI ranges when they leave the core.

use serde::{Deserialize, Serialize};

/// The four layers, in track order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrackId {
    HarmonicBed = 0,
    MelodicTexture = 1,
    Drone = 2,
    AmbientEvents = 3,
}

impl TrackId {
    pub const ALL: [TrackId; 4] = [
        TrackId::HarmonicBed,
        TrackId::MelodicTexture,
        TrackId::Drone,
        TrackId::AmbientEvents,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable track name, used as the MIDI track name.
    pub fn name(self) -> &'static str {
        match self {
            TrackId::HarmonicBed => "Harmonic Bed",
            TrackId::MelodicTexture => "Melodic Texture",
            TrackId::Drone => "Drone",
            TrackId::AmbientEvents => "Ambient Events",
        }
    }

    /// Key used for this layer in theme sections.
    pub fn config_key(self) -> &'static str {
        match self {
            TrackId::HarmonicBed => "harmonic_bed",
            TrackId::MelodicTexture => "melodic_texture",
            TrackId::Drone => "drones",
            TrackId::AmbientEvents => "ambient_events",
        }
    }
}

/// A controller change at an absolute beat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerChange {
    pub beat: f64,
    pub controller: u8,
    pub value: u8,
}

/// A pitch-wheel position at an absolute beat, -8192..=8191 (0 = center).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchBendChange {
    pub beat: f64,
    pub value: i16,
}

/// One note on one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicEvent {
    pub track: TrackId,
    pub onset_beat: f64,
    pub pitch: u8,
    pub velocity: u8,
    pub duration_beats: f64,
    /// General MIDI program of the track.
    pub instrument: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controller_changes: Vec<ControllerChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pitch_bends: Vec<PitchBendChange>,
}

impl MusicEvent {
    pub fn note(
        track: TrackId,
        onset_beat: f64,
        pitch: u8,
        velocity: u8,
        duration_beats: f64,
        instrument: u8,
    ) -> Self {
        MusicEvent {
            track,
            onset_beat,
            pitch,
            velocity,
            duration_beats,
            instrument,
            controller_changes: Vec::new(),
            pitch_bends: Vec::new(),
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.onset_beat + self.duration_beats
    }
}

/// Clamp a computed velocity into the audible MIDI range. Zero is reserved
/// (a zero-velocity note-on is a note-off), so the floor is 1.
pub fn clamp_velocity(velocity: i64) -> u8 {
    velocity.clamp(1, 127) as u8
}

/// Stable sort by onset; events with equal onsets keep generation order.
pub fn sort_by_onset(events: &mut [MusicEvent]) {
    events.sort_by(|a, b| a.onset_beat.total_cmp(&b.onset_beat));
}
