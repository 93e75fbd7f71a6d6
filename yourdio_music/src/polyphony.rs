// Per-track polyphony limiter.
//
// Walks a track's events in onset order keeping the set of sounding voices.
// Before admitting a note it releases every voice that has already ended; if
// the track is still at its voice budget, the voice that would end first is
// stolen (cut off at the new note's onset). Ties on end beat go to the voice
// that started first, then to the one admitted first. A stolen note whose
// truncated length is zero (it started on the same beat) is dropped.

use crate::error::{CompositionError, Result};
use crate::event::{MusicEvent, sort_by_onset};

/// Slack when comparing an end beat against a later onset. Voices ending
/// within it of an onset are treated as released.
pub const BEAT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Voice {
    /// Index into the output list.
    slot: usize,
    onset: f64,
    end: f64,
}

/// Limit `events` so at most `max_voices` sound at once.
pub fn limit(events: Vec<MusicEvent>, max_voices: usize) -> Result<Vec<MusicEvent>> {
    if max_voices == 0 {
        return Err(CompositionError::config(
            "polyphony.max_voices",
            "a track needs at least one voice",
        ));
    }

    let mut out = events;
    sort_by_onset(&mut out);
    let mut active: Vec<Voice> = Vec::with_capacity(max_voices);

    for slot in 0..out.len() {
        let onset = out[slot].onset_beat;
        active.retain(|v| v.end > onset + BEAT_EPSILON);

        if active.len() >= max_voices {
            let victim = active
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.end.total_cmp(&b.end).then(a.onset.total_cmp(&b.onset))
                })
                .map(|(i, _)| i);
            if let Some(i) = victim {
                let stolen = active.remove(i);
                out[stolen.slot].duration_beats = onset - stolen.onset;
            }
        }

        active.push(Voice {
            slot,
            onset,
            end: out[slot].end_beat(),
        });
    }

    out.retain(|e| e.duration_beats > BEAT_EPSILON);
    Ok(out)
}

/// Largest number of events sounding at any one beat.
///
/// Ends within `BEAT_EPSILON` of an onset count as released.
pub fn peak_voices(events: &[MusicEvent]) -> usize {
    let mut sorted: Vec<&MusicEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.onset_beat.total_cmp(&b.onset_beat));

    let mut ends: Vec<f64> = Vec::new();
    let mut peak = 0;
    for e in sorted {
        ends.retain(|&end| end > e.onset_beat + BEAT_EPSILON);
        if e.duration_beats > 0.0 {
            ends.push(e.end_beat());
        }
        peak = peak.max(ends.len());
    }
    peak
}
