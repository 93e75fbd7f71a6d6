// File rendering: assemble compositions and write them as MIDI.
//
// `render_composition` writes one `chapter_NN.mid` per chapter of a
// long-form piece. Chapters are assembled on the rayon pool; each worker
// builds its own context and generator state, so results do not depend on
// scheduling. `render_event` and `render_event_set` write
// `<event>_<theme-slug>.mid` soundscapes.
//
// This is the first layer above the pure core and the first that logs.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::assembler::{self, Composition};
use crate::error::CompositionError;
use crate::event::TrackId;
use crate::midi::{self, MidiError};
use crate::soundscape::EventType;
use crate::theme::ThemeConfig;

/// Directory long-form chapters go to when none is given.
pub const DEFAULT_COMPOSITION_DIR: &str = "midi_output";

/// Directory event soundscapes go to when none is given.
pub const DEFAULT_EVENTS_DIR: &str = "events_output";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Midi(#[from] MidiError),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shape of a long-form piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceLayout {
    pub chapters: usize,
    pub chapter_minutes: f64,
}

impl Default for PieceLayout {
    /// Twelve half-hour chapters.
    fn default() -> Self {
        PieceLayout {
            chapters: 12,
            chapter_minutes: 30.0,
        }
    }
}

pub fn chapter_file_name(chapter_index: usize) -> String {
    format!("chapter_{chapter_index:02}.mid")
}

pub fn event_file_name(event: EventType, theme: &ThemeConfig) -> String {
    format!("{}_{}.mid", event.name(), theme.slug())
}

fn ensure_dir(dir: &Path) -> Result<(), RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn log_tracks(composition: &Composition) {
    for track in TrackId::ALL {
        debug!(
            track = track.name(),
            notes = composition.track(track).len(),
            program = composition.instruments.get(&track).copied().unwrap_or(0),
            "track assembled"
        );
    }
}

/// Render every chapter of a long-form piece into `out_dir`, returning the
/// written paths in chapter order.
pub fn render_composition(
    theme: &ThemeConfig,
    layout: PieceLayout,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, RenderError> {
    theme.validate()?;
    if layout.chapters == 0 {
        return Err(CompositionError::config(
            "total_chapters",
            "a piece needs at least one chapter",
        )
        .into());
    }
    ensure_dir(out_dir)?;
    info!(
        theme = %theme.name,
        chapters = layout.chapters,
        minutes = layout.chapter_minutes,
        dir = %out_dir.display(),
        "rendering composition"
    );

    let written: Result<Vec<PathBuf>, RenderError> = (0..layout.chapters)
        .into_par_iter()
        .map(|chapter| {
            let composition = assembler::assemble_minutes(
                theme,
                chapter,
                layout.chapters,
                layout.chapter_minutes,
            )?;
            log_tracks(&composition);
            let path = out_dir.join(chapter_file_name(chapter));
            midi::write_midi(&composition, &path)?;
            info!(
                chapter,
                intensity = composition.intensity(),
                tempo = composition.tempo_bpm(),
                voices = composition.tuning.max_voices,
                notes = composition.event_count(),
                path = %path.display(),
                "chapter written"
            );
            Ok(path)
        })
        .collect();
    let written = written?;

    info!(files = written.len(), "composition complete");
    Ok(written)
}

/// Render one event soundscape into `out_dir`.
pub fn render_event(
    theme: &ThemeConfig,
    event: EventType,
    out_dir: &Path,
) -> Result<PathBuf, RenderError> {
    ensure_dir(out_dir)?;
    let profile = event.profile();
    let composition = assembler::assemble_event(theme, event)?;
    log_tracks(&composition);

    let path = out_dir.join(event_file_name(event, theme));
    midi::write_midi(&composition, &path)?;
    info!(
        event = event.name(),
        description = profile.description,
        minutes = profile.duration_minutes,
        theme = %theme.name,
        path = %path.display(),
        "soundscape written"
    );
    Ok(path)
}

/// Render several event soundscapes, in the order given.
pub fn render_event_set(
    theme: &ThemeConfig,
    events: &[EventType],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, RenderError> {
    theme.validate()?;
    ensure_dir(out_dir)?;
    info!(
        theme = %theme.name,
        events = events.len(),
        dir = %out_dir.display(),
        "rendering soundscapes"
    );

    let written: Result<Vec<PathBuf>, RenderError> = events
        .par_iter()
        .map(|&event| render_event(theme, event, out_dir))
        .collect();
    let written = written?;

    info!(files = written.len(), "soundscapes complete");
    Ok(written)
}
