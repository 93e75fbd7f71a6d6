// Chapter and event assembly.
//
// `assemble` is the core's entry point for one chapter of a long-form
// piece: it places the chapter on the intensity arc, derives the tuning,
// builds a fresh `GenerationContext` (with its own prime table), runs the
// four layer generators, and passes each track through the polyphony
// limiter. `assemble_event` does the same for a single event soundscape,
// taking its context from the event table.
//
// Nothing here is shared between calls, so chapters can be assembled on
// separate threads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use yourdio_seq::PrimeTable;

use crate::arc::{self, ChapterTuning};
use crate::context::GenerationContext;
use crate::error::Result;
use crate::event::{MusicEvent, TrackId, sort_by_onset};
use crate::layers::{AmbientEvents, Drone, HarmonicBed, LayerGenerator, MelodicTexture};
use crate::mode::{self, Scale};
use crate::polyphony;
use crate::soundscape::EventType;
use crate::theme::ThemeConfig;

/// One assembled chapter or event: four limited tracks plus the metadata an
/// encoder needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub chapter_index: usize,
    pub total_chapters: usize,
    pub duration_beats: f64,
    pub chaos_seed: f64,
    pub tuning: ChapterTuning,
    pub tracks: BTreeMap<TrackId, Vec<MusicEvent>>,
    /// GM program per track.
    pub instruments: BTreeMap<TrackId, u8>,
}

impl Composition {
    pub fn tempo_bpm(&self) -> u16 {
        self.tuning.tempo_bpm
    }

    pub fn intensity(&self) -> f64 {
        self.tuning.intensity
    }

    pub fn track(&self, track: TrackId) -> &[MusicEvent] {
        self.tracks.get(&track).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    /// All tracks merged into one onset-ordered list (track order breaks ties).
    pub fn merged(&self) -> Vec<MusicEvent> {
        let mut all: Vec<MusicEvent> = self.tracks.values().flatten().cloned().collect();
        sort_by_onset(&mut all);
        all
    }
}

/// Assemble chapter `chapter_index` of `total_chapters`, `duration_beats` long.
pub fn assemble(
    theme: &ThemeConfig,
    chapter_index: usize,
    total_chapters: usize,
    duration_beats: f64,
) -> Result<Composition> {
    assemble_chapter(theme, chapter_index, total_chapters, |_| duration_beats)
}

/// Like `assemble`, with the length given in minutes at the chapter's own
/// tempo.
pub fn assemble_minutes(
    theme: &ThemeConfig,
    chapter_index: usize,
    total_chapters: usize,
    duration_minutes: f64,
) -> Result<Composition> {
    assemble_chapter(theme, chapter_index, total_chapters, |tuning| {
        duration_minutes * tuning.tempo_bpm as f64
    })
}

fn assemble_chapter(
    theme: &ThemeConfig,
    chapter_index: usize,
    total_chapters: usize,
    beats: impl FnOnce(&ChapterTuning) -> f64,
) -> Result<Composition> {
    theme.validate()?;
    let intensity = arc::intensity(chapter_index, total_chapters, &theme.structural_arc)?;
    let tuning = ChapterTuning::derive(theme, intensity);
    let duration_beats = beats(&tuning);

    let mut primes = PrimeTable::new();
    let ctx = GenerationContext::for_chapter(
        &mut primes,
        chapter_index,
        total_chapters,
        duration_beats,
        tuning,
    )?;
    compose(theme, &ctx)
}

/// Assemble the short soundscape for `event`.
pub fn assemble_event(theme: &ThemeConfig, event: EventType) -> Result<Composition> {
    theme.validate()?;
    let profile = event.profile();
    let intensity = arc::intensity(0, 1, &theme.structural_arc)?;
    let tuning = ChapterTuning::derive(theme, intensity);
    let duration_beats = profile.duration_minutes * tuning.tempo_bpm as f64;

    let ctx = GenerationContext::for_fixed_primes(
        profile.primes,
        profile.chaos_seed,
        duration_beats,
        tuning,
    )?;
    compose(theme, &ctx)
}

/// Run every layer for `ctx` and limit each track.
pub fn compose(theme: &ThemeConfig, ctx: &GenerationContext) -> Result<Composition> {
    let scale = mode::resolve(&theme.modal_center, theme.custom_scale.as_deref())?;

    let tracks = BTreeMap::from([
        render_layer(HarmonicBed::from_theme(theme), theme, &scale, ctx)?,
        render_layer(MelodicTexture::from_theme(theme), theme, &scale, ctx)?,
        render_layer(Drone::from_theme(theme), theme, &scale, ctx)?,
        render_layer(AmbientEvents::from_theme(theme), theme, &scale, ctx)?,
    ]);
    let instruments = TrackId::ALL
        .into_iter()
        .map(|track| (track, theme.ensemble_gm.patch(track)))
        .collect();

    Ok(Composition {
        chapter_index: ctx.chapter_index,
        total_chapters: ctx.total_chapters,
        duration_beats: ctx.duration_beats,
        chaos_seed: ctx.chaos_seed,
        tuning: ctx.tuning,
        tracks,
        instruments,
    })
}

fn render_layer<L: LayerGenerator>(
    layer: L,
    theme: &ThemeConfig,
    scale: &Scale,
    ctx: &GenerationContext,
) -> Result<(TrackId, Vec<MusicEvent>)> {
    let raw = layer.generate(scale, ctx, theme.ensemble_gm.patch(L::TRACK))?;
    Ok((L::TRACK, polyphony::limit(raw, ctx.tuning.max_voices)?))
}
