// Yourdio Composer
//
// A deterministic ambient composer. A YAML theme fixes the pitch material,
// the behavior of four layers, and an intensity arc; the prime numbers,
// Fibonacci numbers, a logistic map and a Lorenz attractor (from
// `yourdio_seq`) supply every "random" choice. The output is a set of MIDI
// files: a long-form piece of many chapters, or short soundscapes for named
// game events.
//
// Architecture:
// - error.rs: CompositionError (configuration vs. computation failures)
// - mode.rs: Church modes, scale resolution, chord building with octave wrap
// - theme.rs: ThemeConfig (serde/YAML), defaults, validation, theme listing
// - arc.rs: Chapter intensity over the structural arc + derived ChapterTuning
// - event.rs: MusicEvent, controller/pitch-bend changes, track identifiers
// - context.rs: GenerationContext (per-chapter prime windows, chaos seed)
// - layers/: Harmonic bed, melodic texture, drone, ambient event generators
// - polyphony.rs: Per-track voice limiter (steals the earliest-ending voice)
// - soundscape.rs: EventType table (durations, primes, chaos seeds)
// - assembler.rs: Chapter/event assembly into a Composition
// - midi.rs: Composition -> Standard MIDI File
// - render.rs: Writing chapters and soundscapes to disk (parallel, logged)
//
// Everything up to assembler.rs is pure: no I/O, no logging, no shared
// state. Output is identical for identical theme and chapter inputs.

pub mod arc;
pub mod assembler;
pub mod context;
pub mod error;
pub mod event;
pub mod layers;
pub mod midi;
pub mod mode;
pub mod polyphony;
pub mod render;
pub mod soundscape;
pub mod theme;

pub use assembler::{Composition, assemble, assemble_event, assemble_minutes};
pub use error::CompositionError;
pub use event::{MusicEvent, TrackId};
pub use soundscape::EventType;
pub use theme::ThemeConfig;
