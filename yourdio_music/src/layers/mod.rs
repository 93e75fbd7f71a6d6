// The four layer generators.
//
// Each layer is a linear cursor over beats: it reads a prime (or a chaos
// iterate), emits one or more notes, advances its onset, and stops once the
// onset reaches the context's duration. The only branching is the
// threshold/modulus gating each layer documents.
//
// - `harmonic_bed.rs`: slow chords built from the harmony rules
// - `melodic.rs`: periodic motif statements with Fibonacci durations
// - `drone.rs`: low root held for prime-length spans, Lorenz filter sweep
// - `ambient.rs`: logistic-map-gated dramatic figures
//
// A layer borrows its slice of the theme (`from_theme`) and is otherwise
// stateless, so generation is deterministic given the same scale, context
// and theme. Output is sorted by onset.

pub mod ambient;
pub mod drone;
pub mod harmonic_bed;
pub mod melodic;

use crate::context::GenerationContext;
use crate::error::Result;
use crate::event::{MusicEvent, TrackId};
use crate::mode::Scale;

pub use ambient::AmbientEvents;
pub use drone::Drone;
pub use harmonic_bed::HarmonicBed;
pub use melodic::MelodicTexture;

/// Semitones in an octave.
pub(crate) const OCTAVE: i32 = 12;

/// A generator for one track.
pub trait LayerGenerator {
    /// The track this layer renders to.
    const TRACK: TrackId;

    /// Validate this layer's slice of the theme. Reports the offending field.
    fn check(&self) -> Result<()>;

    /// Render the layer for one context, in onset order.
    fn generate(
        &self,
        scale: &Scale,
        ctx: &GenerationContext,
        instrument: u8,
    ) -> Result<Vec<MusicEvent>>;
}
