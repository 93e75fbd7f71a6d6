// Drone: the scale root two octaves down, held for prime-length spans.
//
// Each drone lasts `prime * duration_multiplier` beats (the last one is cut
// at the end of the chapter). While it sounds, a controller change every
// `cc_event_interval` beats carries the next sample of a Lorenz attractor,
// mapped into `cc_range`. The attractor is started from the context's chaos
// seed and runs continuously across drones, so the sweep never jumps.

use yourdio_seq::{Lorenz, LorenzState};

use crate::context::{GenerationContext, PrimeCycle};
use crate::error::Result;
use crate::event::{ControllerChange, MusicEvent, TrackId, clamp_velocity};
use crate::layers::{LayerGenerator, OCTAVE};
use crate::mode::{Scale, fold_to_midi};
use crate::theme::{Chaos, DroneRhythm, FixedVelocity, ThemeConfig, ensure};

/// Attractor `x` before the chaos seed is added.
const LORENZ_X0: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct Drone<'a> {
    pub chaos: &'a Chaos,
    pub rhythm: &'a DroneRhythm,
    pub dynamics: &'a FixedVelocity,
}

impl<'a> Drone<'a> {
    pub fn from_theme(theme: &'a ThemeConfig) -> Self {
        Drone {
            chaos: &theme.chaos,
            rhythm: &theme.rhythmic_language.drones,
            dynamics: &theme.dynamics.drones,
        }
    }
}

impl LayerGenerator for Drone<'_> {
    const TRACK: TrackId = TrackId::Drone;

    fn check(&self) -> Result<()> {
        ensure(
            self.rhythm.duration_multiplier > 0,
            "rhythmic_language.drones.duration_multiplier",
            "must be positive",
        )?;
        ensure(
            self.rhythm.cc_event_interval.is_finite() && self.rhythm.cc_event_interval > 0.0,
            "rhythmic_language.drones.cc_event_interval",
            "must be a positive number of beats",
        )?;
        ensure(
            self.rhythm.cc_controller <= 127,
            "rhythmic_language.drones.cc_controller",
            "must be within 0-127",
        )?;
        let [low, high] = self.rhythm.cc_range;
        ensure(
            low <= high && high <= 127,
            "rhythmic_language.drones.cc_range",
            format!("[{low}, {high}] must be ascending within 0-127"),
        )?;
        ensure(
            self.dynamics.velocity <= 127,
            "dynamics.drones.velocity",
            "must be within 0-127",
        )
    }

    fn generate(
        &self,
        scale: &Scale,
        ctx: &GenerationContext,
        instrument: u8,
    ) -> Result<Vec<MusicEvent>> {
        self.check()?;
        let pitch = fold_to_midi(scale.root()? as i32 - 2 * OCTAVE);
        let primes = PrimeCycle::new(ctx.primes_for(Self::TRACK))?;
        let velocity =
            clamp_velocity(self.dynamics.velocity as i64 + ctx.tuning.velocity_offset as i64);

        let mut sweep = Lorenz::new(
            self.chaos.lorenz_params(),
            LorenzState::new(LORENZ_X0 + ctx.chaos_seed, 0.0, 0.0),
        );
        let [cc_low, cc_high] = self.rhythm.cc_range;
        let interval = self.rhythm.cc_event_interval;
        let total = ctx.duration_beats;

        let mut events = Vec::new();
        let mut onset = 0.0;
        let mut step = 0usize;

        while onset < total {
            let prime = primes.at(step);
            let length = prime.saturating_mul(self.rhythm.duration_multiplier) as f64;
            let mut drone = MusicEvent::note(
                Self::TRACK,
                onset,
                pitch,
                velocity,
                length.min(total - onset),
                instrument,
            );

            let changes = (length / interval).floor() as usize;
            for i in 0..changes {
                let beat = onset + i as f64 * interval;
                if beat >= total {
                    break;
                }
                let value = sweep.next_controller_value(cc_low, cc_high);
                drone.controller_changes.push(ControllerChange {
                    beat,
                    controller: self.rhythm.cc_controller,
                    value,
                });
            }

            events.push(drone);
            onset += length;
            step += 1;
        }

        Ok(events)
    }
}
