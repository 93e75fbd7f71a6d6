// Event soundscapes: short pieces for named game moments.
//
// Each `EventType` carries a fixed profile (length in minutes, the primes
// that drive its layers, and a chaos seed). The assembler treats a profile
// as a single-chapter piece whose context comes from this table instead of
// the prime stream. Names parse case-insensitively; an unknown name is an
// error listing the valid ones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Carousing,
    Fight,
    Stealth,
    Victory,
    Exploration,
    Tension,
    Rest,
    Death,
}

/// Fixed generation parameters for one event type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventProfile {
    pub duration_minutes: f64,
    pub primes: &'static [u64],
    pub chaos_seed: f64,
    pub description: &'static str,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Carousing,
        EventType::Fight,
        EventType::Stealth,
        EventType::Victory,
        EventType::Exploration,
        EventType::Tension,
        EventType::Rest,
        EventType::Death,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventType::Carousing => "carousing",
            EventType::Fight => "fight",
            EventType::Stealth => "stealth",
            EventType::Victory => "victory",
            EventType::Exploration => "exploration",
            EventType::Tension => "tension",
            EventType::Rest => "rest",
            EventType::Death => "death",
        }
    }

    pub fn profile(self) -> EventProfile {
        match self {
            EventType::Carousing => profile(2.0, &[3, 5, 7, 11], 0.42, "Lively tavern atmosphere"),
            EventType::Fight => profile(1.5, &[2, 3, 5, 7], 0.87, "Intense combat music"),
            EventType::Stealth => profile(3.0, &[5, 7, 11, 13], 0.23, "Tense sneaking atmosphere"),
            EventType::Victory => profile(1.0, &[3, 5, 7], 0.65, "Victory fanfare"),
            EventType::Exploration => {
                profile(4.0, &[7, 11, 13, 17], 0.31, "Atmospheric exploration")
            }
            EventType::Tension => profile(2.5, &[2, 5, 11], 0.91, "Building tension/dread"),
            EventType::Rest => profile(3.0, &[11, 13, 17], 0.15, "Peaceful rest/campfire"),
            EventType::Death => profile(0.5, &[2, 3], 0.73, "Death/failure sting"),
        }
    }
}

const fn profile(
    duration_minutes: f64,
    primes: &'static [u64],
    chaos_seed: f64,
    description: &'static str,
) -> EventProfile {
    EventProfile {
        duration_minutes,
        primes,
        chaos_seed,
        description,
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event name that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type '{name}'; available: {available}")]
pub struct UnknownEventType {
    pub name: String,
    pub available: String,
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EventType::ALL
            .into_iter()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| UnknownEventType {
                name: s.to_string(),
                available: EventType::ALL
                    .iter()
                    .map(|e| e.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
