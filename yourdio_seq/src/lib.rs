// Deterministic sequence generators for Yourdio.
//
// These four generators are the project's only source of variation. The
// composer never consults a random number generator: every duration,
// velocity, register shift and ambient event is derived from one of the
// sequences below, seeded from the theme and the chapter/event index.
//
// - `primes.rs`: cached ascending primes with arbitrary window slicing
// - `fibonacci.rs`: 1, 1, 2, 3, 5, ... used for melodic durations
// - `logistic.rs`: logistic-map cursor driving ambient event gating
// - `lorenz.rs`: Euler-integrated Lorenz attractor for filter sweeps
//
// **Critical constraint: determinism.** Every generator must produce
// identical output given identical parameters, and "restart from seed" must
// be an explicit operation on the cursor. Nothing here may read process-wide
// state. Cursors derive `Serialize`/`Deserialize` so a generation pass can be
// snapshotted and resumed mid-stream.

pub mod fibonacci;
pub mod logistic;
pub mod lorenz;
pub mod primes;

pub use fibonacci::Fibonacci;
pub use logistic::LogisticMap;
pub use lorenz::{Lorenz, LorenzParams, LorenzState};
pub use primes::{PrimeStream, PrimeTable};
