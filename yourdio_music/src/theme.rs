// Theme configuration: the YAML-facing description of a piece's style.
//
// A theme fixes the pitch material (modal center, harmony rules), the
// rhythmic and dynamic behavior of each of the four layers, the instrument
// patches, tempo range, intensity arc, and chaos parameters. Every section
// is `#[serde(default)]`, so a partial YAML file merges over the built-in
// default theme the same way a missing section would.
//
// `ThemeConfig::validate` is the gate between file contents and the core:
// the composer assumes everything it checks. Layer-specific checks live next
// to the layer that depends on them (`LayerGenerator::check`) and are called
// from here as well as at the start of each generation call.
//
// Consumed by assembler.rs (whole theme) and the layer generators (their
// own sub-sections).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use yourdio_seq::LorenzParams;

use crate::error::{CompositionError, Result};
use crate::event::TrackId;
use crate::layers::{AmbientEvents, Drone, HarmonicBed, LayerGenerator, MelodicTexture};
use crate::mode;

/// A fully merged theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Named mode such as `D_dorian`. Ignored when `custom_scale` is set.
    pub modal_center: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_scale: Option<Vec<u8>>,
    pub harmony_rules: HarmonyRules,
    pub rhythmic_language: RhythmicLanguage,
    #[serde(alias = "ensemble")]
    pub ensemble_gm: Ensemble,
    pub tempo: Tempo,
    pub dynamics: Dynamics,
    pub structural_arc: StructuralArc,
    pub parameter_evolution: ParameterEvolution,
    pub polyphony: Polyphony,
    pub chaos: Chaos,
    pub motif: Motif,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            name: "Default".to_string(),
            description: Some("Slow quartal pads over a Dorian drone".to_string()),
            modal_center: "D_dorian".to_string(),
            custom_scale: None,
            harmony_rules: HarmonyRules::default(),
            rhythmic_language: RhythmicLanguage::default(),
            ensemble_gm: Ensemble::default(),
            tempo: Tempo::default(),
            dynamics: Dynamics::default(),
            structural_arc: StructuralArc::default(),
            parameter_evolution: ParameterEvolution::default(),
            polyphony: Polyphony::default(),
            chaos: Chaos::default(),
            motif: Motif::default(),
        }
    }
}

/// Chord construction rules for the harmonic bed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyRules {
    /// Descriptive label (`quartal`, `tertian`, ...). Not interpreted.
    #[serde(rename = "type")]
    pub kind: String,
    /// Scale-degree offsets stacked on the chord root.
    pub intervals: Vec<i32>,
    /// When set, `variation_intervals` replaces `intervals` on chords whose
    /// prime is divisible by `variation_chance_mod`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    pub variation_intervals: Vec<i32>,
    #[serde(alias = "variation_trigger_modulus")]
    pub variation_chance_mod: u64,
}

impl Default for HarmonyRules {
    fn default() -> Self {
        HarmonyRules {
            kind: "quartal".to_string(),
            intervals: vec![0, 3, 6],
            variation: None,
            variation_intervals: vec![0, 2, 4],
            variation_chance_mod: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmicLanguage {
    pub harmonic_bed: BedRhythm,
    pub melodic_texture: MelodicRhythm,
    pub drones: DroneRhythm,
    pub ambient_events: AmbientRhythm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BedRhythm {
    /// Chord length in beats before prime modulation.
    pub base_duration: f64,
    /// Chord length grows by `prime % prime_mod_factor` beats.
    pub prime_mod_factor: u64,
}

impl Default for BedRhythm {
    fn default() -> Self {
        BedRhythm {
            base_duration: 32.0,
            prime_mod_factor: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodicRhythm {
    /// How many Fibonacci terms feed the duration cycle.
    pub sequence_length: usize,
    /// Beats per Fibonacci unit.
    pub base_unit: f64,
}

impl Default for MelodicRhythm {
    fn default() -> Self {
        MelodicRhythm {
            sequence_length: 8,
            base_unit: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneRhythm {
    /// Drone length is `prime * duration_multiplier` beats.
    pub duration_multiplier: u64,
    /// Beats between filter-sweep controller events.
    pub cc_event_interval: f64,
    /// Controller number for the sweep (74 = brightness).
    pub cc_controller: u8,
    /// Output range of the sweep, `[low, high]`.
    pub cc_range: [u8; 2],
}

impl Default for DroneRhythm {
    fn default() -> Self {
        DroneRhythm {
            duration_multiplier: 4,
            cc_event_interval: 4.0,
            cc_controller: 74,
            cc_range: [0, 127],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientRhythm {
    /// Logistic iterates above this fire an event.
    pub threshold: f64,
    /// Number of evenly spaced checkpoints per chapter.
    pub event_count: usize,
}

impl Default for AmbientRhythm {
    fn default() -> Self {
        AmbientRhythm {
            threshold: 0.87,
            event_count: 64,
        }
    }
}

/// General MIDI program per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ensemble {
    pub harmonic_bed: u8,
    pub melodic_texture: u8,
    pub drones: u8,
    pub ambient_events: u8,
}

impl Default for Ensemble {
    fn default() -> Self {
        Ensemble {
            harmonic_bed: 89,
            melodic_texture: 92,
            drones: 95,
            ambient_events: 99,
        }
    }
}

impl Ensemble {
    pub fn patch(&self, track: TrackId) -> u8 {
        match track {
            TrackId::HarmonicBed => self.harmonic_bed,
            TrackId::MelodicTexture => self.melodic_texture,
            TrackId::Drone => self.drones,
            TrackId::AmbientEvents => self.ambient_events,
        }
    }
}

/// Slowest tempo a MIDI tempo event can carry: a quarter note may last at
/// most 0xFF_FFFF microseconds, about 3.6 BPM.
pub const MIN_TEMPO_BPM: u16 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tempo {
    /// BPM used when tempo evolution is off.
    pub base: u16,
    /// `[min, max]` BPM swept by intensity.
    pub variation_range: [u16; 2],
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo {
            base: 58,
            variation_range: [52, 68],
        }
    }
}

/// Velocity centered on `base_velocity`, raised by `prime % prime_mod_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeVelocity {
    pub base_velocity: u8,
    pub prime_mod_range: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedVelocity {
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDynamics {
    pub base_velocity: u8,
    /// Extra velocity at full event intensity.
    pub intensity_scaling: f64,
}

/// Per-layer velocities. Layers share field names but not defaults, so a
/// layer section given in YAML is read as a `DynamicsPatch` and merged over
/// `Dynamics::default()` field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DynamicsPatch")]
pub struct Dynamics {
    pub harmonic_bed: PrimeVelocity,
    pub melodic_texture: PrimeVelocity,
    pub drones: FixedVelocity,
    pub ambient_events: EventDynamics,
}

impl Default for Dynamics {
    fn default() -> Self {
        Dynamics {
            harmonic_bed: PrimeVelocity {
                base_velocity: 45,
                prime_mod_range: 20,
            },
            melodic_texture: PrimeVelocity {
                base_velocity: 55,
                prime_mod_range: 25,
            },
            drones: FixedVelocity { velocity: 50 },
            ambient_events: EventDynamics {
                base_velocity: 60,
                intensity_scaling: 30.0,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DynamicsPatch {
    harmonic_bed: PrimeVelocityPatch,
    melodic_texture: PrimeVelocityPatch,
    drones: FixedVelocityPatch,
    ambient_events: EventDynamicsPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrimeVelocityPatch {
    base_velocity: Option<u8>,
    prime_mod_range: Option<u64>,
}

impl PrimeVelocityPatch {
    fn over(self, base: PrimeVelocity) -> PrimeVelocity {
        PrimeVelocity {
            base_velocity: self.base_velocity.unwrap_or(base.base_velocity),
            prime_mod_range: self.prime_mod_range.unwrap_or(base.prime_mod_range),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FixedVelocityPatch {
    velocity: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventDynamicsPatch {
    base_velocity: Option<u8>,
    intensity_scaling: Option<f64>,
}

impl From<DynamicsPatch> for Dynamics {
    fn from(patch: DynamicsPatch) -> Self {
        let defaults = Dynamics::default();
        Dynamics {
            harmonic_bed: patch.harmonic_bed.over(defaults.harmonic_bed),
            melodic_texture: patch.melodic_texture.over(defaults.melodic_texture),
            drones: FixedVelocity {
                velocity: patch.drones.velocity.unwrap_or(defaults.drones.velocity),
            },
            ambient_events: EventDynamics {
                base_velocity: patch
                    .ambient_events
                    .base_velocity
                    .unwrap_or(defaults.ambient_events.base_velocity),
                intensity_scaling: patch
                    .ambient_events
                    .intensity_scaling
                    .unwrap_or(defaults.ambient_events.intensity_scaling),
            },
        }
    }
}

/// Shape of intensity across the chapters of a long-form piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcKind {
    Parabolic,
    SlowBurn,
    Descending,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralArc {
    #[serde(rename = "type")]
    pub kind: ArcKind,
    pub min_intensity: f64,
    pub max_intensity: f64,
    /// Peak chapter for `parabolic`; `None` means the middle chapter.
    pub climax_chapter: Option<usize>,
}

impl Default for StructuralArc {
    fn default() -> Self {
        StructuralArc {
            kind: ArcKind::Parabolic,
            min_intensity: 0.2,
            max_intensity: 0.8,
            climax_chapter: Some(6),
        }
    }
}

/// Which dimensions follow the intensity arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterEvolution {
    pub tempo: bool,
    pub polyphony: bool,
    pub velocity: bool,
    pub register: bool,
    /// Velocity offset at the extremes of intensity (0 and 1).
    pub velocity_swing: f64,
}

impl Default for ParameterEvolution {
    fn default() -> Self {
        ParameterEvolution {
            tempo: true,
            polyphony: true,
            velocity: true,
            register: true,
            velocity_swing: 10.0,
        }
    }
}

/// Voice budget per track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Polyphony {
    /// Voices at intensity 0 when polyphony evolves.
    pub min_voices: usize,
    /// Voices at intensity 1 when polyphony evolves.
    pub max_voices: usize,
    /// Voices when polyphony evolution is off.
    pub default_voices: usize,
}

impl Default for Polyphony {
    fn default() -> Self {
        Polyphony {
            min_voices: 18,
            max_voices: 32,
            default_voices: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chaos {
    pub logistic_r: f64,
    pub lorenz_sigma: f64,
    pub lorenz_rho: f64,
    pub lorenz_beta: f64,
}

impl Default for Chaos {
    fn default() -> Self {
        Chaos {
            logistic_r: 3.86,
            lorenz_sigma: 10.0,
            lorenz_rho: 28.0,
            lorenz_beta: 8.0 / 3.0,
        }
    }
}

impl Chaos {
    pub fn lorenz_params(&self) -> LorenzParams {
        LorenzParams {
            sigma: self.lorenz_sigma,
            rho: self.lorenz_rho,
            beta: self.lorenz_beta,
        }
    }
}

/// The recurring melodic idea of the melodic-texture layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motif {
    /// Scale-degree offsets played in order.
    pub core_pattern: Vec<i32>,
    /// Minutes between motif statements.
    pub interval_minutes: f64,
    #[serde(alias = "register_shift_prime_mod")]
    pub register_shift_modulus: u64,
    #[serde(alias = "ornament_density_mod")]
    pub ornament_density_modulus: u64,
}

impl Default for Motif {
    fn default() -> Self {
        Motif {
            core_pattern: vec![0, 2, 5, 7],
            interval_minutes: 17.0,
            register_shift_modulus: 2,
            ornament_density_modulus: 5,
        }
    }
}

/// Failure to produce a valid theme from a file or string.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("theme file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read theme {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse theme YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] CompositionError),
}

impl ThemeConfig {
    /// Parse a YAML theme, merge it over the defaults and validate it.
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, ThemeError> {
        let theme: ThemeConfig = serde_yaml::from_str(yaml)?;
        theme.validate()?;
        Ok(theme)
    }

    /// Load and validate a YAML theme file.
    pub fn load(path: &Path) -> std::result::Result<Self, ThemeError> {
        if !path.exists() {
            return Err(ThemeError::NotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Lowercased, underscore-separated name for output file names.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }

    /// Check every invariant the composition core relies on.
    pub fn validate(&self) -> Result<()> {
        mode::resolve(&self.modal_center, self.custom_scale.as_deref())?;

        for track in TrackId::ALL {
            let patch = self.ensemble_gm.patch(track);
            ensure(
                patch <= 127,
                format!("ensemble_gm.{}", track.config_key()),
                format!("GM patch {patch} is outside 0-127"),
            )?;
        }

        let base = self.tempo.base;
        let [low, high] = self.tempo.variation_range;
        ensure(
            base >= MIN_TEMPO_BPM,
            "tempo.base",
            format!("{base} BPM is below the minimum of {MIN_TEMPO_BPM}"),
        )?;
        ensure(
            low >= MIN_TEMPO_BPM && low <= high,
            "tempo.variation_range",
            format!("[{low}, {high}] must be ascending and at least {MIN_TEMPO_BPM} BPM"),
        )?;

        let arc = &self.structural_arc;
        ensure(
            (0.0..=1.0).contains(&arc.min_intensity)
                && (0.0..=1.0).contains(&arc.max_intensity)
                && arc.min_intensity <= arc.max_intensity,
            "structural_arc",
            format!(
                "need 0 <= min_intensity ({}) <= max_intensity ({}) <= 1",
                arc.min_intensity, arc.max_intensity
            ),
        )?;

        ensure(
            self.parameter_evolution.velocity_swing.is_finite()
                && self.parameter_evolution.velocity_swing >= 0.0,
            "parameter_evolution.velocity_swing",
            "must be a non-negative number",
        )?;

        let poly = &self.polyphony;
        ensure(
            poly.min_voices >= 1 && poly.min_voices <= poly.max_voices,
            "polyphony",
            format!(
                "need 1 <= min_voices ({}) <= max_voices ({})",
                poly.min_voices, poly.max_voices
            ),
        )?;
        ensure(
            poly.default_voices >= 1,
            "polyphony.default_voices",
            "must be at least 1",
        )?;

        let chaos = &self.chaos;
        ensure(
            chaos.logistic_r > 0.0 && chaos.logistic_r <= 4.0,
            "chaos.logistic_r",
            format!("{} is outside (0, 4]", chaos.logistic_r),
        )?;
        ensure(
            [chaos.lorenz_sigma, chaos.lorenz_rho, chaos.lorenz_beta]
                .iter()
                .all(|v| v.is_finite()),
            "chaos",
            "Lorenz parameters must be finite",
        )?;

        HarmonicBed::from_theme(self).check()?;
        MelodicTexture::from_theme(self).check()?;
        Drone::from_theme(self).check()?;
        AmbientEvents::from_theme(self).check()?;
        Ok(())
    }
}

/// Configuration error at `field` unless `condition` holds.
pub(crate) fn ensure(
    condition: bool,
    field: impl Into<String>,
    reason: impl Into<String>,
) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(CompositionError::config(field, reason))
    }
}

/// YAML theme files in `dir`, sorted by name. A missing directory has none.
pub fn list_themes(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut themes = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml {
            themes.push(path);
        }
    }
    themes.sort();
    Ok(themes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_valid() {
        ThemeConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_merges_with_defaults() {
        let theme = ThemeConfig::from_yaml_str(
            "name: Partial\ntempo:\n  base: 80\n  variation_range: [70, 90]\n",
        )
        .unwrap();
        assert_eq!(theme.name, "Partial");
        assert_eq!(theme.tempo.base, 80);
        assert_eq!(theme.modal_center, "D_dorian");
        assert_eq!(theme.dynamics, Dynamics::default());
    }

    #[test]
    fn nested_partial_section_keeps_sibling_defaults() {
        let theme =
            ThemeConfig::from_yaml_str("tempo:\n  base: 66\nmotif:\n  interval_minutes: 5\n")
                .unwrap();
        assert_eq!(theme.tempo.variation_range, [52, 68]);
        assert_eq!(theme.motif.core_pattern, vec![0, 2, 5, 7]);
        assert_eq!(theme.motif.interval_minutes, 5.0);
    }

    #[test]
    fn partial_layer_dynamics_keep_layer_defaults() {
        let theme = ThemeConfig::from_yaml_str(
            "dynamics:\n  harmonic_bed:\n    base_velocity: 50\n\
             \x20 ambient_events:\n    intensity_scaling: 12.5\n",
        )
        .unwrap();
        let defaults = Dynamics::default();
        assert_eq!(theme.dynamics.harmonic_bed.base_velocity, 50);
        assert_eq!(theme.dynamics.harmonic_bed.prime_mod_range, 20);
        assert_eq!(theme.dynamics.melodic_texture, defaults.melodic_texture);
        assert_eq!(theme.dynamics.drones, defaults.drones);
        assert_eq!(theme.dynamics.ambient_events.base_velocity, 60);
        assert_eq!(theme.dynamics.ambient_events.intensity_scaling, 12.5);
    }

    #[test]
    fn dynamics_round_trip_through_yaml() {
        let mut theme = ThemeConfig::default();
        theme.dynamics.melodic_texture.prime_mod_range = 7;
        let yaml = serde_yaml::to_string(&theme).unwrap();
        assert_eq!(ThemeConfig::from_yaml_str(&yaml).unwrap(), theme);
    }

    #[test]
    fn tempo_below_midi_minimum_rejected() {
        let mut theme = ThemeConfig::default();
        theme.tempo.variation_range = [2, 2];
        assert_eq!(
            theme.validate().unwrap_err().field(),
            Some("tempo.variation_range")
        );

        let mut theme = ThemeConfig::default();
        theme.tempo.base = 3;
        assert_eq!(theme.validate().unwrap_err().field(), Some("tempo.base"));

        theme.tempo.base = MIN_TEMPO_BPM;
        theme.tempo.variation_range = [MIN_TEMPO_BPM, MIN_TEMPO_BPM];
        theme.validate().unwrap();
    }

    #[test]
    fn legacy_key_aliases() {
        let theme = ThemeConfig::from_yaml_str(
            "ensemble:\n  harmonic_bed: 1\n  melodic_texture: 2\n  drones: 3\n  ambient_events: 4\n\
             motif:\n  register_shift_prime_mod: 3\n  ornament_density_mod: 7\n",
        )
        .unwrap();
        assert_eq!(theme.ensemble_gm.patch(TrackId::Drone), 3);
        assert_eq!(theme.motif.register_shift_modulus, 3);
        assert_eq!(theme.motif.ornament_density_modulus, 7);
    }

    #[test]
    fn arc_kind_parses_snake_case() {
        let theme = ThemeConfig::from_yaml_str(
            "structural_arc:\n  type: slow_burn\n  min_intensity: 0.4\n  max_intensity: 0.95\n",
        )
        .unwrap();
        assert_eq!(theme.structural_arc.kind, ArcKind::SlowBurn);
    }

    #[test]
    fn unknown_mode_without_custom_scale_rejected() {
        let err = ThemeConfig::from_yaml_str("modal_center: X_lunar\n").unwrap_err();
        match err {
            ThemeError::Invalid(e) => assert_eq!(e.field(), Some("modal_center")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_with_custom_scale_accepted() {
        let theme =
            ThemeConfig::from_yaml_str("modal_center: X_lunar\ncustom_scale: [60, 62, 63, 67]\n")
                .unwrap();
        assert_eq!(theme.custom_scale, Some(vec![60, 62, 63, 67]));
    }

    #[test]
    fn out_of_range_patch_rejected() {
        let mut theme = ThemeConfig::default();
        theme.ensemble_gm.melodic_texture = 128;
        let err = theme.validate().unwrap_err();
        assert_eq!(err.field(), Some("ensemble_gm.melodic_texture"));
    }

    #[test]
    fn inverted_intensity_bounds_rejected() {
        let mut theme = ThemeConfig::default();
        theme.structural_arc.min_intensity = 0.9;
        theme.structural_arc.max_intensity = 0.1;
        assert_eq!(
            theme.validate().unwrap_err().field(),
            Some("structural_arc")
        );
    }

    #[test]
    fn zero_modulus_rejected() {
        let mut theme = ThemeConfig::default();
        theme.rhythmic_language.harmonic_bed.prime_mod_factor = 0;
        assert_eq!(
            theme.validate().unwrap_err().field(),
            Some("rhythmic_language.harmonic_bed.prime_mod_factor")
        );
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = ThemeConfig::from_yaml_str("invalid: yaml: content: [[[").unwrap_err();
        assert!(matches!(err, ThemeError::Yaml(_)));
    }

    #[test]
    fn load_missing_file() {
        let err = ThemeConfig::load(Path::new("definitely_not_here.yaml")).unwrap_err();
        assert!(matches!(err, ThemeError::NotFound(_)));
    }

    #[test]
    fn load_and_list_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_theme.yaml"), "name: B Theme\n").unwrap();
        std::fs::write(dir.path().join("a_theme.yml"), "name: A\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a theme").unwrap();

        let themes = list_themes(dir.path()).unwrap();
        assert_eq!(themes.len(), 2);
        assert!(themes[0].ends_with("a_theme.yml"));

        let theme = ThemeConfig::load(&themes[1]).unwrap();
        assert_eq!(theme.name, "B Theme");
        assert_eq!(theme.slug(), "b_theme");
    }

    #[test]
    fn list_missing_directory_is_empty() {
        let themes = list_themes(Path::new("no_such_theme_dir")).unwrap();
        assert!(themes.is_empty());
    }
}
