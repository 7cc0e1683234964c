//! The typed simulation configuration tree.
//!
//! Mirrors the semantic keys consumed by the core: `mesh`, `evolution`,
//! `solver`, `scheme`, `boundaries`, `transport`, `sources`, `mhd`, `time`
//! and `output`, plus the `composition` and `initial` sections used by the
//! initial-condition builder. The hierarchical reader that produces these
//! values is a collaborator; deserialization happens through serde from
//! whatever document format the caller picked.
//!
//! [`SimulationConfig::validate`] applies the cross-component rules and is
//! the only place configuration errors can originate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{NEWTON_MAX_ITERATIONS, NEWTON_TOL};
use crate::{ConfigError, Result};

// ==================== Mesh

/// The analytic geometry family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    /// Cylindrical approximation with circular cross section.
    Circular,
    /// CHEASE equilibrium input (requires the persistence collaborator).
    Chease,
    /// EQDSK equilibrium input (requires the persistence collaborator).
    Eqdsk,
}

/// Radial mesh and device parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Number of radial cells.
    pub n_cells: usize,
    /// Major radius `R0` **in \[m\]**.
    pub major_radius: f64,
    /// Minor radius `a` **in \[m\]**.
    pub minor_radius: f64,
    /// Toroidal field on axis `Bφ` **in \[T\]**.
    pub toroidal_field: f64,
    /// Geometry family.
    pub geometry_type: GeometryType,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            n_cells: 50,
            major_radius: 3.0,
            minor_radius: 1.0,
            toroidal_field: 5.0,
            geometry_type: GeometryType::Circular,
        }
    }
}

// ==================== Evolution

/// Per-field evolve flags. A disabled field is held at its current values
/// through identity residual rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Evolve the ion temperature equation.
    pub ion_heat: bool,
    /// Evolve the electron temperature equation.
    pub electron_heat: bool,
    /// Evolve the electron density equation.
    pub density: bool,
    /// Evolve the poloidal flux (current diffusion) equation.
    pub current: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            ion_heat: true,
            electron_heat: true,
            density: false,
            current: false,
        }
    }
}

// ==================== Solver

/// The nonlinear solver flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// A single linearized θ-step (one Newton iteration, no convergence
    /// loop).
    Linear,
    /// Full Newton–Raphson iteration.
    NewtonRaphson,
    /// Newton–Raphson with backtracking line search.
    Optimizer,
}

/// Nonlinear solver parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solver flavour.
    pub kind: SolverKind,
    /// Residual tolerance in scaled coordinates.
    pub tolerance: f64,
    /// Maximum Newton iterations per step.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::NewtonRaphson,
            tolerance: NEWTON_TOL,
            max_iterations: NEWTON_MAX_ITERATIONS,
        }
    }
}

// ==================== Scheme

/// Time-discretization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    /// θ ∈ \[0, 1\]: 1 = implicit Euler, 0.5 = Crank–Nicolson, 0 = explicit.
    pub theta: f64,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self { theta: 1.0 }
    }
}

// ==================== Boundaries

/// The kind of edge constraint applied to the evolved fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Fixed value at the edge.
    Dirichlet,
    /// Fixed gradient at the edge.
    Neumann,
}

/// Edge boundary values. The axis side is always symmetric (zero gradient)
/// unless a scenario imposes a fixed axis value through the simulation API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundariesConfig {
    /// Edge ion temperature **in \[eV\]**.
    pub ion_temperature: f64,
    /// Edge electron temperature **in \[eV\]**.
    pub electron_temperature: f64,
    /// Edge electron density **in \[m⁻³\]**.
    pub density: f64,
    /// Constraint kind applied at the edge.
    pub kind: BoundaryKind,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            ion_temperature: 100.0,
            electron_temperature: 100.0,
            density: 5e19,
            kind: BoundaryKind::Dirichlet,
        }
    }
}

// ==================== Transport

/// Transport model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportModelKind {
    /// Spatially constant coefficients.
    Constant,
    /// Bohm–gyroBohm mixed model.
    BohmGyroBohm,
}

/// Transport model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Which model provides χᵢ, χₑ, D, V.
    pub model: TransportModelKind,
    /// Constant-model ion heat diffusivity **in \[m²/s\]**.
    pub chi_i: f64,
    /// Constant-model electron heat diffusivity **in \[m²/s\]**.
    pub chi_e: f64,
    /// Constant-model particle diffusivity **in \[m²/s\]**.
    pub particle_d: f64,
    /// Constant-model pinch velocity **in \[m/s\]** (negative = inward).
    pub particle_v: f64,
    /// Bohm coefficient of the BgB model.
    pub bohm_coeff: f64,
    /// gyroBohm coefficient of the BgB model.
    pub gyro_bohm_coeff: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            model: TransportModelKind::Constant,
            chi_i: 1.0,
            chi_e: 1.0,
            particle_d: 0.5,
            particle_v: -0.2,
            bohm_coeff: 8e-5,
            gyro_bohm_coeff: 5e-6,
        }
    }
}

// ==================== Sources

/// Ohmic heating / resistivity parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OhmicConfig {
    /// Model enabled.
    pub enabled: bool,
}

impl Default for OhmicConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// D-T fusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Deuterium fraction of the fuel mix.
    pub deuterium_fraction: f64,
    /// Tritium fraction of the fuel mix.
    pub tritium_fraction: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            deuterium_fraction: 0.5,
            tritium_fraction: 0.5,
        }
    }
}

/// Ion–electron collisional exchange parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Model enabled.
    pub enabled: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// ECRH deposition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EcrhConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Total injected power **in \[MW\]**.
    pub power_mw: f64,
    /// Normalized deposition radius `ρ_dep`.
    pub deposition_rho: f64,
    /// Full deposition width (3σ) in normalized radius.
    pub width: f64,
}

impl Default for EcrhConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            power_mw: 10.0,
            deposition_rho: 0.3,
            width: 0.3,
        }
    }
}

/// Bremsstrahlung loss parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BremsstrahlungConfig {
    /// Model enabled.
    pub enabled: bool,
}

impl Default for BremsstrahlungConfig {
    fn default() -> Self {
        Self { enabled: false }
    }
}

/// Edge gas-puff particle source parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasPuffConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Total particle throughput **in \[particles/s\]**.
    pub rate: f64,
    /// e-folding penetration depth in normalized radius, measured from the
    /// edge.
    pub decay_length: f64,
}

impl Default for GasPuffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 1e20,
            decay_length: 0.05,
        }
    }
}

/// Impurity line-radiation species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpuritySpecies {
    /// Carbon (Z = 6).
    Carbon,
    /// Oxygen (Z = 8).
    Oxygen,
    /// Neon (Z = 10).
    Neon,
    /// Argon (Z = 18).
    Argon,
    /// Iron (Z = 26).
    Iron,
    /// Tungsten (Z = 74).
    Tungsten,
}

/// Impurity radiation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpurityRadiationConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Radiating species.
    pub species: ImpuritySpecies,
    /// Impurity density as a fraction of nₑ.
    pub fraction: f64,
}

impl Default for ImpurityRadiationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            species: ImpuritySpecies::Carbon,
            fraction: 1e-3,
        }
    }
}

/// Bootstrap current parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Sign-preserving magnitude clamp **in \[MA/m²\]**.
    pub magnitude_clamp: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            magnitude_clamp: 10.0,
        }
    }
}

/// Prescribed external (ECCD-like) current drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalCurrentConfig {
    /// Model enabled.
    pub enabled: bool,
    /// Total driven current **in \[MA\]**.
    pub total_ma: f64,
    /// Normalized deposition radius.
    pub deposition_rho: f64,
    /// Full deposition width (3σ) in normalized radius.
    pub width: f64,
}

impl Default for ExternalCurrentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            total_ma: 0.5,
            deposition_rho: 0.2,
            width: 0.2,
        }
    }
}

/// Per-model source enablement and parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Ohmic heating and resistivity.
    pub ohmic: OhmicConfig,
    /// D-T fusion heating.
    pub fusion: FusionConfig,
    /// Ion–electron collisional exchange.
    pub exchange: ExchangeConfig,
    /// ECRH auxiliary heating.
    pub ecrh: EcrhConfig,
    /// Bremsstrahlung radiation loss.
    pub bremsstrahlung: BremsstrahlungConfig,
    /// Edge gas puff.
    pub gas_puff: GasPuffConfig,
    /// Impurity line radiation.
    pub impurity_radiation: ImpurityRadiationConfig,
    /// Sauter bootstrap current.
    pub bootstrap: BootstrapConfig,
    /// Prescribed external current drive.
    pub external_current: ExternalCurrentConfig,
}

// ==================== Composition

/// Main-ion species and effective charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Main-ion mass **in \[u\]** (2.5 for a 50/50 D-T mix).
    pub main_ion_mass: f64,
    /// Main-ion charge number.
    pub main_ion_charge: f64,
    /// Effective plasma charge `Z_eff`.
    pub z_eff: f64,
    /// Fuel dilution nᵢ/nₑ from quasi-neutrality with impurities.
    pub dilution: f64,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            main_ion_mass: 2.5,
            main_ion_charge: 1.0,
            z_eff: 1.5,
            dilution: 0.9,
        }
    }
}

// ==================== Initial conditions

/// Parameters of the parabolic initial-profile builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    /// Central ion temperature **in \[eV\]**.
    pub ion_temperature: f64,
    /// Central electron temperature **in \[eV\]**.
    pub electron_temperature: f64,
    /// Central electron density **in \[m⁻³\]**.
    pub density: f64,
    /// Profile peaking exponent α of `(1 − ρ²)^α`.
    pub peaking: f64,
    /// Total plasma current **in \[MA\]**, used to seed ψ.
    pub plasma_current_ma: f64,
    /// Current-density peaking exponent ν of `(1 − ρ²)^ν`.
    pub current_peaking: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            ion_temperature: 5e3,
            electron_temperature: 5e3,
            density: 8e19,
            peaking: 1.5,
            plasma_current_ma: 10.0,
            current_peaking: 1.0,
        }
    }
}

// ==================== MHD

/// Sawtooth crash parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SawtoothConfig {
    /// Crash trigger threshold on the on-axis safety factor.
    pub q_critical: f64,
    /// Normalized inversion (mixing) radius.
    pub inversion_radius: f64,
    /// Refractory interval between crashes **in \[s\]**.
    pub min_interval: f64,
}

impl Default for SawtoothConfig {
    fn default() -> Self {
        Self {
            q_critical: 1.0,
            inversion_radius: 0.3,
            min_interval: 0.01,
        }
    }
}

/// MHD event configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MhdConfig {
    /// Sawtooth model enabled.
    pub sawtooth_enabled: bool,
    /// Sawtooth parameters.
    pub sawtooth: SawtoothConfig,
}

// ==================== Time

/// Adaptive step-size bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Smallest admissible Δt **in \[s\]**.
    pub min_dt: f64,
    /// Largest admissible Δt **in \[s\]**.
    pub max_dt: f64,
    /// Controller safety factor, in (0, 1].
    pub safety_factor: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_dt: 1e-6,
            max_dt: 1.0,
            safety_factor: 0.9,
        }
    }
}

/// Simulated time interval and stepping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Start time **in \[s\]**.
    pub start: f64,
    /// End time **in \[s\]**.
    pub end: f64,
    /// Initial Δt **in \[s\]**.
    pub initial_dt: f64,
    /// Adaptive stepping bounds; `None` = fixed step.
    pub adaptive: Option<AdaptiveConfig>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            initial_dt: 1e-2,
            adaptive: Some(AdaptiveConfig::default()),
        }
    }
}

// ==================== Output

/// Persistence format hint for the output collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON time series.
    Json,
    /// HDF5 time series.
    Hdf5,
    /// NetCDF time series.
    Netcdf,
}

/// Output recording parameters. Writing is done by a collaborator; the core
/// only honours `save_interval` when recording snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Snapshot stride **in \[s\]**; `None` records scalars only.
    pub save_interval: Option<f64>,
    /// Output directory for the persistence collaborator.
    pub directory: PathBuf,
    /// Requested file format.
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_interval: None,
            directory: PathBuf::from("./output"),
            format: OutputFormat::Netcdf,
        }
    }
}

// ==================== Root

/// The full simulation configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Radial mesh and device parameters.
    pub mesh: MeshConfig,
    /// Per-field evolve flags.
    pub evolution: EvolutionConfig,
    /// Nonlinear solver parameters.
    pub solver: SolverConfig,
    /// Time discretization.
    pub scheme: SchemeConfig,
    /// Edge boundary values.
    pub boundaries: BoundariesConfig,
    /// Transport model.
    pub transport: TransportConfig,
    /// Source models.
    pub sources: SourcesConfig,
    /// Plasma composition.
    pub composition: CompositionConfig,
    /// Initial-profile builder parameters.
    pub initial: InitialConfig,
    /// MHD events.
    pub mhd: MhdConfig,
    /// Time interval and stepping.
    pub time: TimeConfig,
    /// Output recording.
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Validates the tree and applies the cross-component rules.
    ///
    /// `initial_dt` outside the adaptive bounds is clamped into range with a
    /// logged warning rather than rejected.
    pub fn validate(&mut self) -> Result<()> {
        if self.mesh.n_cells == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mesh.n_cells",
                reason: "must be positive".into(),
            });
        }
        if self.mesh.major_radius <= 0.0 || self.mesh.minor_radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "mesh.major_radius/minor_radius",
                reason: "radii must be positive".into(),
            });
        }
        if self.mesh.minor_radius >= self.mesh.major_radius {
            return Err(ConfigError::Inconsistent {
                keys: "mesh.minor_radius/mesh.major_radius",
                reason: "aspect ratio must exceed 1".into(),
            });
        }

        if !(0.0..=1.0).contains(&self.scheme.theta) {
            return Err(ConfigError::InvalidValue {
                key: "scheme.theta",
                reason: format!("θ = {} outside [0, 1]", self.scheme.theta),
            });
        }

        if self.solver.tolerance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "solver.tolerance",
                reason: "must be positive".into(),
            });
        }
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "solver.max_iterations",
                reason: "must be positive".into(),
            });
        }

        if self.boundaries.ion_temperature <= 0.0 || self.boundaries.electron_temperature <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "boundaries.ion_temperature/electron_temperature",
                reason: "edge temperatures must be positive".into(),
            });
        }
        if self.boundaries.density <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "boundaries.density",
                reason: "edge density must be positive".into(),
            });
        }

        let fuel = self.sources.fusion.deuterium_fraction + self.sources.fusion.tritium_fraction;
        if self.sources.fusion.enabled && fuel <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "sources.fusion.deuterium_fraction/tritium_fraction",
                reason: "fuel fractions sum to zero".into(),
            });
        }

        if self.time.end <= self.time.start {
            return Err(ConfigError::Inconsistent {
                keys: "time.start/time.end",
                reason: format!("end ({}) must exceed start ({})", self.time.end, self.time.start),
            });
        }
        if self.time.initial_dt <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "time.initial_dt",
                reason: "must be positive".into(),
            });
        }
        if let Some(adaptive) = &self.time.adaptive {
            if adaptive.min_dt >= adaptive.max_dt {
                return Err(ConfigError::Inconsistent {
                    keys: "time.adaptive.min_dt/max_dt",
                    reason: "min_dt must be smaller than max_dt".into(),
                });
            }
            if !(adaptive.safety_factor > 0.0 && adaptive.safety_factor <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    key: "time.adaptive.safety_factor",
                    reason: "must lie in (0, 1]".into(),
                });
            }
            let clamped = self.time.initial_dt.clamp(adaptive.min_dt, adaptive.max_dt);
            if (clamped - self.time.initial_dt).abs() > 0.0 {
                log::warn!(
                    "time.initial_dt = {} outside [{}, {}], clamped to {}",
                    self.time.initial_dt,
                    adaptive.min_dt,
                    adaptive.max_dt,
                    clamped,
                );
                self.time.initial_dt = clamped;
            }
        }

        if self.evolution.current && !self.sources.ohmic.enabled {
            return Err(ConfigError::Inconsistent {
                keys: "evolution.current/sources.ohmic",
                reason: "current diffusion requires the ohmic model (resistivity)".into(),
            });
        }

        if self.composition.z_eff < 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "composition.z_eff",
                reason: "Z_eff below 1 is unphysical".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.composition.dilution) {
            return Err(ConfigError::InvalidValue {
                key: "composition.dilution",
                reason: "must lie in [0, 1]".into(),
            });
        }

        if self.mhd.sawtooth_enabled {
            let sawtooth = &self.mhd.sawtooth;
            if !(0.0..=1.0).contains(&sawtooth.inversion_radius) {
                return Err(ConfigError::InvalidValue {
                    key: "mhd.sawtooth.inversion_radius",
                    reason: "must lie in [0, 1] (normalized radius)".into(),
                });
            }
            if sawtooth.min_interval < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "mhd.sawtooth.min_interval",
                    reason: "must be non-negative".into(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_tree_validates() {
        let mut config = SimulationConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut config = SimulationConfig::default();
        config.time.start = 2.0;
        config.time.end = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Inconsistent { keys: "time.start/time.end", .. })
        ));
    }

    #[test]
    fn current_evolution_requires_ohmic() {
        let mut config = SimulationConfig::default();
        config.evolution.current = true;
        config.sources.ohmic.enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_dt_is_clamped_into_adaptive_range() {
        let mut config = SimulationConfig::default();
        config.time.initial_dt = 100.0;
        config.validate().unwrap();
        assert!((config.time.initial_dt - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_from_toml() {
        let doc = r#"
            [mesh]
            n_cells = 25
            major_radius = 6.2
            minor_radius = 2.0
            toroidal_field = 5.3
            geometry_type = "circular"

            [time]
            start = 0.0
            end = 5.0
            initial_dt = 0.01

            [sources.ecrh]
            enabled = true
            power_mw = 20.0
        "#;
        let mut config: SimulationConfig = toml::from_str(doc).unwrap();
        config.validate().unwrap();
        assert_eq!(config.mesh.n_cells, 25);
        assert!(config.sources.ecrh.enabled);
        assert!((config.sources.ecrh.power_mw - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_fuel_fraction_is_rejected() {
        let mut config = SimulationConfig::default();
        config.sources.fusion.enabled = true;
        config.sources.fusion.deuterium_fraction = 0.0;
        config.sources.fusion.tritium_fraction = 0.0;
        assert!(config.validate().is_err());
    }
}
