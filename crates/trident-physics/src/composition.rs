//! Plasma composition and collisional helpers.

use trident_common::CompositionConfig;
use trident_common::consts::ATOMIC_MASS;
use trident_tensor::Var;

use crate::{PhysicsError, Result};

/// Clamp range of the Coulomb logarithm.
const COULOMB_LOG_MIN: f64 = 5.0;
/// Clamp range of the Coulomb logarithm.
const COULOMB_LOG_MAX: f64 = 20.0;

/// Main-ion species and effective charge, shared by the collisional models.
#[derive(Debug, Clone)]
pub struct PlasmaComposition {
    /// Main-ion mass **in \[kg\]**.
    main_ion_mass: f64,
    /// Main-ion charge number.
    main_ion_charge: f64,
    /// Effective charge `Z_eff`.
    z_eff: f64,
    /// Fuel dilution `nᵢ/nₑ`.
    dilution: f64,
}

impl PlasmaComposition {
    /// Builds a composition from its configuration section.
    pub fn from_config(config: &CompositionConfig) -> Result<Self> {
        if config.main_ion_mass <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "composition",
                name: "main_ion_mass",
                reason: "must be positive".into(),
            });
        }
        if config.z_eff < 1.0 {
            return Err(PhysicsError::InvalidParameter {
                model: "composition",
                name: "z_eff",
                reason: format!("Z_eff = {} below 1 is unphysical", config.z_eff),
            });
        }
        if !(0.0..=1.0).contains(&config.dilution) {
            return Err(PhysicsError::InvalidParameter {
                model: "composition",
                name: "dilution",
                reason: "must lie in [0, 1]".into(),
            });
        }
        Ok(Self {
            main_ion_mass: config.main_ion_mass * ATOMIC_MASS,
            main_ion_charge: config.main_ion_charge,
            z_eff: config.z_eff,
            dilution: config.dilution,
        })
    }

    /// Main-ion mass **in \[kg\]**.
    pub fn main_ion_mass(&self) -> f64 {
        self.main_ion_mass
    }

    /// Main-ion charge number.
    pub fn main_ion_charge(&self) -> f64 {
        self.main_ion_charge
    }

    /// Effective charge `Z_eff`.
    pub fn z_eff(&self) -> f64 {
        self.z_eff
    }

    /// Fuel dilution `nᵢ/nₑ`.
    pub fn dilution(&self) -> f64 {
        self.dilution
    }
}

impl Default for PlasmaComposition {
    fn default() -> Self {
        Self::from_config(&CompositionConfig::default())
            .expect("default composition config is valid")
    }
}

/// Electron–ion Coulomb logarithm `lnΛ = 24 − ln(√nₑ[cm⁻³]/Tₑ[eV])`,
/// clamped to a plausible range.
pub fn coulomb_log_ei(ne: f64, te: f64) -> f64 {
    let value = 24.0 - ((ne * 1e-6).sqrt() / te).ln();
    value.clamp(COULOMB_LOG_MIN, COULOMB_LOG_MAX)
}

/// Tape-variable variant of [`coulomb_log_ei`], used inside the Newton
/// residual.
pub fn coulomb_log_ei_var<'tape>(ne: Var<'tape>, te: Var<'tape>) -> Var<'tape> {
    let value = 24.0 - ((ne * 1e-6).sqrt() / te).ln();
    value.clamp(COULOMB_LOG_MIN, COULOMB_LOG_MAX)
}
