//! Physical constants and solver defaults.
//!
//! All field quantities in TRIDENT are stored and computed in eV, m⁻³, m, s,
//! T, MW/m³ (heating), MA/m² (current) and Wb (flux). Conversions between
//! them go through [`crate::units`]; nothing else in the workspace divides
//! by ad-hoc powers of ten.

// ==================== Physical constants (CODATA 2018)

/// Vacuum permeability `μ0` **in \[H/m\]**.
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Vacuum permittivity `ε0` **in \[F/m\]**.
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Elementary charge `e` **in \[C\]** (exact).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron mass **in \[kg\]**.
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Proton mass **in \[kg\]**.
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// Unified atomic mass unit **in \[kg\]**.
pub const ATOMIC_MASS: f64 = 1.660_539_066_60e-27;

// ==================== Canonical unit bridges

/// One electron-volt **in \[J\]** (exact).
pub const EV_TO_J: f64 = 1.602_176_634e-19;

/// The single MW/m³ → eV/(m³·s) bridge used by the temperature equations.
///
/// Equals `1e6 / EV_TO_J`. Heating sources arrive in MW/m³ and must pass
/// through this constant before entering an equation whose field is in eV.
pub const MW_PER_M3_TO_EV_PER_M3_S: f64 = 6.241_509_074_4e24;

// ==================== Field floors and scales

/// Electron density floor **in \[m⁻³\]**, enforced inside coefficient
/// construction to keep `1/nₑ` terms finite.
pub const DENSITY_FLOOR: f64 = 1e18;

/// Temperature floor **in \[eV\]**, enforced on committed profiles.
pub const TEMPERATURE_FLOOR: f64 = 1.0;

/// Scaling reference for both temperature fields **in \[eV\]**.
pub const TEMPERATURE_SCALE: f64 = 1e3;

/// Scaling reference for the electron density **in \[m⁻³\]**.
pub const DENSITY_SCALE: f64 = 1e20;

/// Scaling reference for the poloidal flux **in \[Wb\]**.
pub const FLUX_SCALE: f64 = 1.0;

/// Floor added to every scaling reference, so that scaling and unscaling
/// are exact inverses even for a zero reference.
pub const MIN_SCALE: f64 = 1e-30;

/// Regularization added inside harmonic face interpolation.
pub const HARMONIC_EPS: f64 = 1e-30;

// ==================== Safety factor clamps

/// Lower clamp of the safety factor `q`.
pub const Q_MIN: f64 = 0.3;

/// Upper clamp of the safety factor `q`.
pub const Q_MAX: f64 = 20.0;

/// Magnetic shear clamp `|ŝ| ≤ SHEAR_MAX`.
pub const SHEAR_MAX: f64 = 5.0;

/// Inverse aspect ratio clamp `ε ≤ EPSILON_MAX` (trapped fraction stays
/// below 1).
pub const EPSILON_MAX: f64 = 0.99;

// ==================== Solver defaults

/// Default Newton–Raphson residual tolerance (scaled coordinates).
pub const NEWTON_TOL: f64 = 1e-6;

/// Default maximum Newton–Raphson iterations per step.
pub const NEWTON_MAX_ITERATIONS: usize = 30;

/// Maximum Δt-halving retries of a single step before the run fails.
pub const MAX_STEP_RETRIES: usize = 8;

/// Exponent `k` of the adaptive step controller `safety·(tol/err)^{1/k}`.
pub const ADAPTIVE_ORDER: f64 = 2.0;

/// Péclet number beyond which the power-law scheme is pure upwind.
pub const PECLET_UPWIND_LIMIT: f64 = 10.0;

/// Maximum rate of progress-callback dispatch **in \[Hz\]**.
pub const PROGRESS_MAX_RATE_HZ: f64 = 10.0;

// ==================== Debug magnitude gates (plausibility ranges)

/// Largest plausible heating magnitude **in \[MW/m³\]**.
pub const MAX_HEATING_MW_PER_M3: f64 = 1e3;

/// Largest plausible particle source **in \[m⁻³/s\]**.
pub const MAX_PARTICLE_SOURCE: f64 = 1e20;

/// Largest plausible current source **in \[MA/m²\]**.
pub const MAX_CURRENT_SOURCE_MA_PER_M2: f64 = 1e2;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mw_bridge_is_inverse_charge() {
        let expected = 1e6 / EV_TO_J;
        assert!((MW_PER_M3_TO_EV_PER_M3_S - expected).abs() / expected < 1e-10);
    }
}
