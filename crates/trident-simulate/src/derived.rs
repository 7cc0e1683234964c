//! Scalar diagnostics derived from state, geometry and the source ledger.

use trident_common::consts::{EV_TO_J, MU_0};
use trident_geometry::{Geometry, poloidal_field, safety_factor};
use trident_physics::{
    CoreProfiles, PlasmaComposition, SourceCategory, SourceMetadataCollection,
};

use crate::Result;

/// Floor of the loss-power denominator **in \[W\]**.
const P_LOSS_FLOOR: f64 = 1e5;

/// Floor of the plasma current in the β_N denominator **in \[MA\]**.
const I_P_FLOOR_MA: f64 = 0.1;

/// Clamp range of the fusion gain.
const Q_FUSION_MAX: f64 = 100.0;

/// Scalar diagnostics of one state.
#[derive(Debug, Clone, Default)]
pub struct DerivedQuantities {
    /// Central ion temperature **in \[eV\]**.
    pub ti0: f64,
    /// Central electron temperature **in \[eV\]**.
    pub te0: f64,
    /// Central electron density **in \[m⁻³\]**.
    pub ne0: f64,
    /// Volume-averaged electron density **in \[m⁻³\]**.
    pub ne_avg: f64,
    /// On-axis safety factor.
    pub q0: f64,
    /// Edge safety factor.
    pub q_edge: f64,
    /// Thermal stored energy **in \[MJ\]**.
    pub w_thermal_mj: f64,
    /// Energy confinement time **in \[s\]**.
    pub tau_e: f64,
    /// H-factor against the ITER98y2 scaling.
    pub h98: f64,
    /// Toroidal beta **in \[%\]**.
    pub beta_t_percent: f64,
    /// Normalized beta.
    pub beta_n: f64,
    /// Plasma current **in \[MA\]**.
    pub i_plasma_ma: f64,
    /// Fusion gain `Q = P_fus/(P_aux + P_ohm)`.
    pub q_fusion: f64,
    /// Total fusion power **in \[MW\]**.
    pub p_fusion_mw: f64,
    /// Alpha heating power **in \[MW\]**.
    pub p_alpha_mw: f64,
    /// Auxiliary heating power **in \[MW\]**.
    pub p_aux_mw: f64,
    /// Ohmic heating power **in \[MW\]**.
    pub p_ohmic_mw: f64,
    /// Radiated power **in \[MW\]**.
    pub p_radiation_mw: f64,
    /// Fusion triple product `nᵢ·⟨Tᵢ⟩·τ_E` **in \[keV·s·m⁻³\]**.
    pub triple_product: f64,
}

/// Computes the diagnostics.
///
/// The power balance reads exclusively from the metadata collection; an
/// empty collection (no registered sources) yields zero powers, a zero
/// fusion gain, and a warning in release builds — the stored energy and
/// the magnetic quantities are state-derived and stay meaningful.
pub fn compute_derived(
    profiles: &CoreProfiles,
    geometry: &Geometry,
    metadata: &SourceMetadataCollection,
    composition: &PlasmaComposition,
) -> Result<DerivedQuantities> {
    // Absent metadata is unrepresentable (the composite always yields a
    // collection); an empty collection is valid and simply carries no
    // power.
    if metadata.is_empty() {
        log::warn!("no source metadata registered; power balance reported as zero");
    }

    let mut derived = DerivedQuantities {
        ti0: profiles.ti()[0],
        te0: profiles.te()[0],
        ne0: profiles.ne()[0],
        ne_avg: geometry.volume_average(profiles.ne()),
        ..DerivedQuantities::default()
    };

    let q = safety_factor(geometry, profiles.psi())?;
    derived.q0 = q[0];
    derived.q_edge = q[q.len() - 1];

    // Thermal energy W = ∫(3/2)·nₑ·(Tᵢ+Tₑ)·e dV.
    let energy_density = profiles
        .total_pressure_ev()
        .mapv(|value| 1.5 * value * EV_TO_J);
    let w_thermal = geometry.volume_integral(&energy_density);
    derived.w_thermal_mj = w_thermal / 1e6;

    // Powers from the ledger, in W.
    let p_fusion = metadata.total_fusion_power();
    let p_alpha = metadata.total_alpha_power();
    let p_aux = metadata.power_by_category(SourceCategory::Auxiliary);
    let p_ohmic = metadata.total_ohmic_power();
    let p_radiation = metadata.total_radiation_power();
    derived.p_fusion_mw = p_fusion / 1e6;
    derived.p_alpha_mw = p_alpha / 1e6;
    derived.p_aux_mw = p_aux / 1e6;
    derived.p_ohmic_mw = p_ohmic / 1e6;
    derived.p_radiation_mw = p_radiation / 1e6;

    // Confinement time with a floored loss power.
    let p_loss = (p_aux + p_ohmic + p_alpha).max(P_LOSS_FLOOR);
    derived.tau_e = w_thermal / p_loss;

    // Plasma current from the edge flux gradient where meaningful, else
    // from the edge safety factor.
    let a = geometry.minor_radius();
    let r0 = geometry.major_radius();
    let b_phi = geometry.toroidal_field().abs();
    let b_theta = poloidal_field(geometry, profiles.psi())?;
    let b_theta_edge = b_theta[b_theta.len() - 1];
    let i_plasma = if b_theta_edge.abs() > 1e-10 {
        std::f64::consts::TAU * a * b_theta_edge.abs() / MU_0
    } else {
        std::f64::consts::TAU * a * a * b_phi / (derived.q_edge * MU_0 * r0)
    };
    derived.i_plasma_ma = i_plasma / 1e6;

    // Beta from the volume-averaged pressure.
    let pressure_avg = geometry.volume_average(&profiles.total_pressure_ev()) * EV_TO_J;
    derived.beta_t_percent = 100.0 * 2.0 * MU_0 * pressure_avg / (b_phi * b_phi);
    let i_p_floored = derived.i_plasma_ma.max(I_P_FLOOR_MA);
    derived.beta_n = derived.beta_t_percent * a * b_phi / i_p_floored;

    // Fusion gain: zero without external heating.
    let p_external = p_aux + p_ohmic;
    derived.q_fusion = if p_external > 0.0 {
        (p_fusion / p_external).clamp(0.0, Q_FUSION_MAX)
    } else {
        0.0
    };

    // ITER98y2 confinement scaling with I_p in MA and κ = 1 in the
    // circular approximation (the κ^0.78 factor drops out).
    let n19 = derived.ne_avg / 1e19;
    let p_loss_mw = p_loss / 1e6;
    let epsilon = a / r0;
    let mass = composition.main_ion_mass() / trident_common::consts::ATOMIC_MASS;
    let tau_98 = 0.0562
        * i_p_floored.powf(0.93)
        * b_phi.powf(0.15)
        * n19.powf(0.41)
        * p_loss_mw.max(0.1).powf(-0.69)
        * r0.powf(1.97)
        * epsilon.powf(0.58)
        * mass.powf(0.19);
    derived.h98 = if tau_98 > 0.0 { derived.tau_e / tau_98 } else { 0.0 };

    // Triple product nᵢ·⟨Tᵢ⟩·τ_E with the ion density from quasi-neutral
    // dilution and ⟨Tᵢ⟩ in keV.
    let ti_avg_kev = geometry.volume_average(profiles.ti()) / 1e3;
    derived.triple_product =
        composition.dilution() * derived.ne_avg * ti_avg_kev * derived.tau_e;

    Ok(derived)
}
