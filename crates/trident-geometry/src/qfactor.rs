//! Magnetic quantities derived from the poloidal flux.
//!
//! The flux lives on cells like every evolved field. `B_θ = (1/r)·∂ψ/∂r`,
//! `q = r·Bφ / (R0·B_θ)`, `ŝ = (r/q)·dq/dr`, and the current density comes
//! from Ampère's law, `j = (1/(μ0·r))·∂(r·B_θ)/∂r`.

use ndarray::Array1;

use trident_common::consts::{MU_0, Q_MAX, Q_MIN, SHEAR_MAX};

use crate::geometry::radial_gradient;
use crate::{Geometry, GeometryError, Result};

/// Checks that `psi` is a cell array of the geometry's mesh.
fn check_cell_array(geometry: &Geometry, psi: &Array1<f64>) -> Result<()> {
    let expected = geometry.mesh().n_cells();
    if psi.len() != expected {
        return Err(GeometryError::ShapeMismatch {
            name: "psi",
            expected,
            got: psi.len(),
        });
    }
    Ok(())
}

/// Cell-centered poloidal field `B_θ(r)` **in \[T\]** from the flux profile.
pub fn poloidal_field(geometry: &Geometry, psi: &Array1<f64>) -> Result<Array1<f64>> {
    check_cell_array(geometry, psi)?;
    let dpsi_dr = radial_gradient(psi, geometry.mesh().dr());
    let radii = geometry.cell_radii();
    Ok(&dpsi_dr / &radii)
}

/// Cell-centered safety factor `q(r)`, clamped to `[Q_MIN, Q_MAX]` to keep
/// the ratio finite near vanishing poloidal field.
pub fn safety_factor(geometry: &Geometry, psi: &Array1<f64>) -> Result<Array1<f64>> {
    let b_theta = poloidal_field(geometry, psi)?;
    let radii = geometry.cell_radii();
    let b_phi = geometry.toroidal_field();
    let r0 = geometry.major_radius();

    Ok(Array1::from_shape_fn(radii.len(), |i| {
        let denominator = r0 * b_theta[i];
        if denominator.abs() < f64::MIN_POSITIVE {
            Q_MAX
        } else {
            (radii[i] * b_phi / denominator).abs().clamp(Q_MIN, Q_MAX)
        }
    }))
}

/// Cell-centered magnetic shear `ŝ = (r/q)·dq/dr`, clamped to
/// `[−SHEAR_MAX, SHEAR_MAX]`.
pub fn magnetic_shear(geometry: &Geometry, q: &Array1<f64>) -> Result<Array1<f64>> {
    check_cell_array(geometry, q)?;
    let dq_dr = radial_gradient(q, geometry.mesh().dr());
    let radii = geometry.cell_radii();
    Ok(Array1::from_shape_fn(q.len(), |i| {
        (radii[i] / q[i] * dq_dr[i]).clamp(-SHEAR_MAX, SHEAR_MAX)
    }))
}

/// Cell-centered toroidal current density `j(r)` **in \[A/m²\]** from the
/// flux profile, via Ampère's law.
pub fn current_density(geometry: &Geometry, psi: &Array1<f64>) -> Result<Array1<f64>> {
    let b_theta = poloidal_field(geometry, psi)?;
    let radii = geometry.cell_radii();
    let r_b_theta = &radii * &b_theta;
    let gradient = radial_gradient(&r_b_theta, geometry.mesh().dr());
    Ok(Array1::from_shape_fn(radii.len(), |i| {
        gradient[i] / (MU_0 * radii[i])
    }))
}
