//! Tape-variable calculus on the uniform mesh.

use trident_common::consts::MU_0;
use trident_geometry::Geometry;
use trident_tensor::{Tape, Var, concat};

/// Central-difference radial gradient of a cell-array variable, with
/// one-sided differences at both ends. Mirrors
/// [`trident_geometry::radial_gradient`] for recorded variables.
///
/// # Panics
///
/// Panics for arrays shorter than two cells.
pub fn radial_gradient_var<'tape>(x: Var<'tape>, dr: f64) -> Var<'tape> {
    let n = x.len();
    assert!(n >= 2, "gradient needs at least two cells");

    let first = (x.slice(1..2) - x.slice(0..1)) * (1.0 / dr);
    let interior = (x.slice(2..n) - x.slice(0..n - 2)) * (1.0 / (2.0 * dr));
    let last = (x.slice(n - 1..n) - x.slice(n - 2..n - 1)) * (1.0 / dr);
    concat(&[first, interior, last])
}

/// Tape-variable toroidal current density from the flux profile, via
/// Ampère's law: `j = (1/(μ0·r))·∂(r·B_θ)/∂r` with `B_θ = (1/r)·∂ψ/∂r`.
/// Mirrors [`trident_geometry::current_density`] for recorded variables.
pub fn current_density_var<'tape>(
    tape: &'tape Tape,
    geometry: &Geometry,
    psi: Var<'tape>,
) -> Var<'tape> {
    let dr = geometry.mesh().dr();
    let radii = tape.constant(geometry.cell_radii());
    let b_theta = radial_gradient_var(psi, dr) / radii;
    let r_b_theta = radii * b_theta;
    radial_gradient_var(r_b_theta, dr) / (radii * MU_0)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use trident_geometry::radial_gradient;

    #[test]
    fn matches_plain_gradient() {
        let dr = 0.1;
        let values = Array1::from_shape_fn(12, |i| (i as f64 * dr).sin());
        let expected = radial_gradient(&values, dr);

        let tape = Tape::new();
        let var = tape.leaf(values);
        let gradient = radial_gradient_var(var, dr).value();

        for i in 0..12 {
            assert_relative_eq!(gradient[i], expected[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn current_density_matches_plain_version() {
        let geometry = trident_geometry::CircularGeometryBuilder::new(16, 3.0, 1.0, 5.0)
            .build()
            .unwrap();
        let psi = geometry.cell_radii().mapv(|r| 0.4 * r * r);
        let expected = trident_geometry::current_density(&geometry, &psi).unwrap();

        let tape = Tape::new();
        let psi_var = tape.leaf(psi);
        let j = current_density_var(&tape, &geometry, psi_var).value();
        for i in 0..16 {
            assert_relative_eq!(j[i], expected[i], max_relative = 1e-10);
        }
    }

    #[test]
    fn gradient_is_differentiable() {
        // d(sum of gradient)/dx must match the finite-difference row sums.
        let dr = 0.5;
        let x = Array1::from_vec(vec![1.0, 3.0, 2.0, 5.0]);
        let (_, grad) = trident_tensor::vjp(
            |_tape, input| radial_gradient_var(input, dr).sum(),
            &x,
            &ndarray::arr1(&[1.0]),
        );
        // Sum of gradient telescopes: only the end stencils survive.
        // g0 = (x1-x0)/dr, g1 = (x2-x0)/2dr, g2 = (x3-x1)/2dr, g3 = (x3-x2)/dr
        assert_relative_eq!(grad[0], -1.0 / dr - 1.0 / (2.0 * dr));
        assert_relative_eq!(grad[1], 1.0 / dr - 1.0 / (2.0 * dr));
        assert_relative_eq!(grad[2], 1.0 / (2.0 * dr) - 1.0 / dr);
        assert_relative_eq!(grad[3], 1.0 / (2.0 * dr) + 1.0 / dr);
    }
}
