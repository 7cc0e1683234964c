//! Cell-to-face interpolation and the Patankar power-law weight.
//!
//! Face `j` sits between cells `j−1` and `j`; boundary faces inherit the
//! adjacent cell value (no extrapolation). The harmonic mean is computed as
//! `2/(1/a + 1/b)` — the algebraically equivalent `2ab/(a+b)` overflows for
//! products of large magnitudes (nₑ·χ reaches 10²⁰) and is rejected by a
//! regression test.

use ndarray::Array1;

use trident_common::consts::{HARMONIC_EPS, PECLET_UPWIND_LIMIT};
use trident_tensor::{Var, concat};

/// Harmonic face interpolation of a cell array (`nCells` → `nCells+1`).
pub fn harmonic_face(cell: &Array1<f64>) -> Array1<f64> {
    let n = cell.len();
    let mut face = Array1::zeros(n + 1);
    face[0] = cell[0];
    face[n] = cell[n - 1];
    for j in 1..n {
        let left = 1.0 / (cell[j - 1] + HARMONIC_EPS);
        let right = 1.0 / (cell[j] + HARMONIC_EPS);
        face[j] = 2.0 / (left + right);
    }
    face
}

/// Arithmetic face interpolation of a cell array (`nCells` → `nCells+1`).
pub fn arithmetic_face(cell: &Array1<f64>) -> Array1<f64> {
    let n = cell.len();
    let mut face = Array1::zeros(n + 1);
    face[0] = cell[0];
    face[n] = cell[n - 1];
    for j in 1..n {
        face[j] = 0.5 * (cell[j - 1] + cell[j]);
    }
    face
}

/// The Patankar power-law weight `α(Pe) = max(0, (1 − 0.1·|Pe|))⁵`.
///
/// `α(0) = 1` (central differencing), `α = 0` beyond `|Pe| = 10` (full
/// upwinding), monotone non-increasing in `|Pe|`.
pub fn power_law_alpha(peclet: f64) -> f64 {
    if peclet.abs() >= PECLET_UPWIND_LIMIT {
        return 0.0;
    }
    (1.0 - 0.1 * peclet.abs()).max(0.0).powi(5)
}

/// Tape-variable harmonic face interpolation.
pub(crate) fn harmonic_face_var<'tape>(cell: Var<'tape>) -> Var<'tape> {
    let n = cell.len();
    let left = 1.0 / (cell.slice(0..n - 1) + HARMONIC_EPS);
    let right = 1.0 / (cell.slice(1..n) + HARMONIC_EPS);
    let interior = 2.0 / (left + right);
    concat(&[cell.slice(0..1), interior, cell.slice(n - 1..n)])
}

/// Tape-variable arithmetic face interpolation.
pub(crate) fn arithmetic_face_var<'tape>(cell: Var<'tape>) -> Var<'tape> {
    let n = cell.len();
    let interior = (cell.slice(0..n - 1) + cell.slice(1..n)) * 0.5;
    concat(&[cell.slice(0..1), interior, cell.slice(n - 1..n)])
}

/// Tape-variable power-law weight on faces, from face velocity and
/// diffusivity variables.
pub(crate) fn power_law_alpha_var<'tape>(
    v_face: Var<'tape>,
    d_face: Var<'tape>,
    dx: f64,
) -> Var<'tape> {
    let peclet = v_face * dx / (d_face + HARMONIC_EPS);
    (1.0 - peclet.abs() * 0.1).maximum(0.0).powi(5)
}

/// Tape-variable power-law face value of the transported scalar on
/// *interior* faces: `α·central + (1−α)·upwind`, with the upwind cell
/// selected by the sign of the face velocity.
pub(crate) fn power_law_face_value_var<'tape>(
    cell: Var<'tape>,
    v_interior: Var<'tape>,
    d_interior: Var<'tape>,
    dx: f64,
) -> Var<'tape> {
    let n = cell.len();
    let left = cell.slice(0..n - 1);
    let right = cell.slice(1..n);
    let central = (left + right) * 0.5;

    // Positive face velocity transports from the left cell.
    let mask = v_interior
        .value()
        .mapv(|value| if value > 0.0 { 1.0 } else { 0.0 });
    let upwind = trident_tensor::select(&mask, left, right);

    let alpha = power_law_alpha_var(v_interior, d_interior, dx);
    alpha * central + (1.0 - alpha) * upwind
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn harmonic_of_equal_values_is_identity() {
        let cell = Array1::from_elem(10, 3.7);
        let face = harmonic_face(&cell);
        for value in &face {
            assert_relative_eq!(*value, 3.7, max_relative = 1e-12);
        }
    }

    #[test]
    fn harmonic_stays_finite_across_forty_decades() {
        let cell = arr1(&[1e-30, 1e40, 1e20, 1e-30]);
        let face = harmonic_face(&cell);
        for value in &face {
            assert!(value.is_finite(), "harmonic face overflowed: {value}");
        }
        // The mean of wildly different magnitudes hugs the smaller one.
        assert!(face[1] < 1e-29);
    }

    #[test]
    fn large_uniform_density_survives_interpolation() {
        // A float32-style `2ab/(a+b)` would overflow at a·b = 1e40.
        let cell = Array1::from_elem(50, 1e20);
        let face = harmonic_face(&cell);
        for value in &face {
            assert!(value.is_finite());
            assert_relative_eq!(*value, 1e20, max_relative = 1e-9);
        }
    }

    #[test]
    fn boundary_faces_copy_the_adjacent_cell() {
        let cell = arr1(&[1.0, 2.0, 3.0]);
        let harmonic = harmonic_face(&cell);
        let arithmetic = arithmetic_face(&cell);
        assert_relative_eq!(harmonic[0], 1.0);
        assert_relative_eq!(harmonic[3], 3.0);
        assert_relative_eq!(arithmetic[0], 1.0);
        assert_relative_eq!(arithmetic[3], 3.0);
    }

    #[test]
    fn alpha_properties() {
        assert_relative_eq!(power_law_alpha(0.0), 1.0);
        assert_relative_eq!(power_law_alpha(10.0), 0.0);
        assert_relative_eq!(power_law_alpha(-10.0), 0.0);
        assert_relative_eq!(power_law_alpha(1e6), 0.0);

        let mut previous = 1.0;
        let mut peclet = 0.0;
        while peclet <= 12.0 {
            let alpha = power_law_alpha(peclet);
            assert!((0.0..=1.0).contains(&alpha));
            assert!(alpha <= previous + 1e-15, "α must not increase with |Pe|");
            previous = alpha;
            peclet += 0.05;
        }
    }

    #[test]
    fn alpha_is_symmetric_in_peclet_sign() {
        for peclet in [0.5, 2.5, 7.0] {
            assert_relative_eq!(power_law_alpha(peclet), power_law_alpha(-peclet));
        }
    }

    #[test]
    fn pure_convection_face_value_is_upwind() {
        use trident_tensor::Tape;
        let tape = Tape::new();
        let cell = tape.leaf(arr1(&[1.0, 2.0, 4.0]));
        // Two interior faces; strong positive velocity, vanishing D.
        let v = tape.leaf(arr1(&[3.0, 3.0]));
        let d = tape.leaf(arr1(&[1e-12, 1e-12]));
        let value = power_law_face_value_var(cell, v, d, 0.1).value();
        assert_relative_eq!(value[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(value[1], 2.0, max_relative = 1e-12);

        // Reversed flow selects the right cell.
        let v = tape.leaf(arr1(&[-3.0, -3.0]));
        let d = tape.leaf(arr1(&[1e-12, 1e-12]));
        let value = power_law_face_value_var(cell, v, d, 0.1).value();
        assert_relative_eq!(value[0], 2.0, max_relative = 1e-12);
        assert_relative_eq!(value[1], 4.0, max_relative = 1e-12);
    }

    #[test]
    fn var_interpolations_match_plain_versions() {
        use trident_tensor::Tape;
        let values = arr1(&[1.0, 5.0, 2.0, 8.0, 3.0]);
        let tape = Tape::new();
        let var = tape.leaf(values.clone());

        let harmonic = harmonic_face_var(var).value();
        let expected = harmonic_face(&values);
        for j in 0..6 {
            assert_relative_eq!(harmonic[j], expected[j], max_relative = 1e-12);
        }

        let arithmetic = arithmetic_face_var(var).value();
        let expected = arithmetic_face(&values);
        for j in 0..6 {
            assert_relative_eq!(arithmetic[j], expected[j], max_relative = 1e-12);
        }
    }
}
