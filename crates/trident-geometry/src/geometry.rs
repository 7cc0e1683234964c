//! Cylindrical-approximation geometry built from mesh and device
//! parameters.

use ndarray::Array1;
use std::f64::consts::TAU;

use crate::Mesh;
use crate::{GeometryError, Result};

/// Geometry of the device in the cylindrical approximation.
///
/// Faces carry the constant area `A = 2π R0` and cells the constant volume
/// `V = 2π R0·Δr` (the large-aspect-ratio straightened-column form), so the
/// discrete compatibility `V_i = A·Δr` holds exactly on the uniform mesh.
/// Metric factors are carried on faces; cell-centered values are arithmetic
/// averages of the adjacent faces.
pub struct Geometry {
    /// The radial mesh.
    mesh: Mesh,
    /// Major radius `R0` **in \[m\]**.
    major_radius: f64,
    /// Toroidal field on axis `Bφ` **in \[T\]**.
    toroidal_field: f64,
    /// Cell volumes **in \[m³\]**.
    volumes: Array1<f64>,
    /// Face areas **in \[m²\]**.
    face_areas: Array1<f64>,
    /// Distances between adjacent cell centers **in \[m\]**.
    cell_distances: Array1<f64>,
    /// Jacobian metric factor `g0 = ∂V/∂r` on faces.
    g0_face: Array1<f64>,
    /// Metric factor `g1 = ⟨(∇r)²⟩` on faces.
    g1_face: Array1<f64>,
    /// Metric factor `g2 = ⟨(∇r)²/R²⟩` on faces.
    g2_face: Array1<f64>,
}

impl Geometry {
    /// Assembles a geometry from raw arrays, enforcing the shape
    /// invariants: face arrays of length `nCells + 1`, cell arrays of
    /// length `nCells`.
    pub fn from_arrays(
        mesh: Mesh,
        major_radius: f64,
        toroidal_field: f64,
        volumes: Array1<f64>,
        face_areas: Array1<f64>,
        cell_distances: Array1<f64>,
        g0_face: Array1<f64>,
        g1_face: Array1<f64>,
        g2_face: Array1<f64>,
    ) -> Result<Self> {
        let n_cells = mesh.n_cells();
        let n_faces = mesh.n_faces();

        check_length("volumes", &volumes, n_cells)?;
        check_length("face_areas", &face_areas, n_faces)?;
        check_length("cell_distances", &cell_distances, n_cells - 1)?;
        check_length("g0_face", &g0_face, n_faces)?;
        check_length("g1_face", &g1_face, n_faces)?;
        check_length("g2_face", &g2_face, n_faces)?;

        Ok(Self {
            mesh,
            major_radius,
            toroidal_field,
            volumes,
            face_areas,
            cell_distances,
            g0_face,
            g1_face,
            g2_face,
        })
    }

    /// The radial mesh.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Major radius `R0` **in \[m\]**.
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    /// Minor radius `a` **in \[m\]**.
    pub fn minor_radius(&self) -> f64 {
        self.mesh.minor_radius()
    }

    /// Toroidal field on axis `Bφ` **in \[T\]**.
    pub fn toroidal_field(&self) -> f64 {
        self.toroidal_field
    }

    /// Cell volumes **in \[m³\]**.
    pub fn volumes(&self) -> &Array1<f64> {
        &self.volumes
    }

    /// Total plasma volume **in \[m³\]**.
    pub fn total_volume(&self) -> f64 {
        self.volumes.sum()
    }

    /// Face areas **in \[m²\]**.
    pub fn face_areas(&self) -> &Array1<f64> {
        &self.face_areas
    }

    /// Distances between adjacent cell centers **in \[m\]**.
    pub fn cell_distances(&self) -> &Array1<f64> {
        &self.cell_distances
    }

    /// Jacobian metric factor `g0` on faces.
    pub fn g0_face(&self) -> &Array1<f64> {
        &self.g0_face
    }

    /// Metric factor `g1` on faces.
    pub fn g1_face(&self) -> &Array1<f64> {
        &self.g1_face
    }

    /// Metric factor `g2` on faces.
    pub fn g2_face(&self) -> &Array1<f64> {
        &self.g2_face
    }

    /// Cell-centered `g0`, by arithmetic averaging of the adjacent faces.
    pub fn g0_cell(&self) -> Array1<f64> {
        face_to_cell_average(&self.g0_face)
    }

    /// Cell-centered `g1`, by arithmetic averaging of the adjacent faces.
    pub fn g1_cell(&self) -> Array1<f64> {
        face_to_cell_average(&self.g1_face)
    }

    /// Cell-centered `g2`, by arithmetic averaging of the adjacent faces.
    pub fn g2_cell(&self) -> Array1<f64> {
        face_to_cell_average(&self.g2_face)
    }

    /// Cell-center radii **in \[m\]**.
    pub fn cell_radii(&self) -> Array1<f64> {
        self.mesh.cell_radii()
    }

    /// Face radii **in \[m\]**.
    pub fn face_radii(&self) -> Array1<f64> {
        self.mesh.face_radii()
    }

    /// Inverse aspect ratio `ε = r/R0` on cells, clamped below
    /// [`trident_common::consts::EPSILON_MAX`].
    pub fn inverse_aspect_ratio(&self) -> Array1<f64> {
        let max = trident_common::consts::EPSILON_MAX;
        self.mesh
            .cell_radii()
            .mapv(|r| (r / self.major_radius).min(max))
    }

    /// Volume average `⟨x⟩ = ∫x dV / ∫dV` of a cell array.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not a cell array.
    pub fn volume_average(&self, x: &Array1<f64>) -> f64 {
        assert_eq!(x.len(), self.mesh.n_cells(), "volume_average needs a cell array");
        (x * &self.volumes).sum() / self.total_volume()
    }

    /// Volume integral `∫x dV` of a cell array.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not a cell array.
    pub fn volume_integral(&self, x: &Array1<f64>) -> f64 {
        assert_eq!(x.len(), self.mesh.n_cells(), "volume_integral needs a cell array");
        (x * &self.volumes).sum()
    }
}

impl std::fmt::Debug for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geometry")
            .field("n_cells", &self.mesh.n_cells())
            .field("R0 [m]", &format!("{:.4}", self.major_radius))
            .field("a [m]", &format!("{:.4}", self.minor_radius()))
            .field("Bφ [T]", &format!("{:.4}", self.toroidal_field))
            .field("V [m³]", &format!("{:.4}", self.total_volume()))
            .finish()
    }
}

/// Builder for the circular (cylindrical-approximation) geometry.
#[derive(Debug, Clone)]
pub struct CircularGeometryBuilder {
    /// Number of radial cells.
    n_cells: usize,
    /// Major radius `R0` **in \[m\]**.
    major_radius: f64,
    /// Minor radius `a` **in \[m\]**.
    minor_radius: f64,
    /// Toroidal field on axis `Bφ` **in \[T\]**.
    toroidal_field: f64,
}

impl CircularGeometryBuilder {
    /// Creates a builder from device parameters.
    pub fn new(n_cells: usize, major_radius: f64, minor_radius: f64, toroidal_field: f64) -> Self {
        Self {
            n_cells,
            major_radius,
            minor_radius,
            toroidal_field,
        }
    }

    /// Builds the [`Geometry`].
    pub fn build(&self) -> Result<Geometry> {
        if self.major_radius <= self.minor_radius {
            return Err(GeometryError::InvalidParameter {
                name: "major_radius",
                reason: format!(
                    "aspect ratio must exceed 1 (R0 = {}, a = {})",
                    self.major_radius, self.minor_radius
                ),
            });
        }
        if self.toroidal_field.abs() < f64::MIN_POSITIVE || !self.toroidal_field.is_finite() {
            return Err(GeometryError::InvalidParameter {
                name: "toroidal_field",
                reason: format!("must be finite and non-zero, got {}", self.toroidal_field),
            });
        }

        let mesh = Mesh::new(self.n_cells, self.minor_radius)?;
        let dr = mesh.dr();
        let r0 = self.major_radius;

        // A = 2π R0 on every face, V_i = A·Δr.
        let face_areas = Array1::from_elem(mesh.n_faces(), TAU * r0);
        let volumes = Array1::from_elem(mesh.n_cells(), TAU * r0 * dr);
        let cell_distances = Array1::from_elem(mesh.n_cells() - 1, dr);

        let g0_face = face_areas.clone();
        let g1_face = Array1::ones(mesh.n_faces());
        let g2_face = Array1::from_elem(mesh.n_faces(), 1.0 / (r0 * r0));

        Geometry::from_arrays(
            mesh,
            r0,
            self.toroidal_field,
            volumes,
            face_areas,
            cell_distances,
            g0_face,
            g1_face,
            g2_face,
        )
    }
}

/// Central-difference radial gradient of a cell array on the uniform mesh,
/// with one-sided differences at both ends.
pub fn radial_gradient(values: &Array1<f64>, dr: f64) -> Array1<f64> {
    let n = values.len();
    let mut gradient = Array1::zeros(n);
    if n < 2 {
        return gradient;
    }
    gradient[0] = (values[1] - values[0]) / dr;
    gradient[n - 1] = (values[n - 1] - values[n - 2]) / dr;
    for i in 1..n - 1 {
        gradient[i] = (values[i + 1] - values[i - 1]) / (2.0 * dr);
    }
    gradient
}

/// Arithmetic face-to-cell averaging.
fn face_to_cell_average(face: &Array1<f64>) -> Array1<f64> {
    let n_cells = face.len() - 1;
    Array1::from_shape_fn(n_cells, |i| 0.5 * (face[i] + face[i + 1]))
}

/// Length check helper producing [`GeometryError::ShapeMismatch`].
fn check_length(name: &'static str, array: &Array1<f64>, expected: usize) -> Result<()> {
    if array.len() != expected {
        return Err(GeometryError::ShapeMismatch {
            name,
            expected,
            got: array.len(),
        });
    }
    Ok(())
}
