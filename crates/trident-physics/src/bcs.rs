//! Boundary constraints of the evolved fields.

use trident_common::{BoundariesConfig, BoundaryKind};

/// A single boundary constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    /// Dirichlet: fixed value at the boundary face.
    Value(f64),
    /// Neumann: fixed gradient at the boundary face.
    Gradient(f64),
}

/// The `(left, right)` constraint pair of one field. Left is the magnetic
/// axis, right the plasma edge.
#[derive(Debug, Clone, Copy)]
pub struct FieldBoundary {
    /// Axis-side constraint; usually symmetric (`Gradient(0)`).
    pub left: BoundaryCondition,
    /// Edge-side constraint; usually a physical value.
    pub right: BoundaryCondition,
}

impl FieldBoundary {
    /// Symmetric axis, fixed edge value.
    pub fn symmetric_with_edge_value(value: f64) -> Self {
        Self {
            left: BoundaryCondition::Gradient(0.0),
            right: BoundaryCondition::Value(value),
        }
    }

    /// Symmetric axis, fixed edge gradient.
    pub fn symmetric_with_edge_gradient(gradient: f64) -> Self {
        Self {
            left: BoundaryCondition::Gradient(0.0),
            right: BoundaryCondition::Gradient(gradient),
        }
    }
}

/// Boundary constraints for all four fields. Always present; there is no
/// "unconstrained" state.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryConditions {
    /// Ion temperature **in \[eV\]**.
    pub ti: FieldBoundary,
    /// Electron temperature **in \[eV\]**.
    pub te: FieldBoundary,
    /// Electron density **in \[m⁻³\]**.
    pub ne: FieldBoundary,
    /// Poloidal flux **in \[Wb\]**.
    pub psi: FieldBoundary,
}

impl BoundaryConditions {
    /// Builds the boundary set from configuration. The flux edge condition
    /// is a gradient `∂ψ/∂r|_a = a·B_θ(a)` carrying the total plasma
    /// current; the caller computes it from geometry and `I_p`.
    pub fn from_config(config: &BoundariesConfig, psi_edge_gradient: f64) -> Self {
        let field = |value: f64| match config.kind {
            BoundaryKind::Dirichlet => FieldBoundary::symmetric_with_edge_value(value),
            // A Neumann edge pins the gradient to zero (insulated edge).
            BoundaryKind::Neumann => FieldBoundary::symmetric_with_edge_gradient(0.0),
        };
        Self {
            ti: field(config.ion_temperature),
            te: field(config.electron_temperature),
            ne: field(config.density),
            psi: FieldBoundary::symmetric_with_edge_gradient(psi_edge_gradient),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dirichlet_config_pins_edge_values() {
        let config = BoundariesConfig::default();
        let bcs = BoundaryConditions::from_config(&config, 2.5);
        assert_eq!(bcs.ti.left, BoundaryCondition::Gradient(0.0));
        assert_eq!(bcs.ti.right, BoundaryCondition::Value(config.ion_temperature));
        assert_eq!(bcs.psi.right, BoundaryCondition::Gradient(2.5));
    }

    #[test]
    fn neumann_config_pins_edge_gradients() {
        let config = BoundariesConfig {
            kind: BoundaryKind::Neumann,
            ..BoundariesConfig::default()
        };
        let bcs = BoundaryConditions::from_config(&config, 0.0);
        assert_eq!(bcs.ne.right, BoundaryCondition::Gradient(0.0));
    }
}
