//! Reverse-mode sweeps: VJP and column-wise Jacobian assembly.

use ndarray::{Array1, Array2};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::Result;
use crate::tape::{BinaryOp, Node, Op, Tape, UnaryOp, Var};

/// Adds `contribution` into an adjoint slot.
fn accumulate(slot: &mut Option<Array1<f64>>, contribution: Array1<f64>) {
    match slot {
        Some(existing) => *existing += &contribution,
        None => *slot = Some(contribution),
    }
}

/// Runs one reverse sweep over `nodes`, seeding `seed` at `output` and
/// returning the accumulated adjoint of `wrt`.
///
/// Adjoint buffers are local to the sweep and freed on return, so repeated
/// sweeps over the same tape (one per Jacobian column) never accumulate
/// graph memory.
fn backward(nodes: &[Node], output: usize, seed: &Array1<f64>, wrt: usize) -> Array1<f64> {
    let mut adjoints: Vec<Option<Array1<f64>>> = vec![None; output + 1];
    adjoints[output] = Some(seed.clone());

    for index in (0..=output).rev() {
        let Some(adjoint) = adjoints[index].take() else {
            continue;
        };
        if index == wrt {
            return adjoint;
        }
        match &nodes[index].op {
            Op::Leaf => {}
            Op::Unary { parent, kind } => {
                let x = &nodes[*parent].value;
                let this = &nodes[index].value;
                let contribution = match kind {
                    UnaryOp::Neg => -&adjoint,
                    UnaryOp::Exp => &adjoint * this,
                    UnaryOp::Ln => &adjoint / x,
                    UnaryOp::Sqrt => &adjoint / &(2.0 * this),
                    UnaryOp::Abs => &adjoint * &x.mapv(f64::signum),
                    UnaryOp::Signum => Array1::zeros(x.len()),
                    UnaryOp::Powi(n) => {
                        if *n == 0 {
                            Array1::zeros(x.len())
                        } else {
                            &adjoint * &x.mapv(|value| f64::from(*n) * value.powi(n - 1))
                        }
                    }
                    UnaryOp::Powf(p) => &adjoint * &x.mapv(|value| p * value.powf(p - 1.0)),
                    UnaryOp::AddScalar(_) => adjoint.clone(),
                    UnaryOp::MulScalar(c) => &adjoint * *c,
                    UnaryOp::ScalarSub(_) => -&adjoint,
                    UnaryOp::ScalarDiv(c) => {
                        &adjoint * &x.mapv(|value| -c / (value * value))
                    }
                    UnaryOp::MaxScalar(c) => {
                        &adjoint * &x.mapv(|value| if value > *c { 1.0 } else { 0.0 })
                    }
                    UnaryOp::MinScalar(c) => {
                        &adjoint * &x.mapv(|value| if value < *c { 1.0 } else { 0.0 })
                    }
                    UnaryOp::Clamp(lo, hi) => {
                        &adjoint * &x.mapv(|value| if value > *lo && value < *hi { 1.0 } else { 0.0 })
                    }
                };
                accumulate(&mut adjoints[*parent], contribution);
            }
            Op::Binary { lhs, rhs, kind } => {
                let a = &nodes[*lhs].value;
                let b = &nodes[*rhs].value;
                let (left, right) = match kind {
                    BinaryOp::Add => (adjoint.clone(), adjoint.clone()),
                    BinaryOp::Sub => (adjoint.clone(), -&adjoint),
                    BinaryOp::Mul => (&adjoint * b, &adjoint * a),
                    BinaryOp::Div => {
                        // value = a / b, so d/db = -value / b.
                        let left = &adjoint / b;
                        let right = -&(&adjoint * &nodes[index].value) / b;
                        (left, right)
                    }
                    BinaryOp::Max => {
                        let mask = ndarray::Zip::from(a)
                            .and(b)
                            .map_collect(|&x, &y| if x >= y { 1.0 } else { 0.0 });
                        (&adjoint * &mask, &adjoint * &mask.mapv(|m| 1.0 - m))
                    }
                    BinaryOp::Min => {
                        let mask = ndarray::Zip::from(a)
                            .and(b)
                            .map_collect(|&x, &y| if x <= y { 1.0 } else { 0.0 });
                        (&adjoint * &mask, &adjoint * &mask.mapv(|m| 1.0 - m))
                    }
                };
                accumulate(&mut adjoints[*lhs], left);
                accumulate(&mut adjoints[*rhs], right);
            }
            Op::Select {
                mask,
                on_true,
                on_false,
            } => {
                accumulate(&mut adjoints[*on_true], &adjoint * mask);
                accumulate(&mut adjoints[*on_false], &adjoint * &mask.mapv(|m| 1.0 - m));
            }
            Op::Slice { parent, start } => {
                let parent_len = nodes[*parent].value.len();
                let mut padded = Array1::zeros(parent_len);
                padded
                    .slice_mut(ndarray::s![*start..*start + adjoint.len()])
                    .assign(&adjoint);
                accumulate(&mut adjoints[*parent], padded);
            }
            Op::Concat { parents } => {
                let mut offset = 0;
                for parent in parents {
                    let parent_len = nodes[*parent].value.len();
                    let piece = adjoint
                        .slice(ndarray::s![offset..offset + parent_len])
                        .to_owned();
                    accumulate(&mut adjoints[*parent], piece);
                    offset += parent_len;
                }
            }
            Op::Sum { parent } => {
                let parent_len = nodes[*parent].value.len();
                accumulate(
                    &mut adjoints[*parent],
                    Array1::from_elem(parent_len, adjoint[0]),
                );
            }
        }
    }

    adjoints[wrt]
        .take()
        .unwrap_or_else(|| Array1::zeros(nodes[wrt].value.len()))
}

/// Reverse-mode vector-Jacobian product.
///
/// Runs `function` on a fresh tape with `x` as the single input leaf and
/// pulls the cotangent `w` back to the input: returns
/// `(f(x), wᵀ·∂f/∂x)`. The tape is dropped before returning (evaluation
/// barrier).
///
/// # Panics
///
/// Panics if the cotangent length differs from the output length.
pub fn vjp<F>(function: F, x: &Array1<f64>, cotangent: &Array1<f64>) -> (Array1<f64>, Array1<f64>)
where
    F: for<'tape> Fn(&'tape Tape, Var<'tape>) -> Var<'tape>,
{
    let tape = Tape::new();
    let input = tape.leaf(x.clone());
    let output = function(&tape, input);
    assert_eq!(
        cotangent.len(),
        output.len(),
        "cotangent length must match output length"
    );
    let value = output.value();
    let nodes = tape.nodes.borrow();
    let grad = backward(&nodes, output.index, cotangent, input.index);
    (value, grad)
}

impl Tape {
    /// Assembles the dense Jacobian `∂output/∂input` of an already-recorded
    /// evaluation, row by row.
    ///
    /// Every output component seeds a standard-basis cotangent and is swept
    /// backwards independently (in parallel — the tape is read-only during
    /// the sweeps). Each sweep's adjoint buffers are freed before the next
    /// column is materialized, which bounds memory to one tape plus one
    /// sweep.
    pub fn jacobian_of(&self, output: Var<'_>, input: Var<'_>) -> Array2<f64> {
        assert!(
            std::ptr::eq(output.tape, self) && std::ptr::eq(input.tape, self),
            "variables must live on this tape"
        );
        let rows = output.len();
        let cols = input.len();
        let output_index = output.index;
        let input_index = input.index;

        let nodes = self.nodes.borrow();
        let node_slice: &[Node] = &nodes;

        let row_values: Vec<Array1<f64>> = (0..rows)
            .into_par_iter()
            .map(|row| {
                let mut seed = Array1::zeros(rows);
                seed[row] = 1.0;
                backward(node_slice, output_index, &seed, input_index)
            })
            .collect();

        let mut matrix = Array2::zeros((rows, cols));
        for (row, value) in row_values.into_iter().enumerate() {
            matrix.row_mut(row).assign(&value);
        }
        matrix
    }
}

/// Records `function` on a fresh tape and assembles its dense Jacobian at
/// `x` through [`Tape::jacobian_of`].
pub fn jacobian<F>(function: F, x: &Array1<f64>) -> Result<Array2<f64>>
where
    F: for<'tape> Fn(&'tape Tape, Var<'tape>) -> Var<'tape>,
{
    let tape = Tape::new();
    let input = tape.leaf(x.clone());
    let output = function(&tape, input);
    Ok(tape.jacobian_of(output, input))
}
