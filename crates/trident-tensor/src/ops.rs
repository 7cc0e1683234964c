//! Forward operations: operator overloads and recording methods on [`Var`].

use ndarray::{Array1, Axis, concatenate};

use crate::tape::{BinaryOp, Op, UnaryOp, Var};

/// Computes the forward value of a unary operation.
pub(crate) fn apply_unary(kind: UnaryOp, x: &Array1<f64>) -> Array1<f64> {
    match kind {
        UnaryOp::Neg => x.mapv(|value| -value),
        UnaryOp::Exp => x.mapv(f64::exp),
        UnaryOp::Ln => x.mapv(f64::ln),
        UnaryOp::Sqrt => x.mapv(f64::sqrt),
        UnaryOp::Abs => x.mapv(f64::abs),
        UnaryOp::Signum => x.mapv(f64::signum),
        UnaryOp::Powi(n) => x.mapv(|value| value.powi(n)),
        UnaryOp::Powf(p) => x.mapv(|value| value.powf(p)),
        UnaryOp::AddScalar(c) => x.mapv(|value| value + c),
        UnaryOp::MulScalar(c) => x.mapv(|value| value * c),
        UnaryOp::ScalarSub(c) => x.mapv(|value| c - value),
        UnaryOp::ScalarDiv(c) => x.mapv(|value| c / value),
        UnaryOp::MaxScalar(c) => x.mapv(|value| value.max(c)),
        UnaryOp::MinScalar(c) => x.mapv(|value| value.min(c)),
        UnaryOp::Clamp(lo, hi) => x.mapv(|value| value.clamp(lo, hi)),
    }
}

/// Computes the forward value of a binary operation.
pub(crate) fn apply_binary(kind: BinaryOp, a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    match kind {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Max => ndarray::Zip::from(a).and(b).map_collect(|&x, &y| x.max(y)),
        BinaryOp::Min => ndarray::Zip::from(a).and(b).map_collect(|&x, &y| x.min(y)),
    }
}

impl<'tape> Var<'tape> {
    /// Records a unary operation on this variable.
    pub(crate) fn record_unary(self, kind: UnaryOp) -> Self {
        let value = {
            let nodes = self.tape.nodes.borrow();
            apply_unary(kind, &nodes[self.index].value)
        };
        let len = value.len();
        let index = self.tape.push(
            value,
            Op::Unary {
                parent: self.index,
                kind,
            },
        );
        Self {
            tape: self.tape,
            index,
            len,
        }
    }

    /// Records a binary operation between this variable and `rhs`.
    pub(crate) fn record_binary(self, rhs: Self, kind: BinaryOp) -> Self {
        assert!(
            std::ptr::eq(self.tape, rhs.tape),
            "operands must live on the same tape"
        );
        assert_eq!(self.len, rhs.len, "operands must have equal lengths");
        let value = {
            let nodes = self.tape.nodes.borrow();
            apply_binary(kind, &nodes[self.index].value, &nodes[rhs.index].value)
        };
        let len = value.len();
        let index = self.tape.push(
            value,
            Op::Binary {
                lhs: self.index,
                rhs: rhs.index,
                kind,
            },
        );
        Self {
            tape: self.tape,
            index,
            len,
        }
    }

    /// Element-wise `exp`.
    pub fn exp(self) -> Self {
        self.record_unary(UnaryOp::Exp)
    }

    /// Element-wise natural logarithm.
    pub fn ln(self) -> Self {
        self.record_unary(UnaryOp::Ln)
    }

    /// Element-wise square root.
    pub fn sqrt(self) -> Self {
        self.record_unary(UnaryOp::Sqrt)
    }

    /// Element-wise absolute value.
    pub fn abs(self) -> Self {
        self.record_unary(UnaryOp::Abs)
    }

    /// Element-wise sign. Constant for the reverse sweep.
    pub fn signum(self) -> Self {
        self.record_unary(UnaryOp::Signum)
    }

    /// Materialized minimum of the elements (evaluation barrier).
    pub fn min_value(&self) -> f64 {
        self.value().iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Materialized maximum of the elements (evaluation barrier).
    pub fn max_value(&self) -> f64 {
        self.value().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Element-wise integer power.
    pub fn powi(self, n: i32) -> Self {
        self.record_unary(UnaryOp::Powi(n))
    }

    /// Element-wise real power.
    pub fn powf(self, p: f64) -> Self {
        self.record_unary(UnaryOp::Powf(p))
    }

    /// Element-wise `max(x, c)`.
    pub fn maximum(self, c: f64) -> Self {
        self.record_unary(UnaryOp::MaxScalar(c))
    }

    /// Element-wise `min(x, c)`.
    pub fn minimum(self, c: f64) -> Self {
        self.record_unary(UnaryOp::MinScalar(c))
    }

    /// Element-wise clamp into `[lo, hi]`.
    pub fn clamp(self, lo: f64, hi: f64) -> Self {
        debug_assert!(lo <= hi, "clamp bounds must be ordered");
        self.record_unary(UnaryOp::Clamp(lo, hi))
    }

    /// Element-wise maximum of two variables (ties resolve to `self`).
    pub fn max_with(self, rhs: Self) -> Self {
        self.record_binary(rhs, BinaryOp::Max)
    }

    /// Element-wise minimum of two variables (ties resolve to `self`).
    pub fn min_with(self, rhs: Self) -> Self {
        self.record_binary(rhs, BinaryOp::Min)
    }

    /// Sum reduction into a single-element variable.
    pub fn sum(self) -> Self {
        let value = {
            let nodes = self.tape.nodes.borrow();
            ndarray::arr1(&[nodes[self.index].value.sum()])
        };
        let index = self.tape.push(value, Op::Sum { parent: self.index });
        Self {
            tape: self.tape,
            index,
            len: 1,
        }
    }

    /// Contiguous sub-range `[range.start, range.end)`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the variable's length.
    pub fn slice(self, range: std::ops::Range<usize>) -> Self {
        assert!(range.end <= self.len, "slice range out of bounds");
        let value = {
            let nodes = self.tape.nodes.borrow();
            nodes[self.index]
                .value
                .slice(ndarray::s![range.start..range.end])
                .to_owned()
        };
        let len = value.len();
        let index = self.tape.push(
            value,
            Op::Slice {
                parent: self.index,
                start: range.start,
            },
        );
        Self {
            tape: self.tape,
            index,
            len,
        }
    }
}

/// Concatenates variables in order into a single variable.
///
/// # Panics
///
/// Panics if `vars` is empty or the variables live on different tapes.
pub fn concat<'tape>(vars: &[Var<'tape>]) -> Var<'tape> {
    assert!(!vars.is_empty(), "concat requires at least one variable");
    let tape = vars[0].tape;
    assert!(
        vars.iter().all(|var| std::ptr::eq(var.tape, tape)),
        "operands must live on the same tape"
    );
    let value = {
        let nodes = tape.nodes.borrow();
        let views: Vec<_> = vars
            .iter()
            .map(|var| nodes[var.index].value.view())
            .collect();
        concatenate(Axis(0), &views).expect("1-D concatenation cannot fail")
    };
    let len = value.len();
    let index = tape.push(
        value,
        Op::Concat {
            parents: vars.iter().map(|var| var.index).collect(),
        },
    );
    Var { tape, index, len }
}

/// Element-wise selection: where `mask` is 1 take `on_true`, else
/// `on_false`. The mask is derived from materialized values and is constant
/// for the reverse sweep; cotangents flow through the selected branch only.
///
/// # Panics
///
/// Panics on length mismatch between the mask and the operands.
pub fn select<'tape>(mask: &Array1<f64>, on_true: Var<'tape>, on_false: Var<'tape>) -> Var<'tape> {
    assert!(
        std::ptr::eq(on_true.tape, on_false.tape),
        "operands must live on the same tape"
    );
    assert_eq!(on_true.len, on_false.len, "operands must have equal lengths");
    assert_eq!(mask.len(), on_true.len, "mask length must match operands");
    let tape = on_true.tape;
    let value = {
        let nodes = tape.nodes.borrow();
        let t = &nodes[on_true.index].value;
        let f = &nodes[on_false.index].value;
        ndarray::Zip::from(mask)
            .and(t)
            .and(f)
            .map_collect(|&m, &a, &b| if m > 0.5 { a } else { b })
    };
    let len = value.len();
    let index = tape.push(
        value,
        Op::Select {
            mask: mask.clone(),
            on_true: on_true.index,
            on_false: on_false.index,
        },
    );
    Var { tape, index, len }
}

// ==================== Operator overloads

macro_rules! binary_operator_impl {
    ($trait:ident, $method:ident, $kind:expr, $scalar_kind:expr, $scalar_left:expr) => {
        impl<'tape> std::ops::$trait for Var<'tape> {
            type Output = Var<'tape>;
            fn $method(self, rhs: Var<'tape>) -> Var<'tape> {
                self.record_binary(rhs, $kind)
            }
        }

        impl<'tape> std::ops::$trait<f64> for Var<'tape> {
            type Output = Var<'tape>;
            fn $method(self, rhs: f64) -> Var<'tape> {
                self.record_unary($scalar_kind(rhs))
            }
        }

        impl<'tape> std::ops::$trait<Var<'tape>> for f64 {
            type Output = Var<'tape>;
            fn $method(self, rhs: Var<'tape>) -> Var<'tape> {
                $scalar_left(self, rhs)
            }
        }
    };
}

fn add_scalar_left<'tape>(c: f64, rhs: Var<'tape>) -> Var<'tape> {
    rhs.record_unary(UnaryOp::AddScalar(c))
}

fn sub_scalar_left<'tape>(c: f64, rhs: Var<'tape>) -> Var<'tape> {
    rhs.record_unary(UnaryOp::ScalarSub(c))
}

fn mul_scalar_left<'tape>(c: f64, rhs: Var<'tape>) -> Var<'tape> {
    rhs.record_unary(UnaryOp::MulScalar(c))
}

fn div_scalar_left<'tape>(c: f64, rhs: Var<'tape>) -> Var<'tape> {
    rhs.record_unary(UnaryOp::ScalarDiv(c))
}

binary_operator_impl!(
    Add,
    add,
    BinaryOp::Add,
    UnaryOp::AddScalar,
    add_scalar_left
);
binary_operator_impl!(
    Sub,
    sub,
    BinaryOp::Sub,
    |c: f64| UnaryOp::AddScalar(-c),
    sub_scalar_left
);
binary_operator_impl!(
    Mul,
    mul,
    BinaryOp::Mul,
    UnaryOp::MulScalar,
    mul_scalar_left
);
binary_operator_impl!(
    Div,
    div,
    BinaryOp::Div,
    |c: f64| UnaryOp::MulScalar(c.recip()),
    div_scalar_left
);

impl<'tape> std::ops::Neg for Var<'tape> {
    type Output = Var<'tape>;
    fn neg(self) -> Var<'tape> {
        self.record_unary(UnaryOp::Neg)
    }
}
