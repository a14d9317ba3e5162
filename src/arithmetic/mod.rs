//! Modular arithmetic, inverse tables and monic polynomial evaluation.

mod evaluator;
mod inverse;
mod modint;
mod newton;

pub use evaluator::{count_trailing_zeros, eval, eval_precompute};
pub use inverse::InverseTable;
pub use modint::{ModularArithmetic, ModularInteger};

pub(crate) use newton::to_monic_coefficients;

/// The coefficients of a monic polynomial, excluding the implicit leading 1.
///
/// The last element is the constant term, so the polynomial degree equals
/// the vector length.
pub type CoefficientVector<T> = Vec<T>;
