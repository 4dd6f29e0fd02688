//! The linear-operator capability consumed by the Lanczos driver.
//!
//! The Lanczos process never inspects matrix entries; its only contact with
//! the operator is the matrix-vector product. Abstracting that product behind
//! a single-method trait keeps the driver decoupled from how the product is
//! implemented: a dense matrix, a sparse matrix, or a matrix-free closure over
//! some physical model all work unchanged.
//!
//! Implementations write the product into a caller-provided buffer instead of
//! returning an owned vector. The driver reuses the same three buffers for the
//! whole run, so a solve allocates a constant number of vectors regardless of
//! the iteration count.
//!
//! The two-pass eigenvector reconstruction (see [`crate::solvers`]) replays
//! the recurrence and therefore requires `apply` to be deterministic: the same
//! input must produce the bit-identical output on every call.

use crate::scalar::LanczosScalar;
use faer::{
    linalg::matmul::matmul, prelude::Reborrow, Accum, Mat, MatMut, MatRef, Par,
};

/// A symmetric (or Hermitian) linear operator, defined by its action on a
/// vector.
///
/// `apply` must compute `out = A·x` and must be deterministic across repeated
/// calls with identical input; the two-pass reconstruction protocol depends on
/// it. The symmetry of the operator itself is a contract the implementor must
/// uphold — the recurrence silently produces garbage for non-symmetric `A`.
pub trait LinearOperator<T: LanczosScalar> {
    /// Number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Computes `out = A·x`, overwriting `out`.
    ///
    /// # Panics
    ///
    /// Implementations panic if the dimensions of `x` or `out` do not match
    /// the operator.
    fn apply(&self, x: MatRef<'_, T>, out: MatMut<'_, T>);
}

impl<'a, T: LanczosScalar> LinearOperator<T> for MatRef<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        MatRef::nrows(self)
    }

    #[inline]
    fn ncols(&self) -> usize {
        MatRef::ncols(self)
    }

    fn apply(&self, x: MatRef<'_, T>, out: MatMut<'_, T>) {
        assert_eq!(
            MatRef::ncols(self),
            x.nrows(),
            "Dimension mismatch: operator columns ({}) do not match vector rows ({}).",
            MatRef::ncols(self),
            x.nrows(),
        );
        assert_eq!(
            MatRef::nrows(self),
            out.nrows(),
            "Dimension mismatch: operator rows ({}) do not match output rows ({}).",
            MatRef::nrows(self),
            out.nrows(),
        );

        // Write straight into the caller's buffer; no temporary is allocated.
        matmul(out, Accum::Replace, *self, x, T::one_impl(), Par::Seq);
    }
}

impl<'a, T: LanczosScalar> LinearOperator<T> for MatMut<'a, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rb().nrows()
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.rb().ncols()
    }

    #[inline]
    fn apply(&self, x: MatRef<'_, T>, out: MatMut<'_, T>) {
        self.rb().apply(x, out);
    }
}

impl<T: LanczosScalar> LinearOperator<T> for Mat<T> {
    #[inline]
    fn nrows(&self) -> usize {
        Mat::nrows(self)
    }

    #[inline]
    fn ncols(&self) -> usize {
        Mat::ncols(self)
    }

    #[inline]
    fn apply(&self, x: MatRef<'_, T>, out: MatMut<'_, T>) {
        self.as_ref().apply(x, out);
    }
}
