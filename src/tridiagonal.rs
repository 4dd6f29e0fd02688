//! The tridiagonal projection of the operator onto the Krylov basis.
//!
//! The three-term recurrence projects a Hermitian operator onto the generated
//! Krylov basis; in exact arithmetic that projection is a real symmetric
//! tridiagonal matrix, stored here as the diagonal coefficients α and the
//! off-diagonal coefficients β. The structure only ever grows by one (α, β)
//! pair per completed recurrence step, or is truncated from the end when a
//! convergence check needs the previous-step projection.
//!
//! Eigen-analysis of the projection is delegated to [`faer`]'s self-adjoint
//! eigendecomposition of the dense k×k matrix. The systems are tiny compared
//! to the operator dimension (k ≪ n), so a dense solve is cheap and accurate
//! to machine precision. Eigenvalues are reported in ascending order and the
//! eigenvector columns are permuted to match; all index arithmetic in the
//! convergence predicates and the reconstruction pass relies on exactly this
//! convention.

use crate::error::{LanczosError, LanczosErrorKind};
use faer::{Mat, Side};
use std::cmp::Ordering;

/// Real symmetric tridiagonal matrix accumulated by the Lanczos recurrence.
///
/// Invariant: `diag.len() == offdiag.len() + 1` whenever the matrix is
/// non-empty. An empty matrix is the initial state before the first step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TridiagonalMatrix {
    diag: Vec<f64>,
    offdiag: Vec<f64>,
}

/// Eigendecomposition of a [`TridiagonalMatrix`].
///
/// `values` are ascending; column `j` of `vectors` is the orthonormal
/// eigenvector belonging to `values[j]`.
#[derive(Debug, Clone)]
pub struct TridiagonalEigen {
    pub values: Vec<f64>,
    pub vectors: Mat<f64>,
}

impl TridiagonalMatrix {
    /// Creates the empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a 1×1 projection from the first diagonal coefficient.
    pub fn from_alpha(alpha: f64) -> Self {
        Self {
            diag: vec![alpha],
            offdiag: Vec::new(),
        }
    }

    /// Appends one recurrence step.
    ///
    /// The very first push only records α; the accompanying β is the residual
    /// norm *preceding* the step and is zero by definition there.
    pub fn push(&mut self, alpha: f64, beta: f64) {
        if !self.diag.is_empty() {
            self.offdiag.push(beta);
        }
        self.diag.push(alpha);
    }

    /// Number of completed steps, i.e. the dimension of the projection.
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// True before any step has completed.
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Diagonal coefficients α.
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// Off-diagonal coefficients β.
    pub fn offdiag(&self) -> &[f64] {
        &self.offdiag
    }

    /// Returns the projection truncated to its leading `len`×`len` block.
    ///
    /// Used by the eigenvalue-residual convergence criterion, which compares
    /// Ritz values of the current projection against the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `len > self.len()`.
    pub fn truncated(&self, len: usize) -> Self {
        assert!(len <= self.len());
        Self {
            diag: self.diag[..len].to_vec(),
            offdiag: self.offdiag[..len.saturating_sub(1)].to_vec(),
        }
    }

    /// Assembles the dense symmetric representation of the projection.
    pub fn to_dense(&self) -> Mat<f64> {
        let k = self.len();
        let mut dense = Mat::<f64>::zeros(k, k);
        for (i, &alpha) in self.diag.iter().enumerate() {
            dense[(i, i)] = alpha;
        }
        for (i, &beta) in self.offdiag.iter().enumerate() {
            dense[(i, i + 1)] = beta;
            dense[(i + 1, i)] = beta;
        }
        dense
    }

    /// Eigenvalues of the projection, ascending.
    pub fn eigenvalues(&self) -> Result<Vec<f64>, LanczosError> {
        Ok(self.eigen()?.values)
    }

    /// Eigenvalues and orthonormal eigenvectors of the projection.
    ///
    /// `faer` does not guarantee an ordering for the self-adjoint
    /// eigendecomposition, so the spectrum is explicitly sorted ascending and
    /// the eigenvector columns permuted along with it.
    pub fn eigen(&self) -> Result<TridiagonalEigen, LanczosError> {
        let k = self.len();
        if k == 0 {
            return Ok(TridiagonalEigen {
                values: Vec::new(),
                vectors: Mat::zeros(0, 0),
            });
        }

        let dense = self.to_dense();
        let evd = dense
            .self_adjoint_eigen(Side::Lower)
            .map_err(|e| LanczosError::from(LanczosErrorKind::EvdError(e)))?;
        let s = evd.S();
        let u = evd.U();

        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| s[a].partial_cmp(&s[b]).unwrap_or(Ordering::Equal));

        let values = order.iter().map(|&i| s[i]).collect();
        let vectors = Mat::from_fn(k, k, |row, col| u[(row, order[col])]);

        Ok(TridiagonalEigen { values, vectors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn push_preserves_the_shape_invariant() {
        let mut t = TridiagonalMatrix::new();
        assert!(t.is_empty());

        t.push(1.0, 0.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.offdiag().len(), 0);

        t.push(2.0, 0.5);
        t.push(3.0, 0.25);
        assert_eq!(t.diag(), &[1.0, 2.0, 3.0]);
        assert_eq!(t.offdiag(), &[0.5, 0.25]);
        assert_eq!(t.diag().len(), t.offdiag().len() + 1);
    }

    #[test]
    fn truncation_drops_the_trailing_pair() {
        let mut t = TridiagonalMatrix::from_alpha(1.0);
        t.push(2.0, 0.5);
        t.push(3.0, 0.25);

        let prev = t.truncated(2);
        assert_eq!(prev.diag(), &[1.0, 2.0]);
        assert_eq!(prev.offdiag(), &[0.5]);

        let empty = t.truncated(0);
        assert!(empty.is_empty());
        assert_eq!(empty.offdiag().len(), 0);
    }

    #[test]
    fn dense_assembly_is_symmetric() {
        let mut t = TridiagonalMatrix::from_alpha(2.0);
        t.push(2.0, -1.0);
        t.push(2.0, -1.0);

        let dense = t.to_dense();
        assert_eq!(dense.nrows(), 3);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(dense[(i, j)], dense[(j, i)]);
            }
        }
        assert_eq!(dense[(0, 1)], -1.0);
        assert_eq!(dense[(0, 2)], 0.0);
    }

    #[test]
    fn eigen_of_two_by_two_is_exact() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3 with eigenvectors
        // (1, -1)/sqrt(2) and (1, 1)/sqrt(2).
        let mut t = TridiagonalMatrix::from_alpha(2.0);
        t.push(2.0, 1.0);

        let eigen = t.eigen().unwrap();
        assert_relative_eq!(eigen.values[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(eigen.values[1], 3.0, max_relative = 1e-12);

        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(eigen.vectors[(0, 0)].abs(), inv_sqrt2, epsilon = 1e-12);
        assert_relative_eq!(eigen.vectors[(0, 1)].abs(), inv_sqrt2, epsilon = 1e-12);
        // Opposite signs within the first column, equal signs within the second.
        assert!(eigen.vectors[(0, 0)] * eigen.vectors[(1, 0)] < 0.0);
        assert!(eigen.vectors[(0, 1)] * eigen.vectors[(1, 1)] > 0.0);
    }

    /// Pins the ordering convention: eigenvalues ascending, eigenvector
    /// columns indexed to match. With a diagonal projection the eigenvectors
    /// are coordinate vectors, so the permutation is directly observable.
    #[test]
    fn eigen_sorts_ascending_and_permutes_vectors() {
        let mut t = TridiagonalMatrix::from_alpha(3.0);
        t.push(1.0, 0.0);
        t.push(2.0, 0.0);

        let eigen = t.eigen().unwrap();
        assert_relative_eq!(eigen.values[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.values[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.values[2], 3.0, epsilon = 1e-12);

        // Column 0 must be the eigenvector of eigenvalue 1, i.e. the second
        // coordinate vector; likewise for the others.
        assert_relative_eq!(eigen.vectors[(1, 0)].abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.vectors[(2, 1)].abs(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.vectors[(0, 2)].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_projection_has_empty_spectrum() {
        let t = TridiagonalMatrix::new();
        assert!(t.eigenvalues().unwrap().is_empty());
    }
}
