//! Error types for the Lanczos eigensolver.
//!
//! All failure modes of the crate are collected into a single opaque
//! [`LanczosError`] wrapping a private kind enum, built with [`thiserror`].
//! Note that [`faer::linalg::evd::EvdError`] does not implement the standard
//! [`std::error::Error`] trait, so it is wrapped manually.
//!
//! Krylov breakdown (β → 0) is deliberately *not* an error anywhere in this
//! crate: it signals that the recurrence has exactly spanned an invariant
//! subspace and is handled as a normal termination path.

use thiserror::Error;

/// Error produced by the Lanczos driver, the convergence predicates, or the
/// tridiagonal eigen-analysis.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct LanczosError(#[from] pub(crate) LanczosErrorKind);

/// Private enum containing the distinct kinds of errors. The separation keeps
/// the public surface to one type while allowing exhaustive matching inside
/// the crate and in unit tests.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum LanczosErrorKind {
    /// The start vector has numerically zero norm and cannot be normalized,
    /// so there is nothing to iterate on.
    #[error("Degenerate start vector: the norm is numerically zero, no Krylov sequence can be generated.")]
    DegenerateStartVector,

    /// The recurrence requires a square operator.
    #[error("Operator is not square: {nrows} rows and {ncols} columns.")]
    NonSquareOperator { nrows: usize, ncols: usize },

    /// The operator dimension must be positive.
    #[error("Operator dimension must be positive.")]
    ZeroDimension,

    /// A caller-supplied start vector does not match the operator dimension.
    #[error("Dimension mismatch: operator has {operator_rows} rows but the start vector has {vector_rows}.")]
    DimensionMismatch {
        operator_rows: usize,
        vector_rows: usize,
    },

    /// A convergence criterion was selected by a name that is not recognized.
    #[error("Unknown convergence criterion \"{name}\" (expected \"Eigenvalues\" or \"Ritz\").")]
    UnknownCriterion { name: String },

    /// Eigenvectors were requested before a completed first pass produced a
    /// tridiagonal projection.
    #[error("No tridiagonal projection available: run the Lanczos iteration before requesting eigenpairs.")]
    ProjectionNotReady,

    /// A requested eigenvector index is outside the spectrum of the
    /// tridiagonal projection.
    #[error("Eigenvector index {index} out of bounds: the projection has only {steps} Ritz pairs.")]
    EigenvectorIndex { index: usize, steps: usize },

    /// The reconstruction pass replayed the recurrence and obtained a
    /// different tridiagonal projection than the first pass. The operator or
    /// the start vector changed between the two passes.
    #[error("Inconsistent replay: the second pass over {steps} steps did not reproduce the first-pass projection. The operator must be deterministic and the start vector identical.")]
    InconsistentReplay { steps: usize },

    /// Wraps an error from [`faer`]'s eigendecomposition of the projected
    /// tridiagonal matrix.
    #[error("A numerical error occurred during the eigendecomposition of the tridiagonal projection: {0:?}")]
    EvdError(faer::linalg::evd::EvdError),
}

// The public error type compares by its inner kind.
impl PartialEq for LanczosError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl LanczosError {
    /// True if the error is the degenerate (zero-norm) start-vector case.
    pub fn is_degenerate_start_vector(&self) -> bool {
        self.0 == LanczosErrorKind::DegenerateStartVector
    }

    /// True if the error reports an unrecognized convergence-criterion name.
    pub fn is_unknown_criterion(&self) -> bool {
        matches!(self.0, LanczosErrorKind::UnknownCriterion { .. })
    }

    /// True if the error reports a reconstruction replay that diverged from
    /// the first pass.
    pub fn is_inconsistent_replay(&self) -> bool {
        matches!(self.0, LanczosErrorKind::InconsistentReplay { .. })
    }
}
