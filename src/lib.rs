//! Symmetric Lanczos eigensolver with memory-bounded eigenvector
//! reconstruction.
//!
//! This crate approximates the extremal eigenvalues and eigenvectors of a
//! large, implicitly-defined symmetric (or Hermitian) linear operator using
//! only repeated matrix-vector products. The operator is supplied as a
//! [`LinearOperator`] capability — a single `apply` method — so dense
//! matrices, sparse matrices and matrix-free operators all work unchanged.
//!
//! Built on the [`faer`] linear algebra framework: `faer::Mat` is the vector
//! container, and the dense eigendecomposition of the small projected
//! tridiagonal matrix is delegated to `faer`'s self-adjoint EVD.
//!
//! ## Algorithm
//!
//! The three-term Lanczos recurrence builds an orthonormal Krylov basis one
//! vector at a time, keeping only the two most recent basis vectors plus a
//! working buffer (O(n) memory). Each step appends one (α, β) pair to the
//! growing real tridiagonal projection [`TridiagonalMatrix`], whose
//! eigenvalues (Ritz values) approximate the operator's extremal spectrum.
//! Iteration stops when a pluggable [`Convergence`] criterion fires, when the
//! residual norm β hits zero (the Krylov sequence has exactly spanned an
//! invariant subspace) or when the iteration cap is reached.
//!
//! Eigenvectors of the operator are reconstructed without ever storing the
//! full basis: a second pass replays the identical recurrence from the
//! identical start vector and accumulates the weighted linear combinations on
//! the fly. This doubles the matrix-vector products but keeps memory at O(n)
//! instead of O(nk); see [`solvers`] for the protocol details.
//!
//! The recurrence does not reorthogonalize beyond the two preceding vectors.
//! This is the classic simple Lanczos trade-off: after many steps, rounding
//! erodes global orthogonality and clustered or repeated eigenvalues can show
//! up as spurious duplicate Ritz values. Well-separated extremal eigenvalues
//! converge long before this matters.
//!
//! ## Example
//!
//! Computing the lowest eigenvalue of the n = 4 discrete Laplacian, whose
//! exact spectrum is `2 - 2 cos(kπ/5)`:
//!
//! ```rust
//! use faer::Mat;
//! use lanczos_eigen::{lanczos_eigenvalues, LanczosConfig};
//!
//! let a = Mat::from_fn(4, 4, |i, j| {
//!     if i == j {
//!         2.0
//!     } else if i.abs_diff(j) == 1 {
//!         -1.0
//!     } else {
//!         0.0
//!     }
//! });
//!
//! let config = LanczosConfig {
//!     max_iterations: 4,
//!     precision: 1e-12,
//!     n_eigenvalue: 0,
//!     seed: 42,
//! };
//!
//! // No start vector supplied: a reproducible random one is drawn from the seed.
//! let result = lanczos_eigenvalues(&a, None, &config, "Eigenvalues")?;
//!
//! let expected = 2.0 - 2.0 * (std::f64::consts::PI / 5.0).cos();
//! assert!((result.eigenvalues[0] - expected).abs() < 1e-8);
//! # Ok::<(), lanczos_eigen::LanczosError>(())
//! ```

pub mod algorithms;
pub mod convergence;
pub mod error;
pub mod operator;
pub mod scalar;
pub mod solvers;
pub mod tridiagonal;

// Re-export the primary API at the crate root.
pub use convergence::Convergence;
pub use error::LanczosError;
pub use operator::LinearOperator;
pub use scalar::LanczosScalar;
pub use solvers::{
    lanczos_eigenvalues, lanczos_eigenvectors, EigenvectorResult, Lanczos, LanczosConfig,
    LanczosResult, Projection,
};
pub use tridiagonal::{TridiagonalEigen, TridiagonalMatrix};
