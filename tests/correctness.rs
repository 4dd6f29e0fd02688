//! Integration test suite for the mathematical correctness of the Lanczos
//! eigensolver.
//!
//! # Test Methodology
//!
//! The approximations produced by the solver are validated against ground
//! truths that can be computed analytically or by a dense reference
//! eigendecomposition:
//!
//! 1. **Diagonal operators** make every spectral property trivial to state:
//!    the eigenvalues are the diagonal entries and the eigenvectors are the
//!    coordinate vectors. They are implemented matrix-free, which also
//!    exercises the operator capability the way large-scale callers use it.
//! 2. **Small dense symmetric matrices** are cross-checked against `faer`'s
//!    dense self-adjoint eigendecomposition, which is exact to machine
//!    precision at these sizes.
//! 3. **Invariant subspaces** are constructed by restricting the start
//!    vector's support; the Krylov sequence then has to break down after
//!    exactly the subspace dimension.
//!
//! Random start vectors always use a fixed seed so every test is
//! deterministic.

use anyhow::{ensure, Result};
use faer::{Mat, MatMut, MatRef, Scale, Side};
use lanczos_eigen::{
    lanczos_eigenvalues, lanczos_eigenvectors, Convergence, Lanczos, LanczosConfig,
    LinearOperator,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::cell::Cell;

/// A diagonal operator applied matrix-free: `y[i] = d[i] * x[i]`.
///
/// The spectrum is exactly the diagonal, so every Rayleigh–Ritz property can
/// be asserted without a reference solve.
struct DiagonalOperator {
    entries: Vec<f64>,
}

impl DiagonalOperator {
    fn ramp(n: usize) -> Self {
        Self {
            entries: (1..=n).map(|i| i as f64).collect(),
        }
    }
}

impl LinearOperator<f64> for DiagonalOperator {
    fn nrows(&self) -> usize {
        self.entries.len()
    }

    fn ncols(&self) -> usize {
        self.entries.len()
    }

    fn apply(&self, x: MatRef<'_, f64>, mut out: MatMut<'_, f64>) {
        assert_eq!(x.nrows(), self.entries.len());
        for (i, &d) in self.entries.iter().enumerate() {
            out[(i, 0)] = d * x[(i, 0)];
        }
    }
}

/// A diagonal operator that silently changes its action after a fixed number
/// of applications. This violates the determinism contract of
/// `LinearOperator::apply` on purpose, to exercise the replay validation of
/// the two-pass reconstruction.
struct DriftingOperator {
    entries: Vec<f64>,
    calls: Cell<usize>,
    drift_after: usize,
}

impl LinearOperator<f64> for DriftingOperator {
    fn nrows(&self) -> usize {
        self.entries.len()
    }

    fn ncols(&self) -> usize {
        self.entries.len()
    }

    fn apply(&self, x: MatRef<'_, f64>, mut out: MatMut<'_, f64>) {
        let shift = if self.calls.get() >= self.drift_after {
            10.0
        } else {
            0.0
        };
        self.calls.set(self.calls.get() + 1);
        for (i, &d) in self.entries.iter().enumerate() {
            out[(i, 0)] = (d + shift) * x[(i, 0)];
        }
    }
}

/// Builds a reproducible dense symmetric matrix `B + Bᵀ` with entries of
/// order one.
fn random_symmetric(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let b = Mat::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
    &b + b.transpose()
}

/// Reference spectrum from the dense eigensolver, ascending.
fn dense_eigenvalues(a: &Mat<f64>) -> Result<Vec<f64>> {
    let evd = a
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| anyhow::anyhow!("dense EVD failed: {e:?}"))?;
    let s = evd.S();
    let mut eigs: Vec<f64> = (0..a.nrows()).map(|i| s[i]).collect();
    eigs.sort_by(|x, y| x.partial_cmp(y).unwrap());
    Ok(eigs)
}

/// The projection always satisfies `len(diag) == len(offdiag) + 1`.
#[test]
fn projection_shape_invariant_holds_mid_run() -> Result<()> {
    let operator = DiagonalOperator::ramp(50);
    let mut driver = Lanczos::new(&operator, 50, 1)?;

    for k in [1usize, 5, 20] {
        let projection = driver.run(&Convergence::FixedIterations { n_iterations: k })?;
        ensure!(projection.tmatrix.len() == k);
        ensure!(projection.tmatrix.diag().len() == projection.tmatrix.offdiag().len() + 1);
    }
    Ok(())
}

/// Rayleigh–Ritz containment: every Ritz value of every projection size lies
/// inside the operator's spectral interval.
#[test]
fn ritz_values_lie_within_the_operator_spectrum() -> Result<()> {
    let operator = DiagonalOperator::ramp(50);
    let mut driver = Lanczos::new(&operator, 50, 2)?;

    for k in [3usize, 10, 25] {
        driver.run(&Convergence::FixedIterations { n_iterations: k })?;
        for eig in driver.eigenvalues()? {
            ensure!(
                (1.0 - 1e-8..=50.0 + 1e-8).contains(&eig),
                "Ritz value {eig} escaped the spectral interval [1, 50] at k = {k}"
            );
        }
    }
    Ok(())
}

/// The lowest Ritz value refines monotonically toward the true minimum as
/// the Krylov subspace grows (nested subspaces, same start vector).
#[test]
fn lowest_ritz_value_refines_monotonically() -> Result<()> {
    let operator = DiagonalOperator::ramp(60);
    let mut driver = Lanczos::new(&operator, 60, 3)?;

    let mut previous_error = f64::INFINITY;
    for k in [5usize, 10, 20, 30] {
        driver.run(&Convergence::FixedIterations { n_iterations: k })?;
        let error = driver.eigenvalues()?[0] - 1.0;
        ensure!(
            error >= -1e-9,
            "Ritz value undershot the true minimum: error = {error}"
        );
        ensure!(
            error <= previous_error + 1e-10,
            "refinement regressed between subspace sizes: {previous_error} -> {error}"
        );
        previous_error = error;
    }
    Ok(())
}

/// A start vector supported on an invariant subspace of dimension d forces
/// breakdown at step d, with the Ritz values exactly the spectrum of the
/// restricted operator.
#[test]
fn breakdown_at_the_invariant_subspace_dimension() -> Result<()> {
    let operator = DiagonalOperator::ramp(10);
    let mut start = Mat::<f64>::zeros(10, 1);
    start[(0, 0)] = 1.0;
    start[(1, 0)] = 1.0;
    start[(2, 0)] = 1.0;

    let mut driver = Lanczos::new(&operator, 10, 0)?;
    driver.set_start_vector(start.as_ref())?;
    // A precision no residual can meet: only breakdown can stop the run.
    let projection = driver.run(&Convergence::Ritz {
        n_eigenvalue: 0,
        precision: 1e-300,
    })?;

    ensure!(
        projection.tmatrix.len() == 3,
        "expected breakdown after 3 steps, got {}",
        projection.tmatrix.len()
    );
    ensure!(projection.beta < 1e-8, "beta = {} after breakdown", projection.beta);

    let eigs = driver.eigenvalues()?;
    for (eig, expected) in eigs.iter().zip([1.0, 2.0, 3.0]) {
        ensure!(
            (eig - expected).abs() < 1e-8,
            "invariant-subspace eigenvalue {eig} != {expected}"
        );
    }
    Ok(())
}

/// Two-pass reconstruction round-trip: the reconstructed eigenvectors of a
/// small dense symmetric operator satisfy the eigenpair equation.
#[test]
fn reconstructed_eigenvectors_satisfy_the_eigen_equation() -> Result<()> {
    let a = random_symmetric(10, 17);
    let reference = dense_eigenvalues(&a)?;

    let config = LanczosConfig {
        max_iterations: 10,
        precision: 1e-10,
        n_eigenvalue: 0,
        seed: 9,
    };
    let result = lanczos_eigenvectors(&a, None, &config, &[0, 1, 2], "Ritz")?;

    for (k, vector) in result.vectors.iter().enumerate() {
        let lambda = result.eigenvalues[k];
        ensure!(
            (lambda - reference[k]).abs() < 1e-8,
            "Ritz value {lambda} disagrees with the dense reference {}",
            reference[k]
        );

        let residual = &a * vector - vector * Scale(lambda);
        let relative = residual.norm_l2() / vector.norm_l2();
        ensure!(
            relative < 1e-6,
            "eigenpair residual too large for index {k}: {relative}"
        );
    }
    Ok(())
}

/// Two runs with the same seed and no caller-supplied start vector produce
/// bit-identical projections.
#[test]
fn seeded_runs_are_bit_identical() -> Result<()> {
    let operator = DiagonalOperator::ramp(40);
    let config = LanczosConfig {
        max_iterations: 40,
        precision: 1e-10,
        n_eigenvalue: 1,
        seed: 7,
    };

    let first = lanczos_eigenvalues(&operator, None, &config, "Ritz")?;
    let second = lanczos_eigenvalues(&operator, None, &config, "Ritz")?;

    ensure!(first.tmatrix == second.tmatrix, "projections differ between runs");
    ensure!(first.beta == second.beta, "final residuals differ between runs");
    ensure!(first.eigenvalues == second.eigenvalues);
    Ok(())
}

/// Concrete end-to-end scenario: diag(1, 2, ..., 100) applied matrix-free,
/// Ritz criterion at 1e-10 tracking the third-lowest eigenvalue. Convergence
/// must arrive well before the operator dimension and the Ritz value must
/// match the true eigenvalue 3.
#[test]
fn third_lowest_of_the_diagonal_ramp() -> Result<()> {
    let operator = DiagonalOperator::ramp(100);
    let config = LanczosConfig {
        max_iterations: 100,
        precision: 1e-10,
        n_eigenvalue: 2,
        seed: 42,
    };

    let result = lanczos_eigenvalues(&operator, None, &config, "Ritz")?;

    ensure!(
        result.tmatrix.len() < 100,
        "expected convergence before the operator dimension, took {} steps",
        result.tmatrix.len()
    );
    ensure!(
        (result.eigenvalues[2] - 3.0).abs() < 1e-6,
        "third-lowest Ritz value {} is not 3",
        result.eigenvalues[2]
    );
    Ok(())
}

/// The reconstruction pass must detect an operator that is not deterministic
/// across the two passes and refuse to hand back meaningless vectors.
#[test]
fn replay_against_a_drifting_operator_is_rejected() -> Result<()> {
    // The first pass takes exactly 3 steps (3 applications); the operator
    // then shifts its whole spectrum, so the replayed projection cannot
    // reproduce the stored one.
    let operator = DriftingOperator {
        entries: (1..=8).map(|i| i as f64).collect(),
        calls: Cell::new(0),
        drift_after: 3,
    };

    let mut driver = Lanczos::new(&operator, 8, 13)?;
    driver.run(&Convergence::FixedIterations { n_iterations: 3 })?;

    let err = driver.eigenvectors(&[0]).unwrap_err();
    ensure!(
        err.is_inconsistent_replay(),
        "expected the replay mismatch to be reported, got: {err}"
    );
    Ok(())
}

/// Selecting a convergence policy by an unrecognized name is a configuration
/// error reported before any iteration happens.
#[test]
fn unknown_criterion_name_is_rejected() {
    let operator = DiagonalOperator::ramp(10);
    let err = lanczos_eigenvalues(&operator, None, &LanczosConfig::default(), "Chebyshev")
        .unwrap_err();
    assert!(err.is_unknown_criterion());
    assert!(err.to_string().contains("Chebyshev"));
}

/// The reconstruction contract in one piece: eigenvalues from the first pass
/// and vectors from the second pass describe the same operator even when the
/// spectrum is recovered through an explicit start vector.
#[test]
fn explicit_start_vector_round_trip() -> Result<()> {
    let a = random_symmetric(8, 23);
    let start = Mat::from_fn(8, 1, |i, _| 1.0 + i as f64);

    let config = LanczosConfig {
        max_iterations: 8,
        precision: 1e-10,
        n_eigenvalue: 0,
        seed: 0,
    };
    let result = lanczos_eigenvectors(&a, Some(start.as_ref()), &config, &[0], "Ritz")?;

    let lambda = result.eigenvalues[0];
    let vector = &result.vectors[0];
    let residual = &a * vector - vector * Scale(lambda);
    ensure!(residual.norm_l2() / vector.norm_l2() < 1e-6);
    Ok(())
}
