//! High-level Lanczos driver and the two-pass eigenvector reconstruction.
//!
//! [`Lanczos`] orchestrates the three-term recurrence: it owns the start
//! vector, grows the tridiagonal projection one (α, β) pair per step, consults
//! a [`Convergence`] predicate after every step and enforces the iteration
//! cap. On top of the plain run it implements the memory-bounded two-pass
//! eigenvector protocol:
//!
//! 1. A first pass runs the recurrence to convergence, producing the k×k
//!    tridiagonal projection. No basis vectors are stored.
//! 2. The projection's eigenvectors are computed (cheap, k ≪ n).
//! 3. A second pass replays the identical recurrence from the identical start
//!    vector for exactly k steps, accumulating for each requested eigenpair
//!    the weighted sum Σ_step U[(step, index)] · v₁(step).
//!
//! Storing the full basis would cost O(nk) memory; the replay trades a second
//! round of matrix-vector products for an O(n) footprint. The coupling
//! between the passes is made explicit as a state machine
//! (idle → projection ready → vectors ready), so requesting vectors without a
//! completed first pass is an error rather than silent garbage, and the
//! replayed projection is verified bit-for-bit against the first pass.
//!
//! The convenience functions [`lanczos_eigenvalues`] and
//! [`lanczos_eigenvectors`] wrap the driver for the common cases.

use crate::algorithms::LanczosIteration;
use crate::convergence::{Convergence, BREAKDOWN_TOLERANCE};
use crate::error::{LanczosError, LanczosErrorKind};
use crate::operator::LinearOperator;
use crate::scalar::LanczosScalar;
use crate::tridiagonal::TridiagonalMatrix;
use faer::{unzip, zip, Mat, MatRef};
use rand::{rngs::StdRng, SeedableRng};

/// Configuration shared by the convenience entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct LanczosConfig {
    /// Hard cap on the number of recurrence steps.
    pub max_iterations: usize,
    /// Precision handed to the convergence criterion.
    pub precision: f64,
    /// Index (0-based, ascending) of the eigenvalue the convergence
    /// criterion tracks.
    pub n_eigenvalue: usize,
    /// Seed for the random start vector when the caller supplies none.
    pub seed: u64,
}

impl Default for LanczosConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            precision: 1e-12,
            n_eigenvalue: 0,
            seed: 42,
        }
    }
}

/// Outcome of a first pass: the tridiagonal projection together with the
/// final residual norm.
///
/// `beta` is the norm of the first Krylov direction *not* captured by the
/// projection. A value at the breakdown tolerance or below means the
/// recurrence exhausted an invariant subspace and the Ritz values are exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub tmatrix: TridiagonalMatrix,
    pub beta: f64,
}

/// Result of [`lanczos_eigenvalues`].
#[derive(Debug, Clone)]
pub struct LanczosResult {
    /// Ritz values, ascending.
    pub eigenvalues: Vec<f64>,
    pub tmatrix: TridiagonalMatrix,
    pub beta: f64,
}

/// Result of [`lanczos_eigenvectors`].
#[derive(Debug, Clone)]
pub struct EigenvectorResult<T: LanczosScalar> {
    /// Ritz values of the first-pass projection, ascending.
    pub eigenvalues: Vec<f64>,
    pub tmatrix: TridiagonalMatrix,
    pub beta: f64,
    /// Reconstructed eigenvectors, one per requested index, in request
    /// order. Not re-normalized; callers needing unit vectors must scale.
    pub vectors: Vec<Mat<T>>,
}

/// Two-pass protocol state. `ProjectionReady` gates the second pass: vectors
/// can only be reconstructed once a first pass has fixed the step count.
#[derive(Debug)]
enum DriverState {
    Idle,
    ProjectionReady(Projection),
    VectorsReady(Projection),
}

/// The Lanczos driver.
///
/// Borrows the operator for its lifetime; owns the start vector and the
/// protocol state. Independent drivers share nothing, so concurrent solves
/// against distinct (or internally thread-safe) operators are safe.
#[derive(Debug)]
pub struct Lanczos<'a, T: LanczosScalar, O: LinearOperator<T>> {
    operator: &'a O,
    max_iterations: usize,
    seed: u64,
    start: Option<Mat<T>>,
    state: DriverState,
}

impl<'a, T: LanczosScalar, O: LinearOperator<T>> Lanczos<'a, T, O> {
    /// Creates a driver for a square operator of positive dimension.
    pub fn new(operator: &'a O, max_iterations: usize, seed: u64) -> Result<Self, LanczosError> {
        let (nrows, ncols) = (operator.nrows(), operator.ncols());
        if nrows != ncols {
            return Err(LanczosErrorKind::NonSquareOperator { nrows, ncols }.into());
        }
        if nrows == 0 {
            return Err(LanczosErrorKind::ZeroDimension.into());
        }
        Ok(Self {
            operator,
            max_iterations,
            seed,
            start: None,
            state: DriverState::Idle,
        })
    }

    /// Supplies an explicit start vector instead of the seeded random one.
    ///
    /// Resets the protocol state: any previously computed projection belongs
    /// to a different Krylov sequence.
    pub fn set_start_vector(&mut self, start: MatRef<'_, T>) -> Result<(), LanczosError> {
        if start.nrows() != self.operator.nrows() || start.ncols() != 1 {
            return Err(LanczosErrorKind::DimensionMismatch {
                operator_rows: self.operator.nrows(),
                vector_rows: start.nrows(),
            }
            .into());
        }
        self.start = Some(start.to_owned());
        self.state = DriverState::Idle;
        Ok(())
    }

    /// The start vector both passes iterate from, materializing the seeded
    /// random one on first use. Keeping the generated vector (rather than
    /// re-drawing it) is what makes the replay bit-identical.
    fn start_vector(&mut self) -> Mat<T> {
        let n = self.operator.nrows();
        let seed = self.seed;
        self.start
            .get_or_insert_with(|| {
                let mut rng = StdRng::seed_from_u64(seed);
                Mat::from_fn(n, 1, |_, _| T::sample_normal(&mut rng))
            })
            .clone()
    }

    /// Runs the recurrence until the convergence predicate fires, the
    /// sequence breaks down, or the iteration cap is reached (first pass).
    ///
    /// Returns the accumulated projection; the driver keeps a copy so that
    /// [`Self::eigenvectors`] can replay against it.
    pub fn run(&mut self, convergence: &Convergence) -> Result<Projection, LanczosError> {
        self.state = DriverState::Idle;

        let start = self.start_vector();
        let mut iteration = LanczosIteration::new(self.operator, start.as_ref())?;

        let mut tmatrix = TridiagonalMatrix::new();
        let mut beta = 0.0_f64;
        let reason;
        loop {
            if convergence.is_converged(&tmatrix, beta)? {
                reason = "converged";
                break;
            }
            if tmatrix.len() >= self.max_iterations {
                reason = "iteration cap reached";
                break;
            }

            let previous_beta = beta;
            let step = iteration.next_step();
            // The β belonging to this off-diagonal slot is the residual norm
            // of the *previous* step; the fresh β only enters the projection
            // if another step runs.
            tmatrix.push(step.alpha, previous_beta);
            beta = step.beta;

            if beta <= BREAKDOWN_TOLERANCE {
                reason = "breakdown (invariant subspace)";
                break;
            }
        }

        log::debug!(
            "lanczos first pass: {} steps, {reason}, final beta = {:.3e}",
            tmatrix.len(),
            beta
        );

        let projection = Projection { tmatrix, beta };
        self.state = DriverState::ProjectionReady(projection.clone());
        Ok(projection)
    }

    /// The projection of the most recent run, if any.
    pub fn projection(&self) -> Option<&Projection> {
        match &self.state {
            DriverState::Idle => None,
            DriverState::ProjectionReady(p) | DriverState::VectorsReady(p) => Some(p),
        }
    }

    /// Ritz values of the most recent run, ascending.
    pub fn eigenvalues(&self) -> Result<Vec<f64>, LanczosError> {
        match self.projection() {
            Some(projection) => projection.tmatrix.eigenvalues(),
            None => Err(LanczosErrorKind::ProjectionNotReady.into()),
        }
    }

    /// Reconstructs eigenvectors of the operator for the requested Ritz
    /// indices (0-based, ascending spectrum of the first-pass projection).
    ///
    /// This is the second pass: the recurrence is replayed from the identical
    /// start vector for exactly as many steps as the first pass took, and
    /// each requested vector accumulates its weighted combination of the
    /// regenerated basis. The replayed projection must reproduce the stored
    /// one exactly; a mismatch means the operator is not deterministic (or
    /// was swapped out) and yields [`LanczosError`] instead of meaningless
    /// vectors.
    ///
    /// The returned vectors are not re-normalized.
    pub fn eigenvectors(&mut self, requested: &[usize]) -> Result<Vec<Mat<T>>, LanczosError> {
        let projection = match &self.state {
            DriverState::Idle => return Err(LanczosErrorKind::ProjectionNotReady.into()),
            DriverState::ProjectionReady(p) | DriverState::VectorsReady(p) => p.clone(),
        };

        let steps = projection.tmatrix.len();
        for &index in requested {
            if index >= steps {
                return Err(LanczosErrorKind::EigenvectorIndex { index, steps }.into());
            }
        }

        let eigen = projection.tmatrix.eigen()?;
        let n = self.operator.nrows();
        let mut vectors: Vec<Mat<T>> = requested.iter().map(|_| Mat::zeros(n, 1)).collect();

        let start = self.start_vector();
        let mut iteration = LanczosIteration::new(self.operator, start.as_ref())?;

        // Second pass under the fixed-iteration policy: replay exactly
        // `steps` steps, accumulating before each step while the basis
        // vector still exists.
        let fixed = Convergence::FixedIterations {
            n_iterations: steps,
        };
        let mut replay = TridiagonalMatrix::new();
        let mut beta = 0.0_f64;
        while !fixed.is_converged(&replay, beta)? {
            let step_index = replay.len();
            for (vector, &index) in vectors.iter_mut().zip(requested.iter()) {
                let weight = T::from_real(eigen.vectors[(step_index, index)]);
                zip!(vector.as_mut(), iteration.current())
                    .for_each(|unzip!(out, v)| *out = *out + weight * *v);
            }

            let previous_beta = beta;
            let step = iteration.next_step();
            replay.push(step.alpha, previous_beta);
            beta = step.beta;

            // An earlier breakdown than the first pass saw cannot happen for
            // a deterministic operator; bail out and let the comparison
            // below report the inconsistency.
            if beta <= BREAKDOWN_TOLERANCE && replay.len() < steps {
                break;
            }
        }

        if replay != projection.tmatrix {
            return Err(LanczosErrorKind::InconsistentReplay { steps }.into());
        }

        log::debug!(
            "lanczos second pass: reconstructed {} eigenvectors over {} steps",
            vectors.len(),
            steps
        );

        self.state = DriverState::VectorsReady(projection);
        Ok(vectors)
    }
}

/// Computes extremal eigenvalues of a symmetric/Hermitian operator.
///
/// Mirrors the first pass only: runs the recurrence from `start` (or from a
/// seeded random vector when `start` is `None`) under the criterion selected
/// by name (`"Eigenvalues"` or `"Ritz"`), then solves the projected
/// tridiagonal eigenproblem.
pub fn lanczos_eigenvalues<T, O>(
    operator: &O,
    start: Option<MatRef<'_, T>>,
    config: &LanczosConfig,
    criterion: &str,
) -> Result<LanczosResult, LanczosError>
where
    T: LanczosScalar,
    O: LinearOperator<T>,
{
    let convergence = Convergence::from_name(criterion, config.n_eigenvalue, config.precision)?;

    let mut driver = Lanczos::new(operator, config.max_iterations, config.seed)?;
    if let Some(start) = start {
        driver.set_start_vector(start)?;
    }
    let projection = driver.run(&convergence)?;

    Ok(LanczosResult {
        eigenvalues: projection.tmatrix.eigenvalues()?,
        tmatrix: projection.tmatrix,
        beta: projection.beta,
    })
}

/// Computes eigenvalues *and* reconstructed eigenvectors for the requested
/// spectrum indices via the two-pass protocol.
///
/// The convergence criterion of the first pass tracks at least the largest
/// requested index, so every requested Ritz pair is resolved before the
/// reconstruction replays the recurrence. The Ritz criterion is the intended
/// choice here; `"Eigenvalues"` is accepted for parity with
/// [`lanczos_eigenvalues`].
pub fn lanczos_eigenvectors<T, O>(
    operator: &O,
    start: Option<MatRef<'_, T>>,
    config: &LanczosConfig,
    requested: &[usize],
    criterion: &str,
) -> Result<EigenvectorResult<T>, LanczosError>
where
    T: LanczosScalar,
    O: LinearOperator<T>,
{
    let n_eigenvalue = requested
        .iter()
        .copied()
        .max()
        .unwrap_or(0)
        .max(config.n_eigenvalue);
    let convergence = Convergence::from_name(criterion, n_eigenvalue, config.precision)?;

    let mut driver = Lanczos::new(operator, config.max_iterations, config.seed)?;
    if let Some(start) = start {
        driver.set_start_vector(start)?;
    }
    let projection = driver.run(&convergence)?;
    let vectors = driver.eigenvectors(requested)?;

    Ok(EigenvectorResult {
        eigenvalues: projection.tmatrix.eigenvalues()?,
        tmatrix: projection.tmatrix,
        beta: projection.beta,
        vectors,
    })
}
