//! The stateful three-term Lanczos recurrence.
//!
//! [`LanczosIteration`] owns exactly three vectors of the operator's
//! dimension: the previous basis vector v₀, the current basis vector v₁ and a
//! working buffer w. Each call to [`LanczosIteration::next_step`] performs one
//! step of the recurrence
//!
//! ```text
//! w  = A·v₁ − α·v₁ − β_prev·v₀,   α = Re⟨v₁, A·v₁⟩
//! v₀ = v₁,   β = ‖w‖,   v₁ = w / β
//! ```
//!
//! and reports the new (α, β) pair. The buffers are reused in place, so
//! memory does not grow with the iteration count; this is what makes the
//! two-pass eigenvector reconstruction in [`crate::solvers`] worthwhile.
//!
//! The recurrence orthogonalizes only against the two most recent basis
//! vectors. In floating-point arithmetic this loses global orthogonality
//! after enough steps and can produce duplicate Ritz values for clustered
//! spectra; see the crate-level documentation.

use crate::convergence::BREAKDOWN_TOLERANCE;
use crate::error::{LanczosError, LanczosErrorKind};
use crate::operator::LinearOperator;
use crate::scalar::LanczosScalar;
use faer::{unzip, zip, Mat, MatRef};

/// The (α, β) pair produced by one recurrence step.
///
/// `beta` is the residual norm computed at the *end* of the step; a value at
/// or below the breakdown tolerance means the Krylov sequence is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct LanczosStep {
    pub alpha: f64,
    pub beta: f64,
}

/// Recurrence state: the two active basis vectors, the working buffer, the
/// previous β and the step counter.
#[derive(Debug)]
pub struct LanczosIteration<'a, T: LanczosScalar, O: LinearOperator<T>> {
    operator: &'a O,
    v_prev: Mat<T>,
    v_curr: Mat<T>,
    work: Mat<T>,
    beta_prev: f64,
    step: usize,
}

impl<'a, T: LanczosScalar, O: LinearOperator<T>> LanczosIteration<'a, T, O> {
    /// Initializes the recurrence from a start vector.
    ///
    /// The start vector is normalized into v₁; v₀ and w begin as zero. A
    /// start vector with numerically zero norm cannot seed a Krylov sequence
    /// and is rejected.
    pub fn new(operator: &'a O, start: MatRef<'_, T>) -> Result<Self, LanczosError> {
        let n = operator.nrows();
        debug_assert_eq!(start.nrows(), n);

        let norm = start.norm_l2();
        if norm <= BREAKDOWN_TOLERANCE {
            return Err(LanczosErrorKind::DegenerateStartVector.into());
        }

        let inv = T::from_real(norm.recip());
        let mut v_curr = Mat::<T>::zeros(n, 1);
        zip!(&mut v_curr, start).for_each(|unzip!(v, s)| *v = inv * *s);

        Ok(Self {
            operator,
            v_prev: Mat::zeros(n, 1),
            v_curr,
            work: Mat::zeros(n, 1),
            beta_prev: 0.0,
            step: 0,
        })
    }

    /// The current (normalized) basis vector v₁.
    ///
    /// The reconstruction pass reads this before each step to accumulate its
    /// weighted linear combinations; the basis vector itself is discarded as
    /// soon as the step runs.
    pub fn current(&self) -> MatRef<'_, T> {
        self.v_curr.as_ref()
    }

    /// Number of completed steps.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Performs one step of the three-term recurrence.
    ///
    /// On breakdown (returned `beta` at or below the tolerance) the working
    /// buffer is left unnormalized and the state must not be stepped again;
    /// the caller is expected to stop.
    pub fn next_step(&mut self) -> LanczosStep {
        // w = A·v1, the single operator application of this step.
        self.operator
            .apply(self.v_curr.as_ref(), self.work.as_mut());

        // α = Re⟨v1, w⟩. The real part discards rounding noise in the
        // imaginary component for complex Hermitian operators.
        let mut dot = T::from_real(0.0);
        zip!(&self.v_curr, &self.work)
            .for_each(|unzip!(v, w)| dot = dot + (*v).conj() * *w);
        let alpha = dot.real_part();

        // w -= α·v1 + β_prev·v0: orthogonalize against the two most recent
        // basis vectors only.
        let a = T::from_real(alpha);
        let b = T::from_real(self.beta_prev);
        zip!(&mut self.work, &self.v_curr, &self.v_prev)
            .for_each(|unzip!(w, v1, v0)| *w = *w - a * *v1 - b * *v0);

        // v0 <- v1. The old v0 contents now sit in v_curr and are
        // overwritten below (or abandoned on breakdown).
        std::mem::swap(&mut self.v_prev, &mut self.v_curr);

        let beta = self.work.norm_l2();
        if beta > BREAKDOWN_TOLERANCE {
            let inv = T::from_real(beta.recip());
            zip!(&mut self.v_curr, &self.work)
                .for_each(|unzip!(v, w)| *v = inv * *w);
        }

        self.beta_prev = beta;
        self.step += 1;

        log::trace!(
            "lanczos step {}: alpha = {:+.6e}, beta = {:.6e}",
            self.step,
            alpha,
            beta
        );

        LanczosStep { alpha, beta }
    }
}
