//! Scalar types accepted by the Lanczos recurrence.
//!
//! The recurrence runs over the operator's coefficient type, which may be real
//! or complex, but a Hermitian operator projected onto its Krylov basis is
//! always a *real* tridiagonal matrix. The [`LanczosScalar`] trait captures
//! exactly the small amount of arithmetic the recurrence needs on top of
//! [`faer::traits::ComplexField`]: lifting a real coefficient into the scalar
//! type, taking the real part of an inner product, conjugation, and drawing a
//! reproducible normally-distributed sample for the default start vector.
//!
//! The crate fixes the real field to `f64`. Single precision is known to be
//! numerically unreliable for the plain (non-reorthogonalizing) recurrence.

use faer::{c64, traits::ComplexField};
use rand::Rng;
use rand_distr::StandardNormal;
use std::ops::{Add, Mul, Neg, Sub};

/// Coefficient type of a symmetric/Hermitian linear operator.
///
/// Implemented for `f64` (symmetric real operators) and [`faer::c64`]
/// (Hermitian complex operators). The Lanczos coefficients α and β are stored
/// as `f64` regardless of the implementing type.
pub trait LanczosScalar:
    ComplexField<Real = f64>
    + Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Embeds a real coefficient into the scalar type.
    fn from_real(value: f64) -> Self;

    /// Real part of the scalar.
    ///
    /// Used for the diagonal coefficient α = Re⟨v, Av⟩, which is real by
    /// construction for a Hermitian operator; taking the real part discards
    /// only rounding noise in the imaginary component.
    fn real_part(self) -> f64;

    /// Complex conjugate, with the convention `⟨x, y⟩ = conj(x)·y`.
    fn conj(self) -> Self;

    /// Draws one coefficient of a random start vector from the given
    /// generator. Complex scalars consume two samples (real and imaginary
    /// part), so the stream position depends only on how many coefficients
    /// were drawn.
    fn sample_normal<R: Rng>(rng: &mut R) -> Self;
}

impl LanczosScalar for f64 {
    #[inline]
    fn from_real(value: f64) -> Self {
        value
    }

    #[inline]
    fn real_part(self) -> f64 {
        self
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl LanczosScalar for c64 {
    #[inline]
    fn from_real(value: f64) -> Self {
        c64::new(value, 0.0)
    }

    #[inline]
    fn real_part(self) -> f64 {
        self.re
    }

    #[inline]
    fn conj(self) -> Self {
        c64::new(self.re, -self.im)
    }

    #[inline]
    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        c64::new(re, im)
    }
}
