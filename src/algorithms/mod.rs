//! Low-level building blocks of the Lanczos process.
//!
//! The [`lanczos`] submodule contains the stateful three-term recurrence.
//! Most users should go through [`crate::solvers`], which drives the
//! recurrence, applies a convergence criterion and handles the two-pass
//! eigenvector reconstruction; this module is the place to look when
//! fine-grained control over individual recurrence steps is required.

pub mod lanczos;

pub use lanczos::{LanczosIteration, LanczosStep};
