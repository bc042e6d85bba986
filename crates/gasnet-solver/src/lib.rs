//! # gasnet-solver: Mathematical-Programming Back-Ends
//!
//! A uniform interface over linear/mixed-integer back-ends plus two
//! implementations:
//!
//! - [`SimplexBackend`]: an in-process two-phase simplex with
//!   branch-and-bound over boolean variables. No external dependency, exact
//!   integrality, honors the wall-clock limit.
//! - [`ClarabelBackend`]: an adapter over `good_lp` with the Clarabel conic
//!   solver. Booleans are relaxed and rounded.
//!
//! Formulations build models through [`LpBackend`] only; the back-end is
//! picked at runtime through [`SolverRegistry`]. Variable and constraint ids
//! are assigned in creation order, so identical formulation code produces
//! identical models on every run.

mod backend;
mod clarabel;
mod registry;
mod simplex;

pub use backend::{ConstraintId, LpBackend, LpStatus, VarId};
pub use clarabel::ClarabelBackend;
pub use registry::SolverRegistry;
pub use simplex::SimplexBackend;
