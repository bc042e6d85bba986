//! # gasnet-algo: Flow Optimization Engine
//!
//! Optimization algorithms for gas pipeline networks, with three objectives
//! (maximize throughput, minimize cost, balance utilization), each in two
//! renditions: a mathematical-programming formulation over the
//! `gasnet-solver` back-end abstraction, and a pure graph-algorithmic
//! variant that serves as reference oracle and fallback when no LP back-end
//! is wanted.
//!
//! # Structure
//!
//! - [`settings`]: run configuration recognized by every algorithm
//! - [`result`]: the result object all algorithms produce
//! - [`model`]: shared network-to-solver extraction and LP scaffolding
//! - [`pressure`]: pressure-squared coupling, piecewise linearization,
//!   post-hoc validation, independent upstream estimation
//! - [`compressor`]: activation/boost/fuel variables and staging heuristic
//! - [`tracer`]: upstream demand propagation, optimizer-independent
//! - [`graph`]: residual network shared by the graph-algorithmic variants
//! - [`algorithms`]: the six algorithm implementations and their trait
//! - [`validation`]: post-solution cross-checks against physics
//! - [`engine`]: registry, dispatch, batch entry points, reporting

pub mod algorithms;
pub mod compressor;
pub mod engine;
pub mod graph;
pub mod model;
pub mod pressure;
pub mod result;
pub mod settings;
pub mod test_utils;
pub mod tracer;
pub mod validation;

pub use algorithms::OptimizationAlgorithm;
pub use engine::OptimizationEngine;
pub use result::{
    CostBreakdown, NetworkMetrics, OptimizationResult, PointPressureRecord, SegmentFlowRecord,
    SolveStatus,
};
pub use settings::OptimizationSettings;
pub use tracer::{trace_required_flows, TraceReport};

use thiserror::Error;

/// Errors raised inside algorithms.
///
/// The engine converts every variant into an `Error`-status result at its
/// boundary; no partial result escapes without that conversion.
#[derive(Error, Debug)]
pub enum OptimizeError {
    /// Caller-supplied inputs were unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The network failed structural or physical validation
    #[error("Data validation: {0}")]
    DataValidation(String),

    /// No back-end with the requested id is registered
    #[error("Unknown solver back-end: {0}")]
    UnknownSolver(String),

    /// The back-end failed outright (not an infeasible/unbounded verdict)
    #[error("Solver failure: {0}")]
    Solver(String),

    /// Anything unforeseen inside an algorithm
    #[error("Internal error: {0}")]
    Internal(String),
}
