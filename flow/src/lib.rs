//! Post-placement netlist sanitization and checkpoint export flow.
//!
//! Takes a placed (and possibly routed) checkpoint, strips netlist
//! annotations that would mislead a downstream re-optimization pass, hands
//! the design to a router, and re-exports it as a checkpoint with the
//! physical/DRC constraints the downstream flow needs injected.
//!
//! The flow is strictly linear and synchronous: import, route, export. The
//! sanitization passes and constraint injection run in the export phase; see
//! [`pipeline`] for the ordering contract and the routing failure policy.
#![warn(missing_docs)]

pub mod constraint;
pub mod pipeline;
pub mod route;
pub mod sanitize;

pub use pipeline::{FlowContext, FlowOptions, FlowSummary, RouteFailurePolicy, RouteOutcome};
pub use route::{RouteError, Router};

/// The error type for flow operations.
///
/// Routing-class errors appear here only under
/// [`RouteFailurePolicy::Abort`]; the default policy logs and swallows them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A checkpoint could not be imported or exported. Always fatal.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] rscp::Error),
    /// The router failed and the failure policy is [`RouteFailurePolicy::Abort`].
    #[error("routing error: {0}")]
    Route(#[from] route::RouteError),
}
