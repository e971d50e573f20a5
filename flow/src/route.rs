//! The routing seam.
//!
//! The router is an opaque collaborator: it is handed the full
//! (device, design, cell library) triple once per flow run and mutates the
//! design's routing state in place. Its failures are routing-class: the
//! orchestrator decides, by policy, whether they abort the flow (see
//! [`RouteFailurePolicy`](crate::RouteFailurePolicy)).

use arcstr::ArcStr;
use netlist::{CellLibrary, Design, Device};

/// A routing-class error.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The router found no feasible route for the given net.
    #[error("no feasible route for net `{0}`")]
    Infeasible(ArcStr),
    /// The router failed reading or writing its working data.
    #[error("router I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Any other router failure.
    #[error("router failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A routing component.
///
/// Implementations mutate the design's routing state in place and report
/// infeasibility (or any other failure) through the returned [`RouteError`].
/// Routers are invoked synchronously and never concurrently with other
/// mutations of the same design.
pub trait Router {
    /// Routes the given design.
    fn route(
        &mut self,
        device: &Device,
        design: &mut Design,
        lib_cells: &CellLibrary,
    ) -> Result<(), RouteError>;
}
