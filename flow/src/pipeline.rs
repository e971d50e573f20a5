//! Pipeline orchestration.
//!
//! The flow is a linear state machine over an explicit [`FlowContext`]:
//!
//! ```text
//! import -> route -> export
//! ```
//!
//! Checkpoint import/export failures are fatal and propagate to the caller.
//! Routing failures are handled by [`RouteFailurePolicy`]: under the default
//! [`ContinueToExport`](RouteFailurePolicy::ContinueToExport) policy the flow
//! guarantees an exported checkpoint is always produced, even for a
//! partially- or un-routed design.
//!
//! Sanitization and constraint injection happen in the export phase, after
//! routing: pairing annotations present at import time are still visible to
//! the router and are stripped only on the way out.

use std::path::Path;

use netlist::{CellLibrary, Design, Device};
use tracing::{span, Level};

use crate::route::{RouteError, Router};
use crate::{constraint, sanitize, Error};

/// The design and its reference data, passed through each flow phase.
#[derive(Clone, Debug)]
pub struct FlowContext {
    /// The design being transformed.
    pub design: Design,
    /// The device the design was placed against. Read-only.
    pub device: Device,
    /// The library of cells the design instantiates. Read-only.
    pub lib_cells: CellLibrary,
}

/// What to do when the router fails.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RouteFailurePolicy {
    /// Log the routing failure and export the design anyway.
    ///
    /// This is the default: the flow's contract is that an exported
    /// checkpoint is always produced, not that the exported design is fully
    /// routed.
    #[default]
    ContinueToExport,
    /// Propagate the routing failure and skip export.
    Abort,
}

/// Options for a flow run.
#[derive(Copy, Clone, Debug, Default)]
pub struct FlowOptions {
    /// The routing failure policy.
    pub on_route_failure: RouteFailurePolicy,
    /// Checkpoint load options.
    pub load: rscp::LoadOptions,
    /// Checkpoint write options.
    pub write: rscp::WriteOptions,
}

/// The outcome of the routing phase.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The router succeeded.
    Routed,
    /// The router failed and the failure was swallowed by policy.
    Failed(RouteError),
}

impl RouteOutcome {
    /// Returns `true` if the router succeeded.
    #[inline]
    pub fn is_routed(&self) -> bool {
        matches!(self, Self::Routed)
    }
}

/// A report on a completed flow run.
#[derive(Debug)]
pub struct FlowSummary {
    /// The outcome of the routing phase.
    pub route: RouteOutcome,
    /// The number of cells in the exported design.
    pub cells: usize,
    /// The number of nets in the exported design.
    pub nets: usize,
}

/// Imports the checkpoint at the given path.
///
/// Failure is I/O-class and fatal.
pub fn import(path: impl AsRef<Path>, options: rscp::LoadOptions) -> Result<FlowContext, Error> {
    let checkpoint = rscp::load(path, options)?;
    Ok(FlowContext {
        design: checkpoint.design,
        device: checkpoint.device,
        lib_cells: checkpoint.lib_cells,
    })
}

/// Invokes the router once, synchronously, applying the given failure policy.
///
/// Under [`RouteFailurePolicy::ContinueToExport`] a router failure is logged
/// and returned as [`RouteOutcome::Failed`]; under
/// [`RouteFailurePolicy::Abort`] it propagates as an error.
pub fn route<R: Router>(
    ctx: &mut FlowContext,
    router: &mut R,
    policy: RouteFailurePolicy,
) -> Result<RouteOutcome, Error> {
    let _guard = span!(Level::INFO, "routing design", design.name = %ctx.design.name()).entered();

    match router.route(&ctx.device, &mut ctx.design, &ctx.lib_cells) {
        Ok(()) => {
            tracing::info!("routing succeeded");
            Ok(RouteOutcome::Routed)
        }
        Err(e) => match policy {
            RouteFailurePolicy::Abort => Err(e.into()),
            RouteFailurePolicy::ContinueToExport => {
                tracing::error!(error = %e, "routing failed; continuing to export");
                Ok(RouteOutcome::Failed(e))
            }
        },
    }
}

/// Sanitizes the design and exports it to the given checkpoint path.
///
/// In order: LUT-pairing annotations are removed, every cell and net is
/// marked `DONT_TOUCH`, the port-DRC severity downgrades are injected, and
/// the checkpoint is written. Failure is I/O-class and fatal.
pub fn export(
    ctx: &mut FlowContext,
    path: impl AsRef<Path>,
    options: rscp::WriteOptions,
) -> Result<(), Error> {
    sanitize::remove_lut_pairing(&mut ctx.design);
    sanitize::harden_for_export(&mut ctx.design);
    constraint::relax_port_drc(&mut ctx.design);
    rscp::write(path, &ctx.design, &ctx.device, &ctx.lib_cells, options)?;
    Ok(())
}

/// Runs the full flow: import, route, export.
///
/// Returns a [`FlowSummary`] carrying the route outcome so callers can
/// report a swallowed routing failure without treating it as fatal.
pub fn run<R: Router>(
    router: &mut R,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: FlowOptions,
) -> Result<FlowSummary, Error> {
    let mut ctx = import(input, options.load)?;
    let outcome = route(&mut ctx, router, options.on_route_failure)?;
    export(&mut ctx, output, options.write)?;
    Ok(FlowSummary {
        route: outcome,
        cells: ctx.design.num_cells(),
        nets: ctx.design.num_nets(),
    })
}
