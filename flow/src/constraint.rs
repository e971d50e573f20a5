//! Physical/DRC constraint injection.

use netlist::{Constraint, Design};

/// Appends one constraint record to the design's constraint sequence.
///
/// The constraint body is opaque to this flow: no validation, no duplicate
/// detection. Injection order is preserved end-to-end into the exported
/// checkpoint.
pub fn inject(design: &mut Design, constraint: Constraint) {
    tracing::debug!(constraint = %constraint, "injecting constraint");
    design.add_constraint(constraint);
}

/// Downgrades the unconstrained-port DRC checks from error to warning
/// severity.
///
/// The exported design intentionally leaves top-level ports without location
/// and I/O-standard constraints; at their default severity, the `NSTD-1` and
/// `UCIO-1` checks would abort the downstream flow over exactly that. Two
/// severity constraints are injected, always in the same order.
pub fn relax_port_drc(design: &mut Design) {
    inject(
        design,
        Constraint::new("set_property", "SEVERITY {Warning} [get_drc_checks NSTD-1]"),
    );
    inject(
        design,
        Constraint::new("set_property", "SEVERITY {Warning} [get_drc_checks UCIO-1]"),
    );
}
