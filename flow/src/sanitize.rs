//! Netlist sanitization passes.
//!
//! Both passes are idempotent and total over the design's cell and net
//! collections: they either run to completion or (on panic) not at all, so a
//! partially sanitized design is never observable by the caller.

use netlist::{Design, Properties, Property, PropertyKind};
use tracing::{span, Level};

/// Annotation keys recording a previous tool's LUT-pairing decisions.
///
/// These encode which lookup-table primitives were packed into a shared
/// physical site. The pairings are invalid after this flow's transformations
/// and would mislead or crash a downstream re-optimization pass.
pub const LUT_PAIRING_KEYS: [&str; 3] = ["LUTNM", "HLUTNM", "SOFT_HLUTNM"];

/// The annotation key instructing downstream optimization to preserve an
/// entity unmodified.
pub const DONT_TOUCH: &str = "DONT_TOUCH";

/// Removes LUT-pairing annotations from every lookup-table primitive in the
/// design.
///
/// Non-LUT cells are untouched, and removal is best-effort per key: a LUT
/// cell carrying only a subset of [`LUT_PAIRING_KEYS`] is not an error.
pub fn remove_lut_pairing(design: &mut Design) {
    let _guard = span!(
        Level::INFO,
        "removing LUT pairing annotations",
        design.name = %design.name()
    )
    .entered();

    for cell in design.cells_mut() {
        if !cell.is_lut() {
            continue;
        }
        let name = cell.name().clone();
        for key in LUT_PAIRING_KEYS {
            if cell.properties_mut().remove(key).is_some() {
                tracing::debug!(cell.name = %name, key, "removed LUT pairing annotation");
            }
        }
    }
}

/// Marks every cell and every net in the design `DONT_TOUCH`.
///
/// The downstream tool's blackbox-update step must not optimize any cell or
/// net away; marking every entity, rather than only the top-level design,
/// defeats optimizations that could otherwise reach through an un-annotated
/// child. An entity already carrying `DONT_TOUCH`, whatever its value, keeps
/// its existing record.
pub fn harden_for_export(design: &mut Design) {
    let _guard = span!(
        Level::INFO,
        "marking design DONT_TOUCH for export",
        design.name = %design.name()
    )
    .entered();

    for cell in design.cells_mut() {
        mark_dont_touch(cell.properties_mut());
    }
    for net in design.nets_mut() {
        mark_dont_touch(net.properties_mut());
    }
}

fn mark_dont_touch(properties: &mut Properties) {
    if properties.has(DONT_TOUCH) {
        return;
    }
    properties
        .add(Property::new(DONT_TOUCH, PropertyKind::Edif, "TRUE"))
        .expect("DONT_TOUCH presence was just checked");
}

#[cfg(test)]
mod tests {
    use netlist::{Cell, CellKind, LibraryCell, Net, NetKind, PropertyKind};
    use test_log::test;

    use super::*;

    fn lut_pair_property(key: &'static str) -> Property {
        Property::new(key, PropertyKind::Design, "pair_a/b")
    }

    fn test_design() -> Design {
        let lut6 = LibraryCell::new("LUT6", CellKind::Lut { inputs: 6 });
        let fdre = LibraryCell::new("FDRE", CellKind::Register);

        let mut design = Design::new("top", "xc7a100tcsg324");
        design.add_cell(Cell::new("u_lut", &lut6));
        design.add_cell(Cell::new("u_reg", &fdre));
        design.add_net(Net::new("n0", NetKind::Wire));
        design
    }

    fn properties_snapshot(design: &Design) -> Vec<(String, String)> {
        let mut snapshot = Vec::new();
        for cell in design.cells() {
            for p in cell.properties().iter() {
                snapshot.push((format!("{}/{}", cell.name(), p.key), p.value.to_string()));
            }
        }
        for net in design.nets() {
            for p in net.properties().iter() {
                snapshot.push((format!("{}/{}", net.name(), p.key), p.value.to_string()));
            }
        }
        snapshot
    }

    #[test]
    fn removes_all_pairing_keys_from_luts() {
        let mut design = test_design();
        {
            let cell = design.cells_mut().find(|c| c.is_lut()).unwrap();
            for key in LUT_PAIRING_KEYS {
                cell.properties_mut().add(lut_pair_property(key)).unwrap();
            }
            cell.properties_mut()
                .add(Property::new("INIT", PropertyKind::Design, "64'h1"))
                .unwrap();
        }

        remove_lut_pairing(&mut design);

        let cell = design.cell_named("u_lut").unwrap();
        for key in LUT_PAIRING_KEYS {
            assert!(!cell.properties().has(key));
        }
        // Unrelated keys survive.
        assert!(cell.properties().has("INIT"));
    }

    #[test]
    fn pairing_removal_tolerates_partial_key_sets() {
        let mut design = test_design();
        design
            .cells_mut()
            .find(|c| c.is_lut())
            .unwrap()
            .properties_mut()
            .add(lut_pair_property("SOFT_HLUTNM"))
            .unwrap();

        remove_lut_pairing(&mut design);
        assert!(!design
            .cell_named("u_lut")
            .unwrap()
            .properties()
            .has("SOFT_HLUTNM"));
    }

    #[test]
    fn pairing_removal_ignores_non_lut_cells() {
        let mut design = test_design();
        design
            .cells_mut()
            .find(|c| !c.is_lut())
            .unwrap()
            .properties_mut()
            .add(lut_pair_property("LUTNM"))
            .unwrap();

        remove_lut_pairing(&mut design);
        // A pairing key on a non-LUT cell is nonsensical but not ours to fix.
        assert!(design.cell_named("u_reg").unwrap().properties().has("LUTNM"));
    }

    #[test]
    fn pairing_removal_is_idempotent() {
        let mut design = test_design();
        design
            .cells_mut()
            .find(|c| c.is_lut())
            .unwrap()
            .properties_mut()
            .add(lut_pair_property("LUTNM"))
            .unwrap();

        remove_lut_pairing(&mut design);
        let once = properties_snapshot(&design);
        remove_lut_pairing(&mut design);
        assert_eq!(once, properties_snapshot(&design));
    }

    #[test]
    fn hardening_marks_every_cell_and_net() {
        let mut design = test_design();
        harden_for_export(&mut design);

        for cell in design.cells() {
            let p = cell.properties().get(DONT_TOUCH).unwrap();
            assert_eq!(p.value, "TRUE");
            assert_eq!(p.kind, PropertyKind::Edif);
        }
        for net in design.nets() {
            assert_eq!(net.properties().get(DONT_TOUCH).unwrap().value, "TRUE");
        }
    }

    #[test]
    fn hardening_preserves_existing_dont_touch() {
        let mut design = test_design();
        design
            .cells_mut()
            .find(|c| c.is_lut())
            .unwrap()
            .properties_mut()
            .add(Property::new(DONT_TOUCH, PropertyKind::User, "FALSE"))
            .unwrap();

        harden_for_export(&mut design);

        let p = design
            .cell_named("u_lut")
            .unwrap()
            .properties()
            .get(DONT_TOUCH)
            .unwrap();
        assert_eq!(p.value, "FALSE");
        assert_eq!(p.kind, PropertyKind::User);
    }

    #[test]
    fn hardening_is_idempotent() {
        let mut design = test_design();
        harden_for_export(&mut design);
        let once = properties_snapshot(&design);
        harden_for_export(&mut design);
        assert_eq!(once, properties_snapshot(&design));
    }
}
