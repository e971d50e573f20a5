//! Checkpoint import and export.
//!
//! A checkpoint is a directory holding the serialized design alongside the
//! device and cell-library reference data it was placed against, one JSON
//! section per file:
//!
//! - `design.json`: the [`Design`], including placement, routing state,
//!   per-entity properties, and the constraint sequence.
//! - `device.json`: the [`Device`] descriptor.
//! - `cell_library.json`: the [`CellLibrary`].
//!
//! Loading yields all three as a [`Checkpoint`]; writing serializes them back
//! out. All failures here are I/O-class: a missing, corrupt, or unreadable
//! checkpoint is reported as an [`Error`] and callers are expected to treat
//! it as fatal.
#![warn(missing_docs)]

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use netlist::{CellLibrary, Design, Device};
use tracing::{span, Level};

/// The design section file name within a checkpoint directory.
pub const DESIGN_FILE: &str = "design.json";
/// The device section file name within a checkpoint directory.
pub const DEVICE_FILE: &str = "device.json";
/// The cell-library section file name within a checkpoint directory.
pub const CELL_LIBRARY_FILE: &str = "cell_library.json";

/// The error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The checkpoint or one of its sections could not be read or written.
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A checkpoint section could not be serialized or deserialized.
    #[error("malformed checkpoint section: {0}")]
    Json(#[from] serde_json::Error),
    /// The given path does not point at a checkpoint directory.
    #[error("not a checkpoint directory: {0}")]
    NotACheckpoint(PathBuf),
}

/// The contents of a loaded checkpoint.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    /// The design.
    pub design: Design,
    /// The device the design was placed against.
    pub device: Device,
    /// The library of cells the design instantiates.
    pub lib_cells: CellLibrary,
}

/// Options controlling how much of a checkpoint is loaded.
#[derive(Copy, Clone, Debug)]
pub struct LoadOptions {
    /// Load cell placements. When `false`, all cells are left unplaced.
    pub placement: bool,
    /// Load net routes. When `false`, all nets are left unrouted.
    pub routing: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            placement: true,
            routing: true,
        }
    }
}

/// Options controlling how much of a design is written to a checkpoint.
#[derive(Copy, Clone, Debug)]
pub struct WriteOptions {
    /// Write net routes. When `false`, the exported design is unrouted.
    pub routing: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { routing: true }
    }
}

fn read_section<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T, Error> {
    let file = fs::File::open(dir.join(file))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn write_section<T: serde::Serialize>(dir: &Path, file: &str, value: &T) -> Result<(), Error> {
    let file = fs::File::create(dir.join(file))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

/// Loads the checkpoint at the given path.
///
/// Fails with an I/O-class [`Error`] if the checkpoint is missing, corrupt,
/// or unreadable.
pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Checkpoint, Error> {
    let path = path.as_ref();
    let _guard = span!(Level::INFO, "loading checkpoint", path = %path.display()).entered();

    if !path.is_dir() {
        return Err(Error::NotACheckpoint(path.to_path_buf()));
    }

    let mut design: Design = read_section(path, DESIGN_FILE)?;
    let device: Device = read_section(path, DEVICE_FILE)?;
    let lib_cells: CellLibrary = read_section(path, CELL_LIBRARY_FILE)?;

    if !options.placement {
        for cell in design.cells_mut() {
            cell.unplace();
        }
    }
    if !options.routing {
        for net in design.nets_mut() {
            net.unroute();
        }
    }

    tracing::info!(
        design.name = %design.name(),
        cells = design.num_cells(),
        nets = design.num_nets(),
        "loaded checkpoint"
    );

    Ok(Checkpoint {
        design,
        device,
        lib_cells,
    })
}

/// Writes a checkpoint to the given path.
///
/// The directory and its parents are created if necessary; existing section
/// files are overwritten.
pub fn write(
    path: impl AsRef<Path>,
    design: &Design,
    device: &Device,
    lib_cells: &CellLibrary,
    options: WriteOptions,
) -> Result<(), Error> {
    let path = path.as_ref();
    let _guard = span!(Level::INFO, "writing checkpoint", path = %path.display()).entered();

    fs::create_dir_all(path)?;

    if options.routing {
        write_section(path, DESIGN_FILE, design)?;
    } else {
        let mut unrouted = design.clone();
        for net in unrouted.nets_mut() {
            net.unroute();
        }
        write_section(path, DESIGN_FILE, &unrouted)?;
    }
    write_section(path, DEVICE_FILE, device)?;
    write_section(path, CELL_LIBRARY_FILE, lib_cells)?;

    tracing::info!(
        design.name = %design.name(),
        cells = design.num_cells(),
        nets = design.num_nets(),
        "wrote checkpoint"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use netlist::{Cell, CellKind, LibraryCell, Net, NetKind};
    use test_log::test;

    use super::*;

    fn test_checkpoint() -> Checkpoint {
        let lut6 = LibraryCell::new("LUT6", CellKind::Lut { inputs: 6 });
        let mut lib_cells = CellLibrary::new();
        lib_cells.add(lut6.clone());

        let mut design = Design::new("top", "xc7a100tcsg324");
        let mut cell = Cell::new("u_lut", &lut6);
        cell.place("SLICE_X0Y0");
        design.add_cell(cell);
        let mut net = Net::new("n0", NetKind::Wire);
        net.set_route(vec![arcstr::literal!("w0"), arcstr::literal!("w1")]);
        design.add_net(net);

        Checkpoint {
            design,
            device: Device::new("xc7a100tcsg324", "artix7"),
            lib_cells,
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.rscp");
        let cp = test_checkpoint();

        write(
            &path,
            &cp.design,
            &cp.device,
            &cp.lib_cells,
            WriteOptions::default(),
        )
        .unwrap();
        let loaded = load(&path, LoadOptions::default()).unwrap();

        assert_eq!(loaded.design.name(), "top");
        assert_eq!(loaded.device, cp.device);
        let cell = loaded.design.cell_named("u_lut").unwrap();
        assert!(cell.is_lut());
        assert_eq!(cell.site().unwrap(), "SLICE_X0Y0");
        assert!(loaded.design.net_named("n0").unwrap().is_routed());
    }

    #[test]
    fn load_flags_strip_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.rscp");
        let cp = test_checkpoint();
        write(
            &path,
            &cp.design,
            &cp.device,
            &cp.lib_cells,
            WriteOptions::default(),
        )
        .unwrap();

        let loaded = load(
            &path,
            LoadOptions {
                placement: false,
                routing: false,
            },
        )
        .unwrap();
        assert!(loaded.design.cell_named("u_lut").unwrap().site().is_none());
        assert!(!loaded.design.net_named("n0").unwrap().is_routed());
    }

    #[test]
    fn missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nonexistent.rscp"), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotACheckpoint(_)));
    }
}
