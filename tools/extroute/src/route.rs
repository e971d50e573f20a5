use crate::error::Error;
use crate::utils::run_script;
use crate::TEMPLATES;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use flow::route::{RouteError, Router};
use netlist::{CellLibrary, Design, Device};
use regex::Regex;
use serde::Serialize;
use tera::Context;

/// Parameters for one router invocation.
pub struct RouteParams<'a> {
    /// The router executable, resolved on `PATH` if not absolute.
    pub router_cmd: &'a str,
    /// The scratch directory for the checkpoint, run script, and reports.
    pub work_dir: &'a Path,
}

#[derive(Serialize)]
struct RouteScriptContext<'a> {
    router_cmd: &'a str,
    checkpoint_path: &'a Path,
    report_path: &'a Path,
}

/// Paths generated for one router invocation.
pub struct RouteGeneratedPaths {
    pub script_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub report_path: PathBuf,
}

/// The parsed contents of a router summary report.
#[derive(Debug)]
pub struct RouteReport {
    /// The number of nets the router routed.
    pub routed: u32,
    /// The total number of nets the router considered.
    pub total: u32,
    /// The names of nets the router could not route.
    pub unroutable: Vec<String>,
}

/// Writes the scratch checkpoint and run script for one router invocation.
pub fn write_route_files(
    params: &RouteParams,
    design: &Design,
    device: &Device,
    lib_cells: &CellLibrary,
) -> Result<RouteGeneratedPaths, Error> {
    fs::create_dir_all(params.work_dir).map_err(Error::Io)?;

    let checkpoint_path = params.work_dir.join("design.rscp");
    let report_path = params.work_dir.join("route.rpt");
    let script_path = params.work_dir.join("run_route.sh");

    rscp::write(
        &checkpoint_path,
        design,
        device,
        lib_cells,
        rscp::WriteOptions::default(),
    )
    .map_err(Error::Checkpoint)?;

    let context = RouteScriptContext {
        router_cmd: params.router_cmd,
        checkpoint_path: &checkpoint_path,
        report_path: &report_path,
    };
    let context = Context::from_serialize(context).map_err(Error::Tera)?;

    let contents = TEMPLATES
        .render("run_route.sh", &context)
        .map_err(Error::Tera)?;

    fs::write(&script_path, contents).map_err(Error::Io)?;

    Ok(RouteGeneratedPaths {
        script_path,
        checkpoint_path,
        report_path,
    })
}

/// Parses a router summary report.
///
/// The report carries one `Routed <n> of <m> nets` line and one
/// `Unroutable net: <name>` line per failed net.
pub fn parse_route_report(path: impl AsRef<Path>) -> Result<RouteReport, Error> {
    let totals = Regex::new(r"^Routed (\d+) of (\d+) nets").unwrap();
    let unroutable = Regex::new(r"^Unroutable net: (.+)$").unwrap();

    let file = fs::File::open(&path).map_err(Error::Io)?;
    let mut report = RouteReport {
        routed: 0,
        total: 0,
        unroutable: Vec::new(),
    };
    for line in io::BufReader::new(file).lines() {
        let line = line.map_err(Error::Io)?;
        if let Some(caps) = totals.captures(&line) {
            report.routed = caps.get(1).unwrap().as_str().parse().unwrap();
            report.total = caps.get(2).unwrap().as_str().parse().unwrap();
        } else if let Some(caps) = unroutable.captures(&line) {
            report.unroutable.push(caps.get(1).unwrap().as_str().to_string());
        }
    }
    Ok(report)
}

/// A [`Router`] backed by a standalone routing executable.
///
/// The design is round-tripped through a scratch checkpoint in the working
/// directory: the router routes the checkpoint in place, and the routed
/// design read back from it replaces the in-memory design.
pub struct ExternalRouter {
    cmd: String,
    work_dir: PathBuf,
}

impl ExternalRouter {
    /// Creates a router invoking the given command with the given scratch
    /// directory.
    pub fn new(cmd: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            work_dir: work_dir.into(),
        }
    }

    fn run(
        &self,
        design: &mut Design,
        device: &Device,
        lib_cells: &CellLibrary,
    ) -> Result<RouteReport, Error> {
        let params = RouteParams {
            router_cmd: &self.cmd,
            work_dir: &self.work_dir,
        };
        let paths = write_route_files(&params, design, device, lib_cells)?;
        run_script(&paths.script_path, &self.work_dir)?;

        let routed = rscp::load(&paths.checkpoint_path, rscp::LoadOptions::default())
            .map_err(Error::Checkpoint)?;
        *design = routed.design;

        parse_route_report(&paths.report_path)
    }
}

impl Router for ExternalRouter {
    fn route(
        &mut self,
        device: &Device,
        design: &mut Design,
        lib_cells: &CellLibrary,
    ) -> Result<(), RouteError> {
        let report = self.run(design, device, lib_cells)?;
        if let Some(net) = report.unroutable.first() {
            return Err(RouteError::Infeasible(net.as_str().into()));
        }
        Ok(())
    }
}

impl From<Error> for RouteError {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(e) => RouteError::Io(e),
            other => RouteError::Internal(anyhow::Error::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netlist::{Cell, CellKind, LibraryCell, Net, NetKind};

    #[test]
    fn test_parse_route_report() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let rpt_path = dir.path().join("route.rpt");
        fs::write(
            &rpt_path,
            "Router version 1.3\n\
             Routed 12 of 14 nets\n\
             Unroutable net: u_alu/carry[3]\n\
             Unroutable net: u_alu/carry[4]\n",
        )?;

        let report = parse_route_report(&rpt_path)?;
        assert_eq!(report.routed, 12);
        assert_eq!(report.total, 14);
        assert_eq!(
            report.unroutable,
            vec!["u_alu/carry[3]", "u_alu/carry[4]"]
        );
        Ok(())
    }

    #[test]
    fn test_write_route_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let work_dir = dir.path().join("route");

        let lut6 = LibraryCell::new("LUT6", CellKind::Lut { inputs: 6 });
        let mut lib_cells = CellLibrary::new();
        lib_cells.add(lut6.clone());
        let mut design = Design::new("top", "xc7a100tcsg324");
        design.add_cell(Cell::new("u_lut", &lut6));
        design.add_net(Net::new("n0", NetKind::Wire));
        let device = Device::new("xc7a100tcsg324", "artix7");

        let paths = write_route_files(
            &RouteParams {
                router_cmd: "rsvroute",
                work_dir: &work_dir,
            },
            &design,
            &device,
            &lib_cells,
        )?;

        let script = fs::read_to_string(&paths.script_path)?;
        assert!(script.contains("rsvroute"));
        assert!(script.contains("design.rscp"));
        assert!(paths.checkpoint_path.is_dir());
        Ok(())
    }
}
