use std::fs;
use std::os::unix::prelude::PermissionsExt;
use std::path::Path;
use std::process::Command;

use crate::error::Error;

/// Runs the given script under bash from `work_dir`, capturing stdout and
/// stderr to `route.out` and `route.err` next to it.
pub fn run_script(script: impl AsRef<Path>, work_dir: impl AsRef<Path>) -> Result<(), Error> {
    let script = script.as_ref();
    let work_dir = work_dir.as_ref();

    let out_file = fs::File::create(work_dir.join("route.out")).map_err(Error::Io)?;
    let err_file = fs::File::create(work_dir.join("route.err")).map_err(Error::Io)?;

    make_executable(script)?;

    let status = Command::new("/usr/bin/bash")
        .arg(script)
        .current_dir(work_dir)
        .stdout(out_file)
        .stderr(err_file)
        .status()
        .map_err(Error::Io)?;

    if !status.success() {
        return Err(Error::Router(status));
    }

    Ok(())
}

pub fn make_executable(path: &Path) -> Result<(), Error> {
    let mut perms = fs::metadata(path).map_err(Error::Io)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).map_err(Error::Io)?;
    Ok(())
}
