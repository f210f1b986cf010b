// SPDX-License-Identifier: GPL-3.0
// system_tools.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;

use super::{AuthoringParams, ExternalTools};
use crate::error::{BuildError, Result};

/// Sector the menu session starts at on the emulated disc, as expected by mkisofs.
const MENU_SESSION_SECTORS: &str = "0,11702";

/// This struct names the program used for each external tool. Each entry may be a
/// bare name looked up on PATH, or a path to an executable.
#[derive(Clone, Debug)]
pub struct ToolPrograms {
    pub unzip: OsString,
    pub cdirip: OsString,
    pub gditools: OsString,
    pub mkisofs: OsString,
    pub cdi4dc: OsString,
}

impl ToolPrograms {

    /// Returns the usual program names for every tool.
    pub fn defaults() -> Self {
        ToolPrograms {
            unzip: "unzip".into(),
            cdirip: "cdirip".into(),
            gditools: "gditools.py".into(),
            mkisofs: "mkisofs".into(),
            cdi4dc: "cdi4dc".into(),
        }
    }

    fn all(&self) -> [&OsString; 5] {
        [&self.unzip, &self.cdirip, &self.gditools, &self.mkisofs, &self.cdi4dc]
    }
}

/// This struct runs the real command line tools as child processes.
pub struct SystemTools {
    programs: ToolPrograms,
}

impl SystemTools {

    /// Creates a new tool runner for the given programs.
    pub fn new(programs: ToolPrograms) -> Self {
        SystemTools { programs }
    }

    /// Runs the command to completion, turning a non-zero exit into an error naming
    /// the command line.
    fn run(&self, mut command: Command) -> Result<()> {

        let command_line = format!("{:?}", command);
        debug!("running {}", command_line);

        let status = command
            .status()
            .map_err(|_| BuildError::ToolMissing(command.get_program().to_string_lossy().into_owned()))?;

        if status.success() {
            Ok(())
        } else {
            Err(BuildError::ToolFailed {
                command: command_line,
                status: status.to_string(),
            })
        }
    }
}

impl ExternalTools for SystemTools {

    fn extract_archive(&mut self, archive: &Path, dest: &Path) -> Result<()> {

        let mut command = Command::new(&self.programs.unzip);
        command.arg("-qq").arg("-o").arg(archive).arg("-d").arg(dest);

        // Any unzip failure may mean a full card, so it is never skipped over.
        self.run(command)
            .map_err(|_| BuildError::ExtractionFailed(archive.to_path_buf()))
    }

    fn rip_image(&mut self, image: &Path, dest: &Path) -> Result<()> {

        let mut command = Command::new(&self.programs.cdirip);
        command.arg(image).arg(dest).arg("-iso");
        self.run(command)
    }

    fn dump_header(&mut self, image: &Path, tag: &str) -> Result<PathBuf> {

        let mut command = Command::new(&self.programs.gditools);
        command.arg("-i").arg(image).arg("-b").arg(tag);
        self.run(command)?;

        let dir = image.parent().unwrap_or(Path::new("."));
        Ok(dir.join(tag))
    }

    fn author_image(&mut self, params: &AuthoringParams) -> Result<()> {

        let mut command = Command::new(&self.programs.mkisofs);
        command
            .arg("-C").arg(MENU_SESSION_SECTORS)
            .arg("-V").arg(&params.volume_id)
            .arg("-G").arg(&params.boot_sector)
            .arg("-r")
            .arg("-J")
            .arg("-l")
            .arg("-o").arg(&params.output)
            .arg(&params.payload_dir);
        self.run(command)
    }

    fn convert_image(&mut self, raw: &Path, dest: &Path) -> Result<()> {

        let mut command = Command::new(&self.programs.cdi4dc);
        command.arg(raw).arg(dest);
        self.run(command)
    }

    fn check_installed(&self) -> Result<()> {

        for program in self.programs.all() {
            if find_program(program).is_none() {
                return Err(BuildError::ToolMissing(program.to_string_lossy().into_owned()));
            }
        }
        Ok(())
    }
}

/// Resolves a program the same way the shell would: a name with a path separator is
/// taken as-is, anything else is searched for along PATH.
pub fn find_program(program: &OsString) -> Option<PathBuf> {

    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(candidate))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
