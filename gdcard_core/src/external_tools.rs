// SPDX-License-Identifier: GPL-3.0
// external_tools.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// This module contains the default implementation, which runs the real command
/// line tools as child processes. There may be others in future.
pub mod system_tools;

/// Tag passed to the header dumper for the bootstrap meta block.
pub const HEADER_TAG: &str = "ip.bin";

/// Parameters for authoring the bootable menu image.
#[derive(Clone, Debug)]
pub struct AuthoringParams {

    // Volume label written into the ISO-9660 descriptor.
    pub volume_id: String,

    // Boot sector blob (IP.BIN) placed in the system area.
    pub boot_sector: PathBuf,

    // Directory whose contents become the image payload.
    pub payload_dir: PathBuf,

    // Raw image file to produce.
    pub output: PathBuf,
}

/// This trait provides an implementation-opaque way of calling the external tools
/// the build depends on. Every call blocks until the tool is done, and a tool that
/// reports failure comes back as an error.
pub trait ExternalTools {

    /// Implementations must unpack the archive into the destination directory.
    fn extract_archive(&mut self, archive: &Path, dest: &Path) -> Result<()>;

    /// Implementations must rip the disc image into per-track files inside the
    /// destination directory.
    fn rip_image(&mut self, image: &Path, dest: &Path) -> Result<()>;

    /// Implementations must write the header region named by the tag into a file of
    /// that name, alongside the image. The path of that file is returned.
    fn dump_header(&mut self, image: &Path, tag: &str) -> Result<PathBuf>;

    /// Implementations must author a raw bootable disc image.
    fn author_image(&mut self, params: &AuthoringParams) -> Result<()>;

    /// Implementations must convert a raw disc image into the device-native format.
    fn convert_image(&mut self, raw: &Path, dest: &Path) -> Result<()>;

    /// Implementations must confirm every tool they rely on can be run, returning
    /// `ToolMissing` for the first that cannot.
    fn check_installed(&self) -> Result<()>;
}
