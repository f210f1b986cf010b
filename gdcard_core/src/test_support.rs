// SPDX-License-Identifier: GPL-3.0
// test_support.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Shared helpers for the unit tests: scratch directories, header fixtures and a
// fake set of external tools that simulates the real ones by writing files.

use std::{
    collections::HashMap,
    env,
    fs,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::disc_header::HEADER_SIZE;
use crate::error::{BuildError, Result};
use crate::external_tools::{AuthoringParams, ExternalTools};

static NEXT_SCRATCH: AtomicUsize = AtomicUsize::new(0);

/// A uniquely named directory under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {

    pub fn new(label: &str) -> Self {
        let unique = NEXT_SCRATCH.fetch_add(1, Ordering::SeqCst);
        let path = env::temp_dir().join(format!("gdcard_{}_{}_{}", label, process::id(), unique));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        ScratchDir { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mkdir(&self, name: &str) -> PathBuf {
        let dir = self.path.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}

impl Drop for ScratchDir {

    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Builds a 256-byte header with each field space-padded (or cut) to its width.
pub fn header_fixture(
    name: &str,
    disc: &str,
    vga: &str,
    region: &str,
    version: &str,
    date: &str,
) -> Vec<u8> {

    let mut blob = vec![b' '; HEADER_SIZE];
    blob[..16].copy_from_slice(b"SEGA SEGAKATANA ");

    let mut put = |offset: usize, length: usize, value: &str| {
        let bytes = value.as_bytes();
        let count = bytes.len().min(length);
        blob[offset..offset + count].copy_from_slice(&bytes[..count]);
    };
    put(0x2B, 3, disc);
    put(0x30, 8, region);
    put(0x3D, 1, vga);
    put(0x4A, 6, version);
    put(0x50, 8, date);
    put(0x80, 128, name);

    blob
}

/// Files a fake archive unpacks to, as (relative path, contents) pairs.
pub type ArchiveContents = Vec<(String, Vec<u8>)>;

/// Fake external tools. Archives are registered by file name; a disc image's own
/// bytes stand in for its header, so "dumping" or "ripping" simply copies them.
#[derive(Default)]
pub struct FakeTools {
    pub archives: HashMap<String, ArchiveContents>,
    pub calls: Vec<String>,
    pub fail_extract: bool,
    pub missing_tool: Option<String>,
    pub authored: Vec<AuthoringParams>,
}

impl FakeTools {

    pub fn new() -> Self {
        FakeTools::default()
    }

    pub fn add_archive(&mut self, name: &str, contents: ArchiveContents) {
        self.archives.insert(name.to_string(), contents);
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|call| call.starts_with(prefix)).count()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ExternalTools for FakeTools {

    fn extract_archive(&mut self, archive: &Path, dest: &Path) -> Result<()> {

        let name = file_name(archive);
        self.calls.push(format!("extract {}", name));
        if self.fail_extract {
            return Err(BuildError::ExtractionFailed(archive.to_path_buf()));
        }

        let contents = self.archives.get(&name).cloned().unwrap_or_default();
        for (relative, bytes) in contents {
            let path = dest.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, bytes).unwrap();
        }
        Ok(())
    }

    fn rip_image(&mut self, image: &Path, dest: &Path) -> Result<()> {

        self.calls.push(format!("rip {}", file_name(image)));
        fs::create_dir_all(dest).unwrap();
        fs::write(dest.join("track01.iso"), vec![0_u8; 64]).unwrap();
        fs::write(dest.join("track02.wav"), vec![1_u8; 64]).unwrap();
        fs::write(dest.join("track03.iso"), fs::read(image).unwrap()).unwrap();
        Ok(())
    }

    fn dump_header(&mut self, image: &Path, tag: &str) -> Result<PathBuf> {

        self.calls.push(format!("dump {}", file_name(image)));
        let output = image.parent().unwrap().join(tag);
        fs::write(&output, fs::read(image).unwrap()).unwrap();
        Ok(output)
    }

    fn author_image(&mut self, params: &AuthoringParams) -> Result<()> {

        self.calls.push(format!("author {}", params.volume_id));
        let mut listing: Vec<String> = fs::read_dir(&params.payload_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        listing.sort();
        let mut output = format!("{}\n--\n", listing.join("\n")).into_bytes();
        output.extend(fs::read(params.payload_dir.join("LIST.INI")).unwrap_or_default());
        fs::write(&params.output, output).unwrap();
        self.authored.push(params.clone());
        Ok(())
    }

    fn convert_image(&mut self, raw: &Path, dest: &Path) -> Result<()> {

        self.calls.push(format!("convert {}", file_name(raw)));
        fs::copy(raw, dest).unwrap();
        Ok(())
    }

    fn check_installed(&self) -> Result<()> {
        match &self.missing_tool {
            Some(tool) => Err(BuildError::ToolMissing(tool.clone())),
            None => Ok(()),
        }
    }
}
