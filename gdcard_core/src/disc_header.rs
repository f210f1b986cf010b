// SPDX-License-Identifier: GPL-3.0
// disc_header.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fmt,
    fs::File,
    io::Read,
    path::Path,
};

use gdcard_utility::ByteField;

use crate::error::{BuildError, IoContext, Result};

/// Size of the disc header region in bytes.
pub const HEADER_SIZE: usize = 256;

// Field positions within the header, as (offset, length) pairs.
const DISC_INFO_FIELD: (usize, usize) = (0x2B, 3);
const REGION_FIELD: (usize, usize) = (0x30, 8);
const VGA_FIELD: (usize, usize) = (0x3D, 1);
const VERSION_FIELD: (usize, usize) = (0x4A, 6);
const DATE_FIELD: (usize, usize) = (0x50, 8);
const NAME_FIELD: (usize, usize) = (0x80, 128);

/// This struct models the six menu-relevant fields of a Dreamcast disc header
/// (the meta block at the start of IP.BIN).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscHeader {

    // Software name, trimmed.
    pub name: String,

    // Disc number and total, e.g. "1/2".
    pub disc_info: String,

    // VGA support flag, '1' or '0'.
    pub vga_info: String,

    // Area symbols with all whitespace removed, e.g. "JUE".
    pub region: String,

    // Product version, e.g. "V1.000".
    pub version: String,

    // Release date as YYYYMMDD.
    pub date: String,
}

/// The three area symbols a disc can be marked for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Area {
    Japan,
    Usa,
    Europe,
}

/// Implementation functions for the disc header.
impl DiscHeader {

    /// Parses the header out of the supplied blob. The blob must hold at least
    /// `HEADER_SIZE` bytes; anything after that is ignored.
    pub fn parse(blob: &[u8]) -> Option<Self> {

        if blob.len() < HEADER_SIZE {
            return None;
        }
        let blob = &blob[..HEADER_SIZE];

        Some(DiscHeader {
            name: blob.trimmed_field(NAME_FIELD.0, NAME_FIELD.1)?,
            disc_info: blob.raw_field(DISC_INFO_FIELD.0, DISC_INFO_FIELD.1)?,
            vga_info: blob.raw_field(VGA_FIELD.0, VGA_FIELD.1)?,
            region: blob.stripped_field(REGION_FIELD.0, REGION_FIELD.1)?,
            version: blob.raw_field(VERSION_FIELD.0, VERSION_FIELD.1)?,
            date: blob.raw_field(DATE_FIELD.0, DATE_FIELD.1)?,
        })
    }

    /// Reads the first `HEADER_SIZE` bytes of the file at the given path and parses
    /// them. A shorter file is a fatal error.
    pub fn read_from_file(path: &Path) -> Result<Self> {

        let file = File::open(path).at_path(path)?;
        let mut blob = Vec::with_capacity(HEADER_SIZE);
        file.take(HEADER_SIZE as u64)
            .read_to_end(&mut blob)
            .at_path(path)?;

        DiscHeader::parse(&blob).ok_or_else(|| BuildError::HeaderTooShort {
            path: path.to_path_buf(),
            length: blob.len(),
        })
    }

    /// Returns the area symbols this disc is marked for, in header order. Unknown
    /// symbols are ignored.
    pub fn areas(&self) -> Vec<Area> {
        self.region
            .chars()
            .filter_map(|symbol| match symbol {
                'J' => Some(Area::Japan),
                'U' => Some(Area::Usa),
                'E' => Some(Area::Europe),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for DiscHeader {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (disc {}, vga {}, region {}, {} {})",
            self.name, self.disc_info, self.vga_info, self.region, self.version, self.date
        )
    }
}
