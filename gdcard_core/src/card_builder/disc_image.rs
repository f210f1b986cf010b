// SPDX-License-Identifier: GPL-3.0
// disc_image.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fs,
    path::{Path, PathBuf},
};

use gdcard_utility::{bytes_from_text, text_from_bytes};
use log::debug;

use super::walk_files;
use crate::disc_header::DiscHeader;
use crate::error::{BuildError, IoContext, Result};
use crate::external_tools::{ExternalTools, HEADER_TAG};

/// Scratch directory a single-file image is ripped into while its header is read.
const TRACKS_DIR: &str = "tracks";

/// File inside a slot directory caching the extracted display name.
pub const NAME_CACHE_FILE: &str = "name.txt";

/// This enum represents the two kinds of disc image a game archive may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageKind {

    // A .gdi track list, with its track files alongside.
    TrackList,

    // A single .cdi file.
    SingleFile,
}

impl ImageKind {

    /// Returns the image file extension, lower case.
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::TrackList => "gdi",
            ImageKind::SingleFile => "cdi",
        }
    }

    /// Returns the name every image of this kind is given inside its slot.
    pub fn canonical_name(self) -> &'static str {
        match self {
            ImageKind::TrackList => "disc.gdi",
            ImageKind::SingleFile => "disc.cdi",
        }
    }

    /// Returns true if the path carries this kind's extension, ignoring case.
    pub fn matches(self, path: &Path) -> bool {
        has_extension(path, self.extension())
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Searches a freshly extracted tree for a disc image. Track lists win over single
/// files; within a kind, the first file in walk order wins.
pub fn find_image(dir: &Path) -> Result<Option<(PathBuf, ImageKind)>> {

    let files = walk_files(dir)?;
    for kind in [ImageKind::TrackList, ImageKind::SingleFile] {
        if let Some(image) = files.iter().find(|file| kind.matches(file)) {
            return Ok(Some((image.clone(), kind)));
        }
    }

    Ok(None)
}

/// Finds the canonically named image inside a slot directory.
pub fn locate_in_slot(slot_dir: &Path) -> Option<(PathBuf, ImageKind)> {
    [ImageKind::TrackList, ImageKind::SingleFile]
        .into_iter()
        .map(|kind| (slot_dir.join(kind.canonical_name()), kind))
        .find(|(image, _)| image.is_file())
}

/// Reads the disc header of an image, cleaning up whatever the tools wrote to get
/// at it. Track lists have their header dumped alongside the image; single files
/// are ripped and the header taken from the highest-sorted data track.
pub fn read_header(
    tools: &mut dyn ExternalTools,
    image: &Path,
    kind: ImageKind,
) -> Result<DiscHeader> {

    let image_dir = image.parent().unwrap_or(Path::new("."));

    match kind {
        ImageKind::TrackList => {
            let dump = tools.dump_header(image, HEADER_TAG)?;
            let header = DiscHeader::read_from_file(&dump);
            if dump.exists() {
                fs::remove_file(&dump).at_path(&dump)?;
            }
            header
        }
        ImageKind::SingleFile => {
            let tracks = image_dir.join(TRACKS_DIR);
            if tracks.exists() {
                fs::remove_dir_all(&tracks).at_path(&tracks)?;
            }
            fs::create_dir_all(&tracks).at_path(&tracks)?;

            tools.rip_image(image, &tracks)?;
            let header = match last_data_track(&tracks)? {
                Some(track) => {
                    debug!("reading header from {}", track.display());
                    DiscHeader::read_from_file(&track)
                }
                None => Err(BuildError::HeaderSourceMissing(tracks.clone())),
            };
            fs::remove_dir_all(&tracks).at_path(&tracks)?;
            header
        }
    }
}

/// Returns the highest-sorted data track among ripped track files.
fn last_data_track(tracks: &Path) -> Result<Option<PathBuf>> {
    Ok(walk_files(tracks)?
        .into_iter()
        .filter(|file| has_extension(file, "iso") || has_extension(file, "bin"))
        .max_by(|a, b| a.file_name().cmp(&b.file_name())))
}

/// Returns the cached display name for a slot, if one has been written. The file
/// is read as raw bytes, whatever encoding it was saved in.
pub fn cached_name(slot_dir: &Path) -> Result<Option<String>> {

    let path = slot_dir.join(NAME_CACHE_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let name = text_from_bytes(&fs::read(&path).at_path(&path)?);
    Ok(Some(name.trim_end_matches(['\r', '\n']).to_string()))
}

/// Writes the display name cache for a slot, byte for byte as read from the header.
pub fn cache_name(slot_dir: &Path, name: &str) -> Result<()> {

    let path = slot_dir.join(NAME_CACHE_FILE);
    let mut contents = bytes_from_text(name);
    contents.push(b'\n');
    fs::write(&path, contents).at_path(&path)
}


#[cfg(test)]
mod tests {

    use std::{fs, path::Path};

    use super::{
        cache_name, cached_name, find_image, locate_in_slot, read_header, ImageKind,
        NAME_CACHE_FILE,
    };
    use crate::test_support::{header_fixture, FakeTools, ScratchDir};

    #[test]
    fn track_list_should_win_over_single_file() {

        let scratch = ScratchDir::new("image_pick");
        fs::write(scratch.path().join("a.cdi"), b"").unwrap();
        let sub = scratch.mkdir("z");
        fs::write(sub.join("Game.GDI"), b"").unwrap();

        let (image, kind) = find_image(scratch.path()).unwrap().unwrap();

        assert_eq!(kind, ImageKind::TrackList);
        assert_eq!(image, sub.join("Game.GDI"));
    }

    #[test]
    fn find_image_should_report_nothing_without_images() {

        let scratch = ScratchDir::new("image_none");
        fs::write(scratch.path().join("readme.txt"), b"").unwrap();

        assert!(find_image(scratch.path()).unwrap().is_none());
    }

    #[test]
    fn kind_matching_should_ignore_case() {

        assert!(ImageKind::SingleFile.matches(Path::new("x/Game.CdI")));
        assert!(!ImageKind::SingleFile.matches(Path::new("x/Game.gdi")));
        assert!(!ImageKind::TrackList.matches(Path::new("x/gdi")));
    }

    #[test]
    fn locate_in_slot_should_use_canonical_names() {

        let scratch = ScratchDir::new("image_slot");
        fs::write(scratch.path().join("Other.cdi"), b"").unwrap();
        assert!(locate_in_slot(scratch.path()).is_none());

        fs::write(scratch.path().join("disc.cdi"), b"").unwrap();
        let (_, kind) = locate_in_slot(scratch.path()).unwrap();

        assert_eq!(kind, ImageKind::SingleFile);
    }

    #[test]
    fn track_list_header_should_come_from_dump_and_be_cleaned_up() {

        let scratch = ScratchDir::new("image_dump");
        let image = scratch.path().join("disc.gdi");
        fs::write(&image, header_fixture("JET SET RADIO", "1/1", "1", "E", "V1.001", "20001124")).unwrap();
        let mut tools = FakeTools::new();

        let header = read_header(&mut tools, &image, ImageKind::TrackList).unwrap();

        assert_eq!(header.name, "JET SET RADIO");
        assert_eq!(tools.calls, vec!["dump disc.gdi"]);
        assert!(!scratch.path().join("ip.bin").exists());
    }

    #[test]
    fn single_file_header_should_come_from_last_data_track() {

        let scratch = ScratchDir::new("image_rip");
        let image = scratch.path().join("disc.cdi");
        fs::write(&image, header_fixture("IKARUGA", "1/1", "1", "J", "V1.002", "20020905")).unwrap();
        let mut tools = FakeTools::new();

        let header = read_header(&mut tools, &image, ImageKind::SingleFile).unwrap();

        assert_eq!(header.name, "IKARUGA");
        assert_eq!(header.region, "J");
        assert_eq!(tools.calls, vec!["rip disc.cdi"]);
        assert!(!scratch.path().join("tracks").exists());
    }

    #[test]
    fn name_cache_should_round_trip_without_newline() {

        let scratch = ScratchDir::new("image_cache");

        assert_eq!(cached_name(scratch.path()).unwrap(), None);
        cache_name(scratch.path(), "POWER STONE 2").unwrap();

        assert_eq!(cached_name(scratch.path()).unwrap(), Some("POWER STONE 2".to_string()));
    }

    #[test]
    fn name_cache_should_keep_non_utf8_bytes() {

        let scratch = ScratchDir::new("image_cache_bytes");
        fs::write(scratch.path().join(NAME_CACHE_FILE), [b'R', 0xE9, b'Z', b'\r', b'\n']).unwrap();

        let name = cached_name(scratch.path()).unwrap().unwrap();
        assert_eq!(name, "R\u{e9}Z");

        cache_name(scratch.path(), &name).unwrap();
        assert_eq!(fs::read(scratch.path().join(NAME_CACHE_FILE)).unwrap(), [b'R', 0xE9, b'Z', b'\n']);
    }
}
