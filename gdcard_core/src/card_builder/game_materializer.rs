// SPDX-License-Identifier: GPL-3.0
// game_materializer.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use super::disc_image::{find_image, ImageKind};
use super::slot_resolver::write_marker;
use super::{reset_dir, walk_files, EXTRACT_DIR};
use crate::error::{BuildError, IoContext, Result};
use crate::external_tools::ExternalTools;
use crate::slot::Slot;

/// This enum represents what happened when a game was materialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Materialized {

    // The game now sits in its slot.
    Placed(ImageKind),

    // The archive held no recognised disc image.
    ImageMissing,
}

/// Finds an archive by exact file name anywhere under the source root. The first
/// match in walk order wins.
pub fn find_archive(source: &Path, identity: &str) -> Result<Option<PathBuf>> {
    Ok(walk_files(source)?
        .into_iter()
        .find(|file| file.file_name().is_some_and(|name| name == identity)))
}

/// Extracts a located archive and moves its game into the given slot under the
/// target root, recording `identity` as where it came from.
///
/// An archive with no image is reported back so the caller can skip the game.
/// Extraction and relocation failures are returned as errors, and nothing is
/// cleaned up in that case.
pub fn materialize(
    tools: &mut dyn ExternalTools,
    archive: &Path,
    target: &Path,
    identity: &str,
    slot: Slot,
) -> Result<Materialized> {

    let scratch = target.join(EXTRACT_DIR);
    reset_dir(&scratch)?;

    info!("extracting {}", archive.display());
    tools.extract_archive(archive, &scratch)?;

    let Some((image, kind)) = find_image(&scratch)? else {
        fs::remove_dir_all(&scratch).at_path(&scratch)?;
        return Ok(Materialized::ImageMissing);
    };
    debug!("found {:?} image {}", kind, image.display());

    // Give the image its canonical name and record where it came from.
    let image_dir = image.parent().unwrap_or(scratch.as_path()).to_path_buf();
    let canonical = image_dir.join(kind.canonical_name());
    if image != canonical {
        fs::rename(&image, &canonical).at_path(&image)?;
    }
    write_marker(&image_dir, identity)?;

    let slot_dir = target.join(slot.dir_name());
    fs::rename(&image_dir, &slot_dir).map_err(|source| BuildError::RelocationFailed {
        from: image_dir.clone(),
        to: slot_dir.clone(),
        source,
    })?;

    // The image may have been nested inside the archive.
    if scratch.exists() {
        fs::remove_dir_all(&scratch).at_path(&scratch)?;
    }

    Ok(Materialized::Placed(kind))
}
