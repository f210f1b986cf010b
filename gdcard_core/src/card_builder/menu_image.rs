// SPDX-License-Identifier: GPL-3.0
// menu_image.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fs,
    path::{Path, PathBuf},
};

use gdcard_utility::bytes_from_text;
use log::info;

use super::{reset_dir, BuildConfig, MENU_DIR};
use crate::error::{IoContext, Result};
use crate::external_tools::{AuthoringParams, ExternalTools};
use crate::menu::LIST_FILE;
use crate::session_guard::restore_old_menu;
use crate::slot::Slot;

/// Volume label of the authored menu disc.
const MENU_VOLUME_ID: &str = "GDMENU";

/// Name of the finished menu image inside slot 1.
pub const MENU_IMAGE: &str = "gdmenu.cdi";

/// Authors the menu disc from the rendered configuration and places it in slot 1.
/// Header text in the configuration is written back out as its original bytes.
/// A menu slot set aside at the start of the run is moved back first, so anything
/// else it holds is kept as it was. Returns the path of the new image.
pub fn assemble_menu(
    tools: &mut dyn ExternalTools,
    config: &BuildConfig,
    list_text: &str,
) -> Result<PathBuf> {

    let target = &config.target_dir;
    let scratch = target.join(MENU_DIR);
    reset_dir(&scratch)?;

    // Stage the menu program with its generated list.
    let payload = scratch.join("data");
    fs::create_dir_all(&payload).at_path(&payload)?;
    copy_files(&config.menu_data_dir(), &payload)?;
    let list_path = payload.join(LIST_FILE);
    fs::write(&list_path, bytes_from_text(list_text)).at_path(&list_path)?;

    let raw = scratch.join("menu.iso");
    tools.author_image(&AuthoringParams {
        volume_id: MENU_VOLUME_ID.to_string(),
        boot_sector: config.boot_sector(),
        payload_dir: payload,
        output: raw.clone(),
    })?;

    let converted = scratch.join(MENU_IMAGE);
    tools.convert_image(&raw, &converted)?;

    // Put the menu slot back in place and drop the new image into it.
    let menu_dir = target.join(Slot::MENU.dir_name());
    if restore_old_menu(target)? {
        info!("restored previous menu slot");
    } else {
        fs::create_dir_all(&menu_dir).at_path(&menu_dir)?;
    }
    let image = menu_dir.join(MENU_IMAGE);
    fs::rename(&converted, &image).at_path(&converted)?;

    fs::remove_dir_all(&scratch).at_path(&scratch)?;
    Ok(image)
}

/// Copies every regular, non-hidden file directly inside `from` into `to`.
fn copy_files(from: &Path, to: &Path) -> Result<()> {

    for entry in fs::read_dir(from).at_path(from)? {
        let entry = entry.at_path(from)?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            let dest = to.join(entry.file_name());
            fs::copy(&path, &dest).at_path(&path)?;
        }
    }

    Ok(())
}
