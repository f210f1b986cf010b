// SPDX-License-Identifier: GPL-3.0
// session_guard.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fs,
    io,
    path::Path,
};

use log::{info, warn};

use crate::error::{BuildError, IoContext, Result};
use crate::slot::Slot;

/// Character appended to a slot directory name to set it aside for this run.
pub const MARKER: char = '~';

/// Name given to the previous menu slot while it is set aside.
pub const OLD_MENU_DIR: &str = "menu~";

/// Returns true if the name is made purely of ASCII digits.
pub fn is_numeric_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true if the name is a purely numeric slot name followed by the marker,
/// e.g. "07~".
pub fn is_marked_slot_name(name: &str) -> bool {
    name.strip_suffix(MARKER).is_some_and(is_numeric_name)
}

/// Returns true if the name is the set-aside previous menu slot.
pub fn is_old_menu_name(name: &str) -> bool {
    name == OLD_MENU_DIR
}

/// Returns true for any directory name a run leaves behind while it is in progress.
pub fn is_leftover_name(name: &str) -> bool {
    is_marked_slot_name(name) || is_old_menu_name(name)
}

/// Returns the set-aside name for a purely numeric directory name. The menu slot
/// gets its own distinguished name so it is never mistaken for a game.
pub fn marked_name(name: &str) -> String {
    match Slot::from_dir_name(name) {
        Some(slot) if slot.is_menu() => OLD_MENU_DIR.to_string(),
        _ => format!("{}{}", name, MARKER),
    }
}

/// Lists the names of all directories directly under the target root, sorted so
/// every scan sees them in the same order. Names that are not valid UTF-8 are
/// skipped, as they can never be slot names.
pub fn dir_names(target: &Path) -> Result<Vec<String>> {

    let mut names = vec![];
    for entry in fs::read_dir(target).at_path(target)? {
        let entry = entry.at_path(target)?;
        if !entry.file_type().at_path(entry.path())?.is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();

    Ok(names)
}

/// Lists every leftover directory from an interrupted run.
pub fn leftovers(target: &Path) -> Result<Vec<String>> {
    Ok(dir_names(target)?
        .into_iter()
        .filter(|name| is_leftover_name(name))
        .collect())
}

/// Aborts if a previous run left set-aside directories behind. Nothing is changed
/// in the target tree either way.
pub fn preflight_check(target: &Path) -> Result<()> {

    let leftovers = leftovers(target)?;
    if leftovers.is_empty() {
        return Ok(());
    }

    for name in &leftovers {
        warn!("leftover directory from an interrupted run: {}", target.join(name).display());
    }
    Err(BuildError::LeftoverSession(leftovers))
}

/// Sets every numeric directory aside by renaming it to its marked name, so this run
/// can number slots freely and restore games from the marked copies. Returns the
/// new names in scan order.
pub fn mark_existing_slots(target: &Path) -> Result<Vec<String>> {

    let mut marked = vec![];
    for name in dir_names(target)?.into_iter().filter(|name| is_numeric_name(name)) {
        let new_name = marked_name(&name);
        rename_dir(target, &name, &new_name)?;
        marked.push(new_name);
    }

    if !marked.is_empty() {
        info!("set aside {} existing slot directories", marked.len());
    }
    Ok(marked)
}

/// Moves the previous menu slot back into slot 1, if one was set aside. Returns
/// true if a restore happened.
pub fn restore_old_menu(target: &Path) -> Result<bool> {

    if !target.join(OLD_MENU_DIR).is_dir() {
        return Ok(false);
    }

    rename_dir(target, OLD_MENU_DIR, &Slot::MENU.dir_name())?;
    Ok(true)
}

/// Reports the marked directories still present after a run. These are games from
/// a previous session that the current game list did not claim; they are left in
/// place for the operator to deal with.
pub fn postflight_report(target: &Path) -> Result<Vec<String>> {

    let unclaimed = leftovers(target)?;
    for name in &unclaimed {
        warn!("unclaimed directory from a previous session: {}", target.join(name).display());
    }

    Ok(unclaimed)
}

/// Renames one directory under the target root, refusing to replace anything.
pub(crate) fn rename_dir(target: &Path, from: &str, to: &str) -> Result<()> {

    let to_path = target.join(to);
    if to_path.exists() {
        return Err(BuildError::io(
            to_path,
            io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }

    fs::rename(target.join(from), &to_path).at_path(target.join(from))
}
