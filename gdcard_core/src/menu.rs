// SPDX-License-Identifier: GPL-3.0
// menu.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::disc_header::DiscHeader;
use crate::slot::Slot;

/// Section header line that starts the menu configuration.
pub const SECTION_HEADER: &str = "[GDMENU]";

/// File name the menu program reads its configuration from.
pub const LIST_FILE: &str = "LIST.INI";

// Details of the bundled menu program build, used for slot 1.
const MENU_NAME: &str = "GDMENU";
const MENU_DISC: &str = "1/1";
const MENU_VGA: &str = "1";
const MENU_REGION: &str = "JUE";
const MENU_VERSION: &str = "V0.6";
const MENU_DATE: &str = "20160812";

/// This struct models one slot's block in the menu configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub slot: Slot,
    pub name: String,
    pub disc: String,
    pub vga: String,
    pub region: String,
    pub version: String,
    pub date: String,
}

impl MenuEntry {

    /// Returns the fixed entry describing the menu program itself. This never comes
    /// from a disc header.
    pub fn menu_program() -> Self {
        MenuEntry {
            slot: Slot::MENU,
            name: MENU_NAME.to_string(),
            disc: MENU_DISC.to_string(),
            vga: MENU_VGA.to_string(),
            region: MENU_REGION.to_string(),
            version: MENU_VERSION.to_string(),
            date: MENU_DATE.to_string(),
        }
    }

    /// Creates an entry for a game slot from its disc header. The display name is
    /// passed separately as it may come from the slot's name cache.
    pub fn from_header(slot: Slot, name: &str, header: &DiscHeader) -> Self {
        MenuEntry {
            slot,
            name: name.to_string(),
            disc: header.disc_info.clone(),
            vga: header.vga_info.clone(),
            region: header.region.clone(),
            version: header.version.clone(),
            date: header.date.clone(),
        }
    }

    /// Renders the key-prefixed lines for this entry, each ending with a newline.
    pub fn render(&self) -> String {

        let fields = [
            ("name", &self.name),
            ("disc", &self.disc),
            ("vga", &self.vga),
            ("region", &self.region),
            ("version", &self.version),
            ("date", &self.date),
        ];

        let key = self.slot.dir_name();
        fields
            .iter()
            .map(|(field, value)| format!("{}.{}={}\n", key, field, value))
            .collect()
    }
}

/// This struct accumulates menu entries in processing order and renders the whole
/// configuration. It always starts with the menu program's own entry.
#[derive(Debug)]
pub struct MenuBuilder {
    entries: Vec<MenuEntry>,
}

impl MenuBuilder {

    /// Creates a new builder holding only the slot 1 entry.
    pub fn new() -> Self {
        MenuBuilder {
            entries: vec![MenuEntry::menu_program()],
        }
    }

    /// Appends a game entry. No reordering or deduplication takes place.
    pub fn push(&mut self, entry: MenuEntry) {
        self.entries.push(entry);
    }

    /// Returns the entries gathered so far.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Renders the full configuration text, blocks separated by a blank line.
    pub fn render(&self) -> String {

        let blocks: Vec<String> = self.entries.iter().map(MenuEntry::render).collect();
        format!("{}\n{}", SECTION_HEADER, blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests;
