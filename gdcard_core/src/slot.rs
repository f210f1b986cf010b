// SPDX-License-Identifier: GPL-3.0
// slot.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::fmt;

use gdcard_utility::two_digit;

/// Highest slot number the device understands.
pub const MAX_SLOT: u8 = 99;

/// This struct models a single numbered slot on the SD card. Slot 1 is always the
/// menu disc.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {

    /// The slot reserved for the generated menu disc.
    pub const MENU: Slot = Slot(1);

    /// Creates a slot from a number, if it lies within [1, 99].
    pub fn new(number: u8) -> Option<Self> {
        (1..=MAX_SLOT).contains(&number).then_some(Slot(number))
    }

    /// Returns the raw slot number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Returns the directory name for this slot, e.g. "07".
    pub fn dir_name(self) -> String {
        two_digit(self.0)
    }

    /// Parses a purely numeric directory name back into a slot.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse::<u8>().ok().and_then(Slot::new)
    }

    /// Returns true if this is the reserved menu slot.
    pub fn is_menu(self) -> bool {
        self == Slot::MENU
    }
}

impl fmt::Display for Slot {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// This struct hands out game slots in order, starting straight after the menu
/// slot. A slot is only consumed once the caller commits it, so games that get
/// skipped never leave a gap.
#[derive(Debug)]
pub struct SlotAllocator {

    // The slot the next committed game will occupy.
    next: u8,
}

impl SlotAllocator {

    /// Creates a new allocator with slot 1 already taken by the menu.
    pub fn new() -> Self {
        SlotAllocator {
            next: Slot::MENU.number() + 1,
        }
    }

    /// Returns the slot the next game would occupy, without consuming it, or
    /// `None` once every slot is used.
    pub fn peek(&self) -> Option<Slot> {
        Slot::new(self.next)
    }

    /// Consumes and returns the next slot.
    pub fn commit(&mut self) -> Option<Slot> {
        let slot = self.peek()?;
        self.next += 1;
        Some(slot)
    }

    /// Returns how many slots are in use, including the menu.
    pub fn used(&self) -> usize {
        usize::from(self.next - 1)
    }
}
