// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Crate-wide lines to disable specific lints:

// Constructors take no arguments but set up explicit state, so we do not derive
// Default implementations unless needed.
#![allow(clippy::new_without_default)]

/// This module contains the error type shared by every build step.
pub mod error;

/// This module contains parsing of the fixed-layout disc header.
pub mod disc_header;

/// This module contains slot numbering and allocation.
pub mod slot;

/// This module contains detection and handling of state left by earlier runs.
pub mod session_guard;

/// This module contains the interface to the external command line tools.
pub mod external_tools;

/// This module contains the menu configuration text.
pub mod menu;

/// This module contains the build itself, tying the other modules together.
pub mod card_builder;

#[cfg(test)]
mod test_support;
