// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// This crate contains useful utility functions that can be used throughout the codebase.

/// This trait exists to allow us to pull fixed-offset, fixed-width fields out of
/// binary blobs such as disc headers. Each byte becomes the char of the same code
/// point, so no particular text encoding is assumed and `bytes_from_text` gives the
/// original bytes back. Only ASCII whitespace is ever trimmed or stripped.
pub trait ByteField {

    /// This function should return the raw field at the specified offset and length,
    /// or `None` if the field would read past the end of the blob.
    fn raw_field(&self, offset: usize, length: usize) -> Option<String>;

    /// This function should return the field with leading and trailing whitespace
    /// removed.
    fn trimmed_field(&self, offset: usize, length: usize) -> Option<String> {
        self.raw_field(offset, length)
            .map(|field| field.trim_matches(|c: char| c.is_ascii_whitespace()).to_string())
    }

    /// This function should return the field with every whitespace character removed,
    /// wherever it appears.
    fn stripped_field(&self, offset: usize, length: usize) -> Option<String> {
        self.raw_field(offset, length)
            .map(|field| field.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    }
}

impl ByteField for [u8] {

    /// Maps each byte to the char of the same code point.
    fn raw_field(&self, offset: usize, length: usize) -> Option<String> {
        let end = offset.checked_add(length)?;
        self.get(offset..end).map(text_from_bytes)
    }
}

/// Turns raw bytes into text one char per byte.
pub fn text_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Turns text made by `text_from_bytes` back into the same bytes. A char that no
/// single byte can hold is written as '?'.
pub fn bytes_from_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Renders a number as a two-digit, zero-padded string, in the same way slot
/// directories and menu keys are named.
pub fn two_digit(value: u8) -> String {
    format!("{:02}", value)
}
