// SPDX-License-Identifier: GPL-3.0
// slot_resolver.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{fs, path::Path};

use log::debug;

use crate::error::{IoContext, Result};
use crate::session_guard::dir_names;

/// File inside a slot directory recording the archive the game came from.
pub const MARKER_FILE: &str = "gamename.txt";

/// A directory from an earlier run that may be restored into a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    dir_name: String,
    identity: String,
}

/// This struct matches requested games against directories left by an earlier run,
/// so they can be put back into a slot without extracting them again. Each
/// candidate can be claimed once.
#[derive(Debug)]
pub struct SlotResolver {
    candidates: Vec<Candidate>,
}

impl SlotResolver {

    /// Scans the target root for candidate directories accepted by the filter, in
    /// directory name order. Directories without a marker file are not candidates.
    pub fn scan(target: &Path, is_candidate: fn(&str) -> bool) -> Result<Self> {

        let mut candidates = vec![];
        for dir_name in dir_names(target)?.into_iter().filter(|name| is_candidate(name)) {
            match read_marker(&target.join(&dir_name))? {
                Some(identity) => candidates.push(Candidate { dir_name, identity }),
                None => debug!("{} has no {}, not restorable", dir_name, MARKER_FILE),
            }
        }

        Ok(SlotResolver { candidates })
    }

    /// Claims the first unclaimed candidate recorded for the identity, returning
    /// its directory name.
    pub fn claim(&mut self, identity: &str) -> Option<String> {
        let index = self.candidates.iter().position(|c| c.identity == identity)?;
        Some(self.candidates.remove(index).dir_name)
    }

    /// Returns how many candidates are still unclaimed.
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }
}

/// Reads the identity recorded in a slot directory, if there is one.
pub fn read_marker(slot_dir: &Path) -> Result<Option<String>> {

    let path = slot_dir.join(MARKER_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path).at_path(&path)?;
    Ok(Some(contents.trim_end_matches(['\r', '\n']).to_string()))
}

/// Records the identity a slot directory was built from.
pub fn write_marker(slot_dir: &Path, identity: &str) -> Result<()> {
    let path = slot_dir.join(MARKER_FILE);
    fs::write(&path, format!("{}\n", identity)).at_path(&path)
}


#[cfg(test)]
mod tests {

    use super::{read_marker, write_marker, SlotResolver};
    use crate::session_guard::is_marked_slot_name;
    use crate::test_support::ScratchDir;

    fn marked_slot(scratch: &ScratchDir, name: &str, identity: Option<&str>) {
        let dir = scratch.mkdir(name);
        if let Some(identity) = identity {
            write_marker(&dir, identity).unwrap();
        }
    }

    #[test]
    fn claim_should_match_exact_identity_once() {

        let scratch = ScratchDir::new("resolver_once");
        marked_slot(&scratch, "02~", Some("GameA.zip"));
        marked_slot(&scratch, "03~", Some("GameB.zip"));

        let mut resolver = SlotResolver::scan(scratch.path(), is_marked_slot_name).unwrap();

        assert_eq!(resolver.claim("gamea.zip"), None);
        assert_eq!(resolver.claim("GameB.zip"), Some("03~".to_string()));
        assert_eq!(resolver.claim("GameB.zip"), None);
        assert_eq!(resolver.remaining(), 1);
    }

    #[test]
    fn duplicate_identities_should_resolve_first_seen() {

        let scratch = ScratchDir::new("resolver_dupes");
        marked_slot(&scratch, "09~", Some("GameA.zip"));
        marked_slot(&scratch, "04~", Some("GameA.zip"));

        let mut resolver = SlotResolver::scan(scratch.path(), is_marked_slot_name).unwrap();

        assert_eq!(resolver.claim("GameA.zip"), Some("04~".to_string()));
        assert_eq!(resolver.claim("GameA.zip"), Some("09~".to_string()));
    }

    #[test]
    fn scan_should_skip_unmarked_and_filtered_directories() {

        let scratch = ScratchDir::new("resolver_filter");
        marked_slot(&scratch, "02~", None);
        marked_slot(&scratch, "03", Some("GameC.zip"));
        marked_slot(&scratch, "menu~", Some("GameD.zip"));

        let resolver = SlotResolver::scan(scratch.path(), is_marked_slot_name).unwrap();

        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn marker_should_round_trip() {

        let scratch = ScratchDir::new("resolver_marker");

        assert_eq!(read_marker(scratch.path()).unwrap(), None);
        write_marker(scratch.path(), "Crazy Taxi (USA).zip").unwrap();

        assert_eq!(read_marker(scratch.path()).unwrap(), Some("Crazy Taxi (USA).zip".to_string()));
    }
}
