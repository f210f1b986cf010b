// SPDX-License-Identifier: GPL-3.0
// card_builder.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::error::{BuildError, IoContext, Result};
use crate::external_tools::ExternalTools;
use crate::menu::{MenuBuilder, MenuEntry};
use crate::session_guard::{self, is_marked_slot_name, is_numeric_name};
use crate::slot::{Slot, SlotAllocator};

/// This module contains disc image classification and header reading.
pub mod disc_image;

/// This module contains matching of earlier slot directories against the game list.
pub mod slot_resolver;

/// This module contains extraction of a game archive into a slot.
pub mod game_materializer;

/// This module contains authoring of the menu disc itself.
pub mod menu_image;

use disc_image::{cache_name, cached_name, locate_in_slot, read_header};
use game_materializer::{find_archive, materialize, Materialized};
use slot_resolver::SlotResolver;

/// Scratch directory archives are extracted into.
pub const EXTRACT_DIR: &str = ".gdcard_extract";

/// Scratch directory the menu disc is staged in.
pub const MENU_DIR: &str = ".gdcard_menu";

/// Mirrored copy of the game list kept in the target root.
pub const GAME_LIST_MIRROR: &str = "GAMELIST.txt";

/// Suffix given to the previous mirror before it is replaced.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Device configuration file copied into the target root.
pub const DEVICE_CONFIG: &str = "GDEMU.ini";

// Names inside the resources directory.
const MENU_DATA_DIR: &str = "menu_data";
const BOOT_SECTOR: &str = "IP.BIN";

/// This struct holds everything a build needs to know about its inputs.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub game_list: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub resources_dir: PathBuf,
}

impl BuildConfig {

    /// Directory holding the menu program files.
    pub fn menu_data_dir(&self) -> PathBuf {
        self.resources_dir.join(MENU_DATA_DIR)
    }

    /// Boot sector for the menu disc.
    pub fn boot_sector(&self) -> PathBuf {
        self.resources_dir.join(BOOT_SECTOR)
    }

    /// Bundled default device configuration.
    pub fn device_config(&self) -> PathBuf {
        self.resources_dir.join(DEVICE_CONFIG)
    }
}

/// This enum represents how a game ended up in (or out of) its slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {

    // Moved back from a directory left by an earlier run.
    Restored { from: String },

    // Freshly extracted from its archive.
    Extracted,

    // Left out; the reason is for display.
    Skipped { reason: String },
}

/// Report for one game in the list, handed to the bridge as soon as it is done.
#[derive(Clone, Debug)]
pub struct GameReport {
    pub identity: String,
    pub slot: Option<Slot>,
    pub name: Option<String>,
    pub outcome: GameOutcome,
}

/// This enum represents what a dry run expects to do with a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannedAction {
    Restore { from: String },
    Extract { archive: PathBuf },
    Skip,
}

/// One line of a dry-run plan.
#[derive(Clone, Debug)]
pub struct PlannedGame {
    pub identity: String,
    pub slot: Option<Slot>,
    pub action: PlannedAction,
}

/// Summary of a finished build.
#[derive(Clone, Debug)]
pub struct BuildSummary {
    pub slots: Vec<(Slot, String)>,
    pub restored: usize,
    pub extracted: usize,
    pub skipped: Vec<String>,
    pub unclaimed: Vec<String>,
    pub menu_image: PathBuf,
}

/// This trait provides a way for the builder to report progress back out to
/// whatever is driving it, via a 'bridge'.
pub trait CardBuilderBridge {

    /// The builder calls this once per game in the list, in list order.
    fn game_processed(&mut self, report: &GameReport);

    /// The builder calls this once per game during a dry run.
    fn game_planned(&mut self, plan: &PlannedGame);
}

/// This struct drives one build of the SD card layout.
pub struct CardBuilder<'a> {

    // Inputs and resources.
    config: &'a BuildConfig,

    // External tool runner.
    tools: &'a mut dyn ExternalTools,
}

impl<'a> CardBuilder<'a> {

    /// Creates a new builder for the given configuration and tools.
    pub fn new(config: &'a BuildConfig, tools: &'a mut dyn ExternalTools) -> Self {
        CardBuilder { config, tools }
    }

    /// Checks every input, tool and leftover before anything is touched. The order
    /// decides which error (and exit code) wins when several apply.
    pub fn check_preconditions(&self) -> Result<()> {

        let config = self.config;
        if !config.game_list.is_file() {
            return Err(BuildError::GameListMissing(config.game_list.clone()));
        }
        if !config.source_dir.is_dir() {
            return Err(BuildError::SourceMissing(config.source_dir.clone()));
        }
        if !config.target_dir.is_dir() {
            return Err(BuildError::TargetMissing(config.target_dir.clone()));
        }

        self.tools.check_installed()?;

        for resource in [config.menu_data_dir(), config.boot_sector(), config.device_config()] {
            if !resource.exists() {
                return Err(BuildError::ResourceMissing(resource));
            }
        }

        session_guard::preflight_check(&config.target_dir)
    }

    /// Runs the whole build: restores or extracts every listed game into numbered
    /// slots, then authors the menu disc into slot 1.
    pub fn run(&mut self, bridge: &mut dyn CardBuilderBridge) -> Result<BuildSummary> {

        self.check_preconditions()?;

        let target = self.config.target_dir.clone();
        let games = read_game_list(&self.config.game_list)?;
        info!("{} games listed in {}", games.len(), self.config.game_list.display());

        clear_stale_scratch(&target)?;
        self.write_target_files()?;

        // Set existing slots aside and see which can be restored.
        session_guard::mark_existing_slots(&target)?;
        let mut resolver = SlotResolver::scan(&target, is_marked_slot_name)?;
        info!("{} earlier slot directories can be restored", resolver.remaining());

        let mut allocator = SlotAllocator::new();
        let mut menu = MenuBuilder::new();
        let mut summary = BuildSummary {
            slots: vec![],
            restored: 0,
            extracted: 0,
            skipped: vec![],
            unclaimed: vec![],
            menu_image: PathBuf::new(),
        };

        for identity in &games {
            let report = self.process_game(identity, &mut resolver, &mut allocator, &mut menu)?;
            match &report.outcome {
                GameOutcome::Restored { .. } => summary.restored += 1,
                GameOutcome::Extracted => summary.extracted += 1,
                GameOutcome::Skipped { .. } => summary.skipped.push(identity.clone()),
            }
            if let Some(slot) = report.slot {
                summary.slots.push((slot, identity.clone()));
            }
            bridge.game_processed(&report);
        }

        info!("{} slots in use", allocator.used());
        let list_text = menu.render();
        summary.menu_image = menu_image::assemble_menu(self.tools, self.config, &list_text)?;
        info!("menu written to {}", summary.menu_image.display());

        summary.unclaimed = session_guard::postflight_report(&target)?;
        Ok(summary)
    }

    /// Works out what a build would do without changing anything.
    pub fn plan(&mut self, bridge: &mut dyn CardBuilderBridge) -> Result<Vec<PlannedGame>> {

        self.check_preconditions()?;

        let games = read_game_list(&self.config.game_list)?;

        // Existing slots have not been set aside yet, so match them unmarked.
        let mut resolver = SlotResolver::scan(&self.config.target_dir, is_restorable_unmarked)?;
        let mut allocator = SlotAllocator::new();
        let mut plan = vec![];

        for identity in games {
            let action = match resolver.claim(&identity) {
                Some(from) => PlannedAction::Restore { from },
                None => match find_archive(&self.config.source_dir, &identity)? {
                    Some(archive) => PlannedAction::Extract { archive },
                    None => PlannedAction::Skip,
                },
            };
            let slot = match action {
                PlannedAction::Skip => None,
                _ => allocator.commit(),
            };

            let planned = PlannedGame { identity, slot, action };
            bridge.game_planned(&planned);
            plan.push(planned);
        }

        Ok(plan)
    }

    /// Backs up and replaces the mirrored game list, and copies in the device
    /// configuration.
    fn write_target_files(&self) -> Result<()> {

        let target = &self.config.target_dir;

        // Read first, in case the list given is the previous mirror itself.
        let game_list = fs::read(&self.config.game_list).at_path(&self.config.game_list)?;
        let mirror = target.join(GAME_LIST_MIRROR);
        if mirror.exists() {
            let backup = target.join(format!("{}{}", GAME_LIST_MIRROR, BACKUP_SUFFIX));
            fs::rename(&mirror, &backup).at_path(&mirror)?;
        }
        fs::write(&mirror, game_list).at_path(&mirror)?;

        let device_config = target.join(DEVICE_CONFIG);
        fs::copy(self.config.device_config(), &device_config).at_path(&device_config)?;

        Ok(())
    }

    /// Puts one game into the next slot, by restoring or extracting it, and adds
    /// its menu entry.
    fn process_game(
        &mut self,
        identity: &str,
        resolver: &mut SlotResolver,
        allocator: &mut SlotAllocator,
        menu: &mut MenuBuilder,
    ) -> Result<GameReport> {

        let target = &self.config.target_dir;
        let (slot, outcome) = match resolver.claim(identity) {
            Some(from) => {
                let slot = next_slot(allocator, identity)?;
                session_guard::rename_dir(target, &from, &slot.dir_name())?;
                (Some(slot), GameOutcome::Restored { from })
            }
            None => match find_archive(&self.config.source_dir, identity)? {
                None => {
                    warn!("archive {} not found, skipping", identity);
                    (None, GameOutcome::Skipped { reason: "archive not found".to_string() })
                }
                Some(archive) => {
                    let slot = next_slot(allocator, identity)?;
                    match materialize(self.tools, &archive, target, identity, slot)? {
                        Materialized::Placed(_) => (Some(slot), GameOutcome::Extracted),
                        Materialized::ImageMissing => {
                            warn!("no disc image in {}, skipping", archive.display());
                            (None, GameOutcome::Skipped { reason: "no disc image in archive".to_string() })
                        }
                    }
                }
            },
        };

        let Some(slot) = slot else {
            return Ok(GameReport {
                identity: identity.to_string(),
                slot: None,
                name: None,
                outcome,
            });
        };

        allocator.commit();
        let entry = self.slot_entry(slot)?;
        let name = entry.name.clone();
        menu.push(entry);

        Ok(GameReport {
            identity: identity.to_string(),
            slot: Some(slot),
            name: Some(name),
            outcome,
        })
    }

    /// Builds the menu entry for a filled slot. The display name comes from the
    /// slot's cache when present; the other fields are always read from the header.
    fn slot_entry(&mut self, slot: Slot) -> Result<MenuEntry> {

        let slot_dir = self.config.target_dir.join(slot.dir_name());
        let (image, kind) = locate_in_slot(&slot_dir)
            .ok_or_else(|| BuildError::HeaderSourceMissing(slot_dir.clone()))?;

        let header = read_header(self.tools, &image, kind)?;
        debug!("slot {} header: {}, areas {:?}", slot, header, header.areas());
        let name = match cached_name(&slot_dir)? {
            Some(name) => name,
            None => {
                cache_name(&slot_dir, &header.name)?;
                header.name.clone()
            }
        };

        Ok(MenuEntry::from_header(slot, &name, &header))
    }
}

/// Reads the game list: one archive name per line, surrounding whitespace ignored,
/// blank lines skipped.
pub fn read_game_list(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)
        .at_path(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Returns the slot the next placed game would take. Only games that are actually
/// going to be placed ask for one, so a skipped game never fails on a full card.
fn next_slot(allocator: &SlotAllocator, identity: &str) -> Result<Slot> {
    allocator
        .peek()
        .ok_or_else(|| BuildError::SlotsExhausted(identity.to_string()))
}

/// True for numeric game slot names, which a dry run treats as restorable.
fn is_restorable_unmarked(name: &str) -> bool {
    is_numeric_name(name) && Slot::from_dir_name(name).is_none_or(|slot| !slot.is_menu())
}

/// Removes scratch directories an interrupted run may have left.
fn clear_stale_scratch(target: &Path) -> Result<()> {

    for name in [EXTRACT_DIR, MENU_DIR] {
        let scratch = target.join(name);
        if scratch.exists() {
            warn!("removing scratch directory left by an interrupted run: {}", scratch.display());
            fs::remove_dir_all(&scratch).at_path(&scratch)?;
        }
    }

    Ok(())
}

/// Empties a scratch directory, creating it if needed.
pub(crate) fn reset_dir(dir: &Path) -> Result<()> {

    if dir.exists() {
        fs::remove_dir_all(dir).at_path(dir)?;
    }
    fs::create_dir_all(dir).at_path(dir)
}

/// Lists every file under a directory, depth first, each level in name order.
pub(crate) fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .at_path(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .at_path(dir)?;
    entries.sort();

    let mut files = vec![];
    for path in entries {
        if path.is_dir() {
            files.extend(walk_files(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}
