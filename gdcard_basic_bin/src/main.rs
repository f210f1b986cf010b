// SPDX-License-Identifier: GPL-3.0
// main.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    ffi::OsString,
    path::PathBuf,
    process,
};

// This file is the core of the basic client - it exists merely as a CLI-based
// program to turn a list of game archives into a GDEMU SD card layout.

use clap::{error::ErrorKind, Parser};
use gdcard_core::{
    card_builder::{
        BuildConfig, BuildSummary, CardBuilder, CardBuilderBridge, GameOutcome, GameReport,
        PlannedAction, PlannedGame,
    },
    external_tools::system_tools::{SystemTools, ToolPrograms},
};
use log::{error, LevelFilter};

#[derive(Parser)]
#[command(
    version,
    about = "Builds a GDEMU SD card layout from a list of Dreamcast game archives",
    long_about = None
)]
struct GdCardArgs {
    #[arg(
        help = "A text file listing one game archive name per line",
        value_name = "GAME_LIST"
    )]
    game_list: PathBuf,

    #[arg(
        help = "The directory containing the game archives",
        value_name = "SOURCE_DIR"
    )]
    source_dir: PathBuf,

    #[arg(
        help = "The root of the SD card to build",
        value_name = "TARGET_DIR"
    )]
    target_dir: PathBuf,

    #[arg(
        long = "resources",
        env = "GDCARD_RESOURCES",
        default_value = "resources",
        help = "Directory holding menu_data/, IP.BIN and GDEMU.ini"
    )]
    resources: PathBuf,

    #[arg(
        long = "dry-run",
        help = "Show which games would be restored or extracted, then stop"
    )]
    dry_run: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Log every external command"
    )]
    verbose: bool,

    #[arg(long = "unzip", env = "GDCARD_UNZIP", default_value = "unzip", help = "Archive extractor")]
    unzip: OsString,

    #[arg(long = "cdirip", env = "GDCARD_CDIRIP", default_value = "cdirip", help = "Single-file image ripper")]
    cdirip: OsString,

    #[arg(long = "gditools", env = "GDCARD_GDITOOLS", default_value = "gditools.py", help = "Track-list header dumper")]
    gditools: OsString,

    #[arg(long = "mkisofs", env = "GDCARD_MKISOFS", default_value = "mkisofs", help = "Menu image author")]
    mkisofs: OsString,

    #[arg(long = "cdi4dc", env = "GDCARD_CDI4DC", default_value = "cdi4dc", help = "Menu image converter")]
    cdi4dc: OsString,
}

/// This struct prints per-game progress to standard output.
struct ConsoleBridge;

impl CardBuilderBridge for ConsoleBridge {

    fn game_processed(&mut self, report: &GameReport) {

        let slot = report.slot.map(|slot| slot.dir_name()).unwrap_or_else(|| "--".to_string());
        let name = report.name.as_deref().unwrap_or("");
        match &report.outcome {
            GameOutcome::Restored { from } => {
                println!("{}  {}  (restored {} from {})", slot, name, report.identity, from)
            }
            GameOutcome::Extracted => {
                println!("{}  {}  (extracted {})", slot, name, report.identity)
            }
            GameOutcome::Skipped { reason } => {
                println!("{}  skipped {}: {}", slot, report.identity, reason)
            }
        }
    }

    fn game_planned(&mut self, plan: &PlannedGame) {

        let slot = plan.slot.map(|slot| slot.dir_name()).unwrap_or_else(|| "--".to_string());
        match &plan.action {
            PlannedAction::Restore { from } => println!("{}  restore {} from {}", slot, plan.identity, from),
            PlannedAction::Extract { archive } => println!("{}  extract {}", slot, archive.display()),
            PlannedAction::Skip => println!("{}  skip {} (archive not found)", slot, plan.identity),
        }
    }
}

fn main() {

    // Bad arguments get exit code 1; help and version requests are not errors.
    let gdcard_args = match GdCardArgs::try_parse() {
        Ok(args) => args,
        Err(parse_error) => {
            let code = match parse_error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = parse_error.print();
            process::exit(code);
        }
    };

    init_logging(gdcard_args.verbose);

    let config = BuildConfig {
        game_list: gdcard_args.game_list,
        source_dir: gdcard_args.source_dir,
        target_dir: gdcard_args.target_dir,
        resources_dir: gdcard_args.resources,
    };
    let mut tools = SystemTools::new(ToolPrograms {
        unzip: gdcard_args.unzip,
        cdirip: gdcard_args.cdirip,
        gditools: gdcard_args.gditools,
        mkisofs: gdcard_args.mkisofs,
        cdi4dc: gdcard_args.cdi4dc,
    });

    let mut bridge = ConsoleBridge;
    let mut builder = CardBuilder::new(&config, &mut tools);
    let result = if gdcard_args.dry_run {
        builder.plan(&mut bridge).map(|_| ())
    } else {
        builder.run(&mut bridge).map(|summary| print_summary(&summary))
    };

    if let Err(build_error) = result {
        error!("{}", build_error);
        process::exit(build_error.exit_code());
    }
}

/// Sets up colourised logging, at Debug level if asked for. RUST_LOG still applies
/// otherwise.
fn init_logging(verbose: bool) {

    let mut builder = colog::default_builder();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Prints the end-of-run totals.
fn print_summary(summary: &BuildSummary) {

    println!(
        "{} slots written ({} restored, {} extracted, {} skipped), menu at {}",
        summary.slots.len() + 1,
        summary.restored,
        summary.extracted,
        summary.skipped.len(),
        summary.menu_image.display()
    );
    if !summary.unclaimed.is_empty() {
        println!("unclaimed from a previous session: {}", summary.unclaimed.join(", "));
    }
}
