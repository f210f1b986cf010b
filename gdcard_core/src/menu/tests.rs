// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::disc_header::DiscHeader;
use crate::slot::Slot;
use crate::test_support::header_fixture;

use super::{MenuBuilder, MenuEntry};

const MENU_BLOCK: &str = "01.name=GDMENU\n\
                          01.disc=1/1\n\
                          01.vga=1\n\
                          01.region=JUE\n\
                          01.version=V0.6\n\
                          01.date=20160812\n";

#[test]
fn menu_program_block_should_be_constant() {

    assert_eq!(MenuEntry::menu_program().render(), MENU_BLOCK);
}

#[test]
fn empty_builder_should_render_header_and_menu_block() {

    let builder = MenuBuilder::new();

    assert_eq!(builder.render(), format!("[GDMENU]\n{}", MENU_BLOCK));
}

#[test]
fn game_entries_should_follow_in_push_order() {

    let header_a = DiscHeader::parse(&header_fixture("GAME A", "1/2", "0", "J", "V1.000", "19990101")).unwrap();
    let header_b = DiscHeader::parse(&header_fixture("GAME B", "1/1", "1", "E", "V1.002", "20000202")).unwrap();

    let mut builder = MenuBuilder::new();
    builder.push(MenuEntry::from_header(Slot::new(2).unwrap(), &header_a.name, &header_a));
    builder.push(MenuEntry::from_header(Slot::new(3).unwrap(), "Cached B", &header_b));

    let expected = format!(
        "[GDMENU]\n{}\n\
         02.name=GAME A\n02.disc=1/2\n02.vga=0\n02.region=J\n02.version=V1.000\n02.date=19990101\n\
         \n\
         03.name=Cached B\n03.disc=1/1\n03.vga=1\n03.region=E\n03.version=V1.002\n03.date=20000202\n",
        MENU_BLOCK
    );

    assert_eq!(builder.render(), expected);
}

#[test]
fn builder_should_not_deduplicate() {

    let header = DiscHeader::parse(&header_fixture("SAME", "1/1", "1", "U", "V1.000", "20000101")).unwrap();

    let mut builder = MenuBuilder::new();
    builder.push(MenuEntry::from_header(Slot::new(2).unwrap(), "SAME", &header));
    builder.push(MenuEntry::from_header(Slot::new(3).unwrap(), "SAME", &header));

    assert_eq!(builder.entries().len(), 3);
    assert_eq!(builder.entries()[0], MenuEntry::menu_program());
}
