use stepboy::interrupt::IF_ADDR;
use stepboy::mmu::{BGP, LCDC, LY, LYC, Memory, OBP0, STAT, WX, WY};
use stepboy::ppu::{DMG_PALETTE, Mode, Ppu, SCREEN_WIDTH};

const FRAME_CYCLES: u32 = 70_224;

fn run(ppu: &mut Ppu, mem: &mut Memory, cycles: u32) {
    for _ in 0..cycles / 4 {
        ppu.step(4, mem);
    }
}

fn lcd_on(lcdc: u8) -> (Ppu, Memory) {
    let mut mem = Memory::new();
    mem.set(LCDC, lcdc);
    mem.set(STAT, 0x80);
    mem.set(BGP, 0xE4);
    mem.set(OBP0, 0xE4);
    (Ppu::new(), mem)
}

/// Fill one 8x8 tile with a single color index.
fn solid_tile(mem: &mut Memory, addr: u16, color: u8) {
    let lo = if color & 1 != 0 { 0xFF } else { 0x00 };
    let hi = if color & 2 != 0 { 0xFF } else { 0x00 };
    for row in 0..8 {
        mem.set(addr + row * 2, lo);
        mem.set(addr + row * 2 + 1, hi);
    }
}

fn line(ppu: &Ppu, y: usize) -> &[u32] {
    &ppu.framebuffer()[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
}

#[test]
fn full_frame_walks_every_scanline_once() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    let mut lines = vec![];
    let mut last = None;
    for _ in 0..FRAME_CYCLES / 4 {
        ppu.step(4, &mut mem);
        let ly = mem.get(LY);
        if last != Some(ly) {
            lines.push(ly);
            last = Some(ly);
        }
    }
    let mut expected: Vec<u8> = (0..=153).collect();
    expected.push(0);
    assert_eq!(lines, expected);
    assert_eq!(ppu.frames(), 1);
    assert!(ppu.frame_ready());
    assert_eq!(mem.get(IF_ADDR) & 0x01, 0x01);
}

#[test]
fn stat_tracks_mode_transitions() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    ppu.step(4, &mut mem);
    assert_eq!(ppu.mode(), Mode::OamScan);
    assert_eq!(mem.get(STAT) & 0x03, 2);
    run(&mut ppu, &mut mem, 76);
    assert_eq!(ppu.mode(), Mode::Transfer);
    assert_eq!(mem.get(STAT) & 0x03, 3);
    run(&mut ppu, &mut mem, 172);
    assert_eq!(ppu.mode(), Mode::HBlank);
    run(&mut ppu, &mut mem, 204);
    assert_eq!(ppu.mode(), Mode::OamScan);
    assert_eq!(ppu.ly(), 1);
    run(&mut ppu, &mut mem, 143 * 456);
    assert_eq!(ppu.mode(), Mode::VBlank);
    assert_eq!(mem.get(STAT) & 0x03, 1);
}

#[test]
fn lyc_match_requests_stat() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    mem.set(LYC, 2);
    mem.set(STAT, 0x80 | 0x40);
    run(&mut ppu, &mut mem, 456 + 452);
    assert_eq!(mem.get(IF_ADDR) & 0x02, 0);
    run(&mut ppu, &mut mem, 4);
    assert_eq!(ppu.ly(), 2);
    assert_eq!(mem.get(IF_ADDR) & 0x02, 0x02);
    assert_eq!(mem.get(STAT) & 0x04, 0x04);
}

#[test]
fn hblank_source_requests_stat() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    mem.set(STAT, 0x80 | 0x08);
    run(&mut ppu, &mut mem, 248);
    assert_eq!(mem.get(IF_ADDR) & 0x02, 0);
    run(&mut ppu, &mut mem, 4);
    assert_eq!(mem.get(IF_ADDR) & 0x02, 0x02);
}

#[test]
fn lcd_off_blanks_screen() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    solid_tile(&mut mem, 0x8000, 3);
    run(&mut ppu, &mut mem, FRAME_CYCLES);
    assert!(ppu.framebuffer().iter().all(|&px| px == DMG_PALETTE[3]));

    mem.set(LCDC, 0x11);
    ppu.step(4, &mut mem);
    assert!(!ppu.lcd_on());
    assert_eq!(mem.get(LY), 0);
    assert_eq!(ppu.mode(), Mode::HBlank);
    assert!(ppu.framebuffer().iter().all(|&px| px == 0xFFFF_FFFF));
}

#[test]
fn scroll_wraps_background() {
    let (mut ppu, mut mem) = lcd_on(0x91);
    solid_tile(&mut mem, 0x8010, 3);
    // Tile 1 at map column 31: visible at the left edge once SCX wraps.
    mem.set(0x9800 + 31, 1);
    mem.set(0xFF43, 248);
    run(&mut ppu, &mut mem, 252);
    let row = line(&ppu, 0);
    assert!(row[..8].iter().all(|&px| px == DMG_PALETTE[3]));
    assert!(row[8..].iter().all(|&px| px == DMG_PALETTE[0]));
}

#[test]
fn signed_tile_data_addressing() {
    // LCDC bit 4 clear: tile 0 lives at 0x9000.
    let (mut ppu, mut mem) = lcd_on(0x81);
    solid_tile(&mut mem, 0x9000, 2);
    solid_tile(&mut mem, 0x8000, 1);
    run(&mut ppu, &mut mem, 252);
    assert!(line(&ppu, 0).iter().all(|&px| px == DMG_PALETTE[2]));
}

#[test]
fn background_disabled_renders_color_zero() {
    let (mut ppu, mut mem) = lcd_on(0xF0);
    mem.set(BGP, 0xE7); // index 0 -> darkest shade
    solid_tile(&mut mem, 0x8000, 1);
    run(&mut ppu, &mut mem, 252);
    assert!(line(&ppu, 0).iter().all(|&px| px == DMG_PALETTE[3]));
    assert_eq!(ppu.window_line_counter(), 0);
}

#[test]
fn window_overrides_background_from_wx() {
    // Window on using map 0x9C00.
    let (mut ppu, mut mem) = lcd_on(0xF1);
    solid_tile(&mut mem, 0x8010, 3);
    for i in 0..0x400 {
        mem.set(0x9C00 + i, 1);
    }
    mem.set(WY, 0);
    mem.set(WX, 87);
    run(&mut ppu, &mut mem, 252);
    let row = line(&ppu, 0);
    assert!(row[..80].iter().all(|&px| px == DMG_PALETTE[0]));
    assert!(row[80..].iter().all(|&px| px == DMG_PALETTE[3]));
    assert_eq!(ppu.window_line_counter(), 1);
}

#[test]
fn window_hidden_past_wx_limit() {
    let (mut ppu, mut mem) = lcd_on(0xF1);
    solid_tile(&mut mem, 0x8010, 3);
    for i in 0..0x400 {
        mem.set(0x9C00 + i, 1);
    }
    mem.set(WX, 167);
    run(&mut ppu, &mut mem, 252);
    assert!(line(&ppu, 0).iter().all(|&px| px == DMG_PALETTE[0]));
    assert_eq!(ppu.window_line_counter(), 0);
}

fn put_sprite(mem: &mut Memory, index: u16, y: u8, x: u8, tile: u8, flags: u8) {
    let base = 0xFE00 + index * 4;
    mem.set(base, y);
    mem.set(base + 1, x);
    mem.set(base + 2, tile);
    mem.set(base + 3, flags);
}

#[test]
fn ten_sprites_per_line() {
    let (mut ppu, mut mem) = lcd_on(0x93);
    solid_tile(&mut mem, 0x8010, 1);
    for i in 0..11u16 {
        put_sprite(&mut mem, i, 16, 8 + 8 * i as u8, 1, 0);
    }
    run(&mut ppu, &mut mem, 252);
    let row = line(&ppu, 0);
    assert!(row[..80].iter().all(|&px| px == DMG_PALETTE[1]));
    assert!(row[80..88].iter().all(|&px| px == DMG_PALETTE[0]));
}

#[test]
fn sprite_behind_nonzero_background() {
    let (mut ppu, mut mem) = lcd_on(0x93);
    // BG: tile 0 blank, tile 2 color 2 in the second map column.
    solid_tile(&mut mem, 0x8020, 2);
    mem.set(0x9801, 2);
    solid_tile(&mut mem, 0x8010, 1);
    put_sprite(&mut mem, 0, 16, 8, 1, 0x80);
    put_sprite(&mut mem, 1, 16, 16, 1, 0x80);
    run(&mut ppu, &mut mem, 252);
    let row = line(&ppu, 0);
    assert!(row[..8].iter().all(|&px| px == DMG_PALETTE[1]));
    assert!(row[8..16].iter().all(|&px| px == DMG_PALETTE[2]));
}

#[test]
fn sprite_flip_and_palette() {
    let (mut ppu, mut mem) = lcd_on(0x93);
    // Tile 1 row 0: only the leftmost pixel set (color 1).
    mem.set(0x8010, 0x80);
    mem.set(0xFF49, 0x1B); // OBP1 reverses the shades
    put_sprite(&mut mem, 0, 16, 8, 1, 0x20 | 0x10);
    run(&mut ppu, &mut mem, 252);
    let row = line(&ppu, 0);
    assert_eq!(row[7], DMG_PALETTE[2]);
    assert!(row[..7].iter().all(|&px| px == DMG_PALETTE[0]));

    // Vertical flip moves row 0 to the bottom of the sprite.
    let (mut ppu, mut mem) = lcd_on(0x93);
    mem.set(0x801E, 0x80);
    mem.set(0x801F, 0x80);
    put_sprite(&mut mem, 0, 16, 8, 1, 0x40);
    run(&mut ppu, &mut mem, 252);
    assert_eq!(line(&ppu, 0)[0], DMG_PALETTE[3]);
}

#[test]
fn tall_sprites_ignore_tile_low_bit() {
    let (mut ppu, mut mem) = lcd_on(0x97);
    solid_tile(&mut mem, 0x8020, 1); // tile 2: top half
    solid_tile(&mut mem, 0x8030, 2); // tile 3: bottom half
    put_sprite(&mut mem, 0, 16, 8, 3, 0);
    run(&mut ppu, &mut mem, 456 * 8 + 252);
    assert!(line(&ppu, 0)[..8].iter().all(|&px| px == DMG_PALETTE[1]));
    assert!(line(&ppu, 7)[..8].iter().all(|&px| px == DMG_PALETTE[1]));
    assert!(line(&ppu, 8)[..8].iter().all(|&px| px == DMG_PALETTE[2]));
    assert_eq!(line(&ppu, 8)[8], DMG_PALETTE[0]);
}

#[test]
fn tall_sprite_vertical_flip_spans_both_tiles() {
    let (mut ppu, mut mem) = lcd_on(0x97);
    solid_tile(&mut mem, 0x8020, 1);
    solid_tile(&mut mem, 0x8030, 2);
    put_sprite(&mut mem, 0, 16, 8, 2, 0x40);
    run(&mut ppu, &mut mem, 456 * 8 + 252);
    // Flipped: the bottom tile is drawn first.
    assert!(line(&ppu, 0)[..8].iter().all(|&px| px == DMG_PALETTE[2]));
    assert!(line(&ppu, 8)[..8].iter().all(|&px| px == DMG_PALETTE[1]));
}

#[test]
fn sprite_height_change_during_transfer_uses_scanned_height() {
    let (mut ppu, mut mem) = lcd_on(0x97);
    // Sprite top at line -12, so line 0 is row 12 of a tall sprite, or
    // row 3 once flipped.
    mem.set(0x8026, 0x80);
    mem.set(0x8027, 0x80);
    put_sprite(&mut mem, 0, 4, 8, 2, 0x40);
    run(&mut ppu, &mut mem, 80);
    assert_eq!(ppu.mode(), Mode::Transfer);

    mem.set(LCDC, 0x93);
    run(&mut ppu, &mut mem, 172);
    assert_eq!(ppu.mode(), Mode::HBlank);
    let row = line(&ppu, 0);
    assert_eq!(row[0], DMG_PALETTE[3]);
    assert!(row[1..].iter().all(|&px| px == DMG_PALETTE[0]));
}
