use stepboy::cartridge::BootRom;
use stepboy::hardware::AccessGating;
use stepboy::input::Button;
use stepboy::interrupt::IF_ADDR;
use stepboy::mmu::{BOOT_OFF, DMA, LCDC, LY, Mmu, P1, SB, SC, STAT};

#[test]
fn boot_overlay_until_disabled() {
    let mut mmu = Mmu::new();
    mmu.memory_mut().load(0x0000, &[0x11; 0x200]);
    mmu.load_boot_rom(BootRom::from_bytes(vec![0xAA; 0x100]).unwrap());

    assert_eq!(mmu.read_byte(0x0000), 0xAA);
    assert_eq!(mmu.read_byte(0x00FF), 0xAA);
    assert_eq!(mmu.read_byte(0x0100), 0x11);

    mmu.write_byte(BOOT_OFF, 0x01);
    assert!(!mmu.boot_mapped);
    assert_eq!(mmu.read_byte(0x0000), 0x11);
}

#[test]
fn rom_writes_reach_backing_store() {
    let mut mmu = Mmu::new();
    mmu.memory_mut().load(0x0000, &[0x42; 0x8000]);
    mmu.write_byte(0x2000, 0x01);
    mmu.write_byte(0x7FFF, 0x02);
    assert_eq!(mmu.read_byte(0x2000), 0x01);
    assert_eq!(mmu.read_byte(0x7FFF), 0x02);
    assert_eq!(mmu.read_byte(0x2001), 0x42);
}

#[test]
fn protected_rom_drops_writes() {
    let mut mmu = Mmu::new();
    mmu.set_rom_protection(true);
    mmu.memory_mut().load(0x0000, &[0x42; 0x8000]);
    mmu.write_byte(0x2000, 0x01);
    mmu.write_byte(0x7FFF, 0x01);
    assert_eq!(mmu.read_byte(0x2000), 0x42);
    assert_eq!(mmu.read_byte(0x7FFF), 0x42);

    mmu.write_byte(0xC123, 0x99);
    assert_eq!(mmu.read_byte(0xC123), 0x99);
}

#[test]
fn serial_transfer_start_emits_byte() {
    let mut mmu = Mmu::new();
    for &b in b"ok" {
        mmu.write_byte(SB, b);
        mmu.write_byte(SC, 0x81);
        assert_eq!(mmu.read_byte(SC), 0);
    }
    // Without the start value nothing is sent.
    mmu.write_byte(SB, b'!');
    mmu.write_byte(SC, 0x01);
    assert_eq!(mmu.read_byte(SC), 0x01);
    assert_eq!(mmu.take_serial(), b"ok");
    assert!(mmu.take_serial().is_empty());
}

#[test]
fn joypad_select_and_interrupt() {
    let mut mmu = Mmu::new();
    assert!(mmu.set_button(Button::Start, true));
    assert!(mmu.set_button(Button::Left, true));
    assert_eq!(mmu.read_byte(IF_ADDR) & 0x10, 0x10);

    mmu.write_byte(P1, 0x10); // action buttons
    assert_eq!(mmu.read_byte(P1), 0xD7);
    mmu.write_byte(P1, 0x20); // directions
    assert_eq!(mmu.read_byte(P1), 0xED);
    mmu.write_byte(P1, 0x30);
    assert_eq!(mmu.read_byte(P1), 0xFF);

    mmu.write_byte(IF_ADDR, 0);
    assert!(!mmu.set_button(Button::Start, true));
    assert_eq!(mmu.read_byte(IF_ADDR) & 0x10, 0);
    assert!(mmu.set_button(Button::Start, false));
    assert_eq!(mmu.read_byte(IF_ADDR) & 0x10, 0x10);
}

#[test]
fn dma_blocks_oam_while_copying() {
    let mut mmu = Mmu::new();
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC000 + i, i as u8 + 1);
    }
    mmu.write_byte(DMA, 0xC0);
    assert!(mmu.dma.active());
    mmu.tick(8);
    assert_eq!(mmu.read_byte(0xFE00), 0xFF);
    mmu.write_byte(0xFE00, 0x77);

    mmu.tick(152);
    assert!(!mmu.dma.active());
    let oam = mmu.oam();
    assert_eq!(oam[0], 1);
    assert_eq!(oam[0x9F], 0xA0);
    assert_eq!(mmu.read_byte(0xFE05), 6);
}

#[test]
fn open_gating_exposes_partial_dma() {
    let mut mmu = Mmu::with_gating(AccessGating::Open);
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC000 + i, 0x5A);
    }
    mmu.write_byte(DMA, 0xC0);
    mmu.tick(4);
    assert_eq!(mmu.dma.progress(), 4);
    assert_eq!(mmu.read_byte(0xFE03), 0x5A);
    assert_eq!(mmu.read_byte(0xFE04), 0x00);
}

#[test]
fn strict_gating_follows_ppu_mode() {
    let mut mmu = Mmu::with_gating(AccessGating::Strict);
    mmu.write_byte(0x8000, 0x12);
    mmu.write_byte(0xFE00, 0x34);
    mmu.write_byte(LCDC, 0x91);

    // OAM scan: OAM blocked, VRAM open.
    mmu.tick(4);
    assert_eq!(mmu.read_byte(0xFE00), 0xFF);
    assert_eq!(mmu.read_byte(0x8000), 0x12);

    // Pixel transfer: both blocked, writes dropped.
    mmu.tick(80);
    assert_eq!(mmu.read_byte(0x8000), 0xFF);
    mmu.write_byte(0x8000, 0x99);

    // HBlank: both open again.
    mmu.tick(172);
    assert_eq!(mmu.read_byte(0x8000), 0x12);
    assert_eq!(mmu.read_byte(0xFE00), 0x34);
}

#[test]
fn stat_and_ly_writes() {
    let mut mmu = Mmu::new();
    mmu.memory_mut().set(STAT, 0x85);
    mmu.write_byte(STAT, 0xFF);
    assert_eq!(mmu.read_byte(STAT), 0xFD);
    mmu.write_byte(STAT, 0x00);
    assert_eq!(mmu.read_byte(STAT), 0x85);

    mmu.memory_mut().set(LY, 0x20);
    mmu.write_byte(LY, 0x55);
    assert_eq!(mmu.read_byte(LY), 0x20);
}

#[test]
fn post_boot_registers() {
    let mut mmu = Mmu::new();
    mmu.apply_post_boot_state();
    assert_eq!(mmu.read_byte(LCDC), 0x91);
    assert_eq!(mmu.read_byte(0xFF47), 0xFC);
    assert_eq!(mmu.read_byte(0xFF26), 0xF1);
    assert_eq!(mmu.read_byte(0xFFFF), 0x00);
}
