#![allow(dead_code)]

use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use stepboy::{cartridge::Cartridge, gameboy::GameBoy};

pub const ROM_SIZE: usize = 0x8000;
pub const ENTRY: usize = 0x0100;

/// Build a flat 32 KiB ROM image. Each `(addr, bytes)` section is copied in
/// after the header, so code may overlap the logo area.
pub fn build_rom(sections: &[(usize, &[u8])]) -> Vec<u8> {
    let mut rom = vec![0u8; ROM_SIZE];
    rom[0x0134..0x013C].copy_from_slice(b"STEPTEST");
    for (addr, bytes) in sections {
        rom[*addr..*addr + bytes.len()].copy_from_slice(bytes);
    }
    rom
}

/// A post-boot machine running `code` from 0x0100.
pub fn machine_with_code(code: &[u8]) -> GameBoy {
    machine_with_sections(&[(ENTRY, code)])
}

pub fn machine_with_sections(sections: &[(usize, &[u8])]) -> GameBoy {
    let mut gb = GameBoy::new();
    let cart = Cartridge::from_bytes(build_rom(sections)).expect("test rom is valid");
    gb.load_cartridge(cart);
    gb
}

/// Step `n` instructions, returning the total cycles.
pub fn run_steps(gb: &mut GameBoy, n: usize) -> u32 {
    (0..n).map(|_| u32::from(gb.step())).sum()
}

static TEST_ROMS: OnceCell<PathBuf> = OnceCell::new();

/// Directory holding the public test-ROM bundle, downloading it on first use.
pub fn test_roms_dir() -> &'static Path {
    TEST_ROMS.get_or_init(|| {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_roms");
        fs::create_dir_all(&dir).expect("failed to create test_roms directory");
        if !dir.join("blargg").exists() {
            download_bundle(&dir);
        }
        dir
    })
}

pub fn rom_path(rel: &str) -> PathBuf {
    test_roms_dir().join(rel)
}

fn download_bundle(dir: &Path) {
    let url = "https://github.com/c-sp/game-boy-test-roms/releases/download/v7.0/game-boy-test-roms-v7.0.zip";
    let resp = reqwest::blocking::get(url).expect("failed to download test roms");
    let status = resp.status();
    if !status.is_success() {
        panic!("failed to download test roms: {status}");
    }
    let bytes = resp.bytes().expect("failed to read rom bytes");
    let reader = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(reader).expect("failed to open zip archive");
    archive.extract(dir).expect("failed to extract test roms");
}
