use std::path::PathBuf;

use crate::hardware::AccessGating;

/// Per-subsystem diagnostic toggles.
///
/// These only decide what gets logged; emulated behavior is identical with
/// every toggle off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceConfig {
    pub cpu: bool,
    pub ppu: bool,
    pub boot: bool,
    pub mem: bool,
}

impl TraceConfig {
    pub fn any(&self) -> bool {
        self.cpu || self.ppu || self.boot || self.mem
    }
}

/// Everything the machine needs at startup.
#[derive(Clone, Debug, Default)]
pub struct EmulatorConfig {
    /// Cartridge image to map at 0x0000.
    pub rom: PathBuf,
    /// Optional 256-byte boot image. When absent the machine starts from the
    /// post-boot state at 0x0100.
    pub boot_rom: Option<PathBuf>,
    pub trace: TraceConfig,
    pub gating: AccessGating,
    /// Discard writes into the cartridge ROM window.
    pub protect_rom: bool,
    /// Enables the stuck-loop watchdog even without trace toggles.
    pub debug: bool,
}

impl EmulatorConfig {
    pub fn new(rom: impl Into<PathBuf>) -> Self {
        Self {
            rom: rom.into(),
            ..Self::default()
        }
    }
}
