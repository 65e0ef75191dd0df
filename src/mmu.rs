use log::{debug, info, trace};

use crate::{
    cartridge::{BootRom, Cartridge},
    dma::{Dma, OAM_START},
    hardware::AccessGating,
    input::{Button, Input},
    interrupt::{IE_ADDR, IF_ADDR, INTERRUPT_MASK, Interrupt},
    ppu::{Mode, Ppu},
    serial::{Serial, TRANSFER_START},
    timer::Timer,
};

pub const MEM_SIZE: usize = 0x1_0000;

// I/O registers (gbdev.io/pandocs/Hardware_Reg_List.html)
pub const P1: u16 = 0xFF00;
pub const SB: u16 = 0xFF01;
pub const SC: u16 = 0xFF02;
pub const DIV: u16 = 0xFF04;
pub const TIMA: u16 = 0xFF05;
pub const TMA: u16 = 0xFF06;
pub const TAC: u16 = 0xFF07;
pub const LCDC: u16 = 0xFF40;
pub const STAT: u16 = 0xFF41;
pub const SCY: u16 = 0xFF42;
pub const SCX: u16 = 0xFF43;
pub const LY: u16 = 0xFF44;
pub const LYC: u16 = 0xFF45;
pub const DMA: u16 = 0xFF46;
pub const BGP: u16 = 0xFF47;
pub const OBP0: u16 = 0xFF48;
pub const OBP1: u16 = 0xFF49;
pub const WY: u16 = 0xFF4A;
pub const WX: u16 = 0xFF4B;
pub const BOOT_OFF: u16 = 0xFF50;

/// DMG register contents left behind by the boot ROM.
const POST_BOOT_IO: [(u16, u8); 34] = [
    (TIMA, 0x00),
    (TMA, 0x00),
    (TAC, 0x00),
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
    (LCDC, 0x91),
    (STAT, 0x80),
    (SCY, 0x00),
    (SCX, 0x00),
    (LY, 0x00),
    (LYC, 0x00),
    (BGP, 0xFC),
    (OBP0, 0xFF),
    (OBP1, 0xFF),
    (WY, 0x00),
    (WX, 0x00),
    (IF_ADDR, 0x00),
    (IE_ADDR, 0x00),
];

/// Flat 64 KiB backing store.
///
/// Peripherals use `get`/`set` to maintain their own registers (DIV, TIMA,
/// LY, STAT mode bits, IF). Those accessors have no side effects; everything
/// the CPU does goes through [`Mmu::read_byte`] and [`Mmu::write_byte`].
pub struct Memory {
    bytes: Box<[u8; MEM_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; MEM_SIZE]),
        }
    }

    #[inline]
    pub fn get(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    #[inline]
    pub fn set(&mut self, addr: u16, val: u8) {
        self.bytes[addr as usize] = val;
    }

    /// Copy `data` starting at `base`, clipped to the end of the address space.
    pub fn load(&mut self, base: u16, data: &[u8]) {
        let start = base as usize;
        let len = data.len().min(MEM_SIZE - start);
        self.bytes[start..start + len].copy_from_slice(&data[..len]);
    }

    pub fn request_interrupt(&mut self, kind: Interrupt) {
        self.bytes[IF_ADDR as usize] |= kind.bit();
    }

    /// Interrupts both requested and enabled.
    pub fn pending_interrupts(&self) -> u8 {
        self.get(IF_ADDR) & self.get(IE_ADDR) & INTERRUPT_MASK
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Mmu {
    mem: Memory,
    boot_rom: Option<BootRom>,
    pub boot_mapped: bool,
    pub timer: Timer,
    pub dma: Dma,
    pub ppu: Ppu,
    pub input: Input,
    pub serial: Serial,
    gating: AccessGating,
    /// Drop CPU writes to 0x0000-0x7FFF instead of storing them.
    protect_rom: bool,
    trace_mem: bool,
}

impl Mmu {
    pub fn new() -> Self {
        Self::with_gating(AccessGating::default())
    }

    pub fn with_gating(gating: AccessGating) -> Self {
        Self {
            mem: Memory::new(),
            boot_rom: None,
            boot_mapped: false,
            timer: Timer::new(),
            dma: Dma::new(),
            ppu: Ppu::new(),
            input: Input::new(),
            serial: Serial::new(),
            gating,
            protect_rom: false,
            trace_mem: false,
        }
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_mem = enabled;
    }

    pub fn gating(&self) -> AccessGating {
        self.gating
    }

    pub fn set_rom_protection(&mut self, enabled: bool) {
        self.protect_rom = enabled;
    }

    pub fn rom_protected(&self) -> bool {
        self.protect_rom
    }

    pub fn load_cart(&mut self, cart: &Cartridge) {
        self.mem.load(0x0000, cart.image());
    }

    pub fn load_boot_rom(&mut self, boot: BootRom) {
        self.boot_rom = Some(boot);
        self.boot_mapped = true;
        info!("Boot ROM mapped at 0x0000-0x00FF");
    }

    pub fn take_boot_rom(&mut self) -> Option<BootRom> {
        self.boot_mapped = false;
        self.boot_rom.take()
    }

    /// Initialize I/O registers to the values the DMG boot ROM leaves behind.
    pub fn apply_post_boot_state(&mut self) {
        for (addr, val) in POST_BOOT_IO {
            self.mem.set(addr, val);
        }
        self.timer = Timer::new();
        debug!(
            "post-boot registers applied (LCDC={:02X} BGP={:02X})",
            self.mem.get(LCDC),
            self.mem.get(BGP)
        );
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        if self.boot_mapped
            && addr < 0x0100
            && let Some(boot) = &self.boot_rom
        {
            return boot.read(addr);
        }
        if addr == P1 {
            return self.input.read(self.mem.get(P1));
        }
        if self.blocked(addr) {
            return 0xFF;
        }
        self.mem.get(addr)
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        if self.trace_mem && addr >= 0xFF00 {
            trace!("write {addr:04X} <- {val:02X}");
        }
        match addr {
            0x0000..=0x7FFF if self.protect_rom => {
                if self.trace_mem {
                    trace!("dropped ROM write {addr:04X} <- {val:02X}");
                }
            }
            _ if self.blocked(addr) => {
                if self.trace_mem {
                    trace!("blocked write {addr:04X} <- {val:02X}");
                }
            }
            P1 => self.mem.set(P1, val & 0x30),
            SC => {
                if val == TRANSFER_START {
                    let byte = self.mem.get(SB);
                    self.serial.transmit(byte);
                    self.mem.set(SC, 0);
                } else {
                    self.mem.set(SC, val);
                }
            }
            DIV => self.timer.reset_div(&mut self.mem),
            STAT => {
                let old = self.mem.get(STAT);
                self.mem.set(STAT, 0x80 | (val & 0x78) | (old & 0x07));
            }
            LY => {}
            DMA => {
                self.mem.set(DMA, val);
                self.dma.start(val);
            }
            BOOT_OFF if self.boot_mapped => {
                self.boot_mapped = false;
                info!("Boot ROM disabled");
            }
            _ => self.mem.set(addr, val),
        }
    }

    fn blocked(&self, addr: u16) -> bool {
        let ppu_gating = self.gating.ppu_blocks_video() && self.ppu.lcd_on();
        match addr {
            0x8000..=0x9FFF => ppu_gating && self.ppu.mode() == Mode::Transfer,
            0xFE00..=0xFE9F => {
                (self.gating.dma_blocks_oam() && self.dma.active())
                    || (ppu_gating && matches!(self.ppu.mode(), Mode::OamScan | Mode::Transfer))
            }
            _ => false,
        }
    }

    pub fn request_interrupt(&mut self, kind: Interrupt) {
        self.mem.request_interrupt(kind);
    }

    pub fn pending_interrupts(&self) -> u8 {
        self.mem.pending_interrupts()
    }

    /// Clear one IF bit after dispatch.
    pub fn acknowledge_interrupt(&mut self, kind: Interrupt) {
        let flags = self.mem.get(IF_ADDR);
        self.mem.set(IF_ADDR, flags & !kind.bit());
    }

    pub fn reset_div(&mut self) {
        self.timer.reset_div(&mut self.mem);
    }

    /// Advance the peripherals by `cycles` T-cycles: timer, then DMA one
    /// byte per cycle, then the PPU.
    pub fn tick(&mut self, cycles: u16) {
        self.timer.step(cycles, &mut self.mem);
        for _ in 0..cycles {
            if !self.dma.active() {
                break;
            }
            self.dma.step(&mut self.mem);
        }
        self.ppu.step(cycles, &mut self.mem);
    }

    /// Update a button, requesting the joypad interrupt on any change.
    pub fn set_button(&mut self, button: Button, pressed: bool) -> bool {
        let changed = self.input.set_pressed(button, pressed);
        if changed {
            self.mem.request_interrupt(Interrupt::Joypad);
        }
        changed
    }

    pub fn take_serial(&mut self) -> Vec<u8> {
        self.serial.take_output()
    }

    /// Raw OAM contents, bypassing gating.
    pub fn oam(&self) -> [u8; 0xA0] {
        let mut oam = [0; 0xA0];
        for (i, byte) in oam.iter_mut().enumerate() {
            *byte = self.mem.get(OAM_START + i as u16);
        }
        oam
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
