use log::{info, trace};

use crate::{
    cartridge::{BootRom, Cartridge},
    config::{EmulatorConfig, TraceConfig},
    cpu::Cpu,
    diagnostics::{Anomaly, Watchdog},
    error::LoadError,
    hardware::AccessGating,
    input::Button,
    mmu::{LCDC, LY, Mmu},
    ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
    serial::SerialSink,
};

/// T-cycles in one frame: 154 lines of 456 cycles.
pub const CYCLES_PER_FRAME: u32 = 70_224;

pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
    pub watchdog: Watchdog,
    trace: TraceConfig,
    cart: Option<Cartridge>,
    anomaly: Option<Anomaly>,
}

impl GameBoy {
    /// A machine in the post-boot state with nothing loaded.
    pub fn new() -> Self {
        Self::with_gating(AccessGating::default())
    }

    pub fn with_gating(gating: AccessGating) -> Self {
        let mut mmu = Mmu::with_gating(gating);
        mmu.apply_post_boot_state();
        Self {
            cpu: Cpu::new(),
            mmu,
            watchdog: Watchdog::default(),
            trace: TraceConfig::default(),
            cart: None,
            anomaly: None,
        }
    }

    /// Load everything `config` names and apply its trace toggles.
    pub fn from_config(config: &EmulatorConfig) -> Result<Self, LoadError> {
        let cart = Cartridge::from_file(&config.rom)?;
        let boot = config
            .boot_rom
            .as_deref()
            .map(BootRom::from_file)
            .transpose()?;

        let mut gb = Self::with_gating(config.gating);
        gb.mmu.set_rom_protection(config.protect_rom);
        gb.watchdog = Watchdog::new(config.trace, config.debug);
        gb.set_trace(config.trace);
        gb.load_cartridge(cart);
        if let Some(boot) = boot {
            gb.load_boot_rom(boot);
        }
        Ok(gb)
    }

    pub fn set_trace(&mut self, trace: TraceConfig) {
        self.trace = trace;
        self.cpu.set_trace(trace.cpu);
        self.mmu.set_trace(trace.mem);
        self.mmu.ppu.set_trace(trace.ppu);
    }

    pub fn load_cartridge(&mut self, cart: Cartridge) {
        self.mmu.load_cart(&cart);
        self.cart = Some(cart);
    }

    /// Map a boot image and restart the machine from its power-on state.
    pub fn load_boot_rom(&mut self, boot: BootRom) {
        self.rebuild(Some(boot));
    }

    /// Return to the initial state, keeping the loaded cartridge and boot
    /// image.
    pub fn reset(&mut self) {
        let boot = self.mmu.take_boot_rom();
        self.rebuild(boot);
        info!("reset");
    }

    fn rebuild(&mut self, boot: Option<BootRom>) {
        let mut mmu = Mmu::with_gating(self.mmu.gating());
        mmu.set_rom_protection(self.mmu.rom_protected());
        mmu.serial = std::mem::take(&mut self.mmu.serial);
        if let Some(cart) = &self.cart {
            mmu.load_cart(cart);
        }
        self.cpu = match boot {
            Some(boot) => {
                mmu.load_boot_rom(boot);
                Cpu::power_on()
            }
            None => {
                mmu.apply_post_boot_state();
                Cpu::new()
            }
        };
        self.mmu = mmu;
        self.set_trace(self.trace);
        self.watchdog.reset();
        self.anomaly = None;
    }

    /// Run one instruction and advance the peripherals by the cycles it
    /// took, then service interrupts. Returns the total T-cycles elapsed.
    pub fn step(&mut self) -> u16 {
        // STOP halts the whole machine: no peripheral time, no dispatch.
        if self.cpu.stopped {
            let cycles = self.cpu.step(&mut self.mmu);
            self.cpu.cycles += u64::from(cycles);
            return cycles;
        }
        if self.trace.boot && self.mmu.boot_mapped {
            self.trace_boot();
        }

        let replay = self.cpu.take_halt_bug();
        let mut cycles = self.cpu.step(&mut self.mmu);
        if replay {
            // Halt bug: the byte after HALT is read again without PC advancing.
            self.cpu.regs.pc = self.cpu.regs.pc.wrapping_sub(1);
            cycles += self.cpu.step(&mut self.mmu);
        }
        self.mmu.tick(cycles);

        self.cpu.wake_if_pending(&self.mmu);
        let dispatch = self.cpu.service_interrupts(&mut self.mmu);
        if dispatch != 0 {
            self.mmu.tick(dispatch);
            cycles += dispatch;
        }

        self.cpu.cycles += u64::from(cycles);
        if let Some(anomaly) = self.watchdog.observe(&self.cpu, &self.mmu) {
            self.anomaly = Some(anomaly);
        }
        cycles
    }

    /// Step until at least one frame's worth of cycles has elapsed.
    pub fn run_frame(&mut self) -> u32 {
        let mut elapsed = 0u32;
        while elapsed < CYCLES_PER_FRAME {
            elapsed += u32::from(self.step());
        }
        elapsed
    }

    fn trace_boot(&self) {
        let pc = self.cpu.regs.pc;
        let mem = self.mmu.memory();
        trace!(
            "boot PC={pc:04X} op={:02X} LCDC={:02X} LY={:02X}",
            self.mmu.read_byte(pc),
            mem.get(LCDC),
            mem.get(LY)
        );
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.mmu.set_button(button, pressed);
    }

    pub fn framebuffer(&self) -> &[u32; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.mmu.ppu.framebuffer()
    }

    pub fn frame_ready(&self) -> bool {
        self.mmu.ppu.frame_ready()
    }

    pub fn clear_frame_flag(&mut self) {
        self.mmu.ppu.clear_frame_flag();
    }

    pub fn frames(&self) -> u64 {
        self.mmu.ppu.frames()
    }

    /// Bytes sent over the serial port since the last call.
    pub fn take_serial(&mut self) -> Vec<u8> {
        self.mmu.take_serial()
    }

    pub fn set_serial_sink(&mut self, sink: Box<dyn SerialSink>) {
        self.mmu.serial.connect(sink);
    }

    /// The watchdog's most recent report, if any. Taking it clears it.
    pub fn take_anomaly(&mut self) -> Option<Anomaly> {
        self.anomaly.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cart.as_ref()
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
