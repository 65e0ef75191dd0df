use log::warn;

use crate::{config::TraceConfig, cpu::Cpu, mmu::Mmu};

/// Frame boundaries with an unchanged PC before a loop is reported.
pub const STUCK_FRAMES: u32 = 300;

/// Development-time conditions worth a register dump. None of them change
/// emulated behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// Execution reached the I/O register block.
    PcInIo { pc: u16 },
    /// PC sat on the same address with interrupts disabled for
    /// [`STUCK_FRAMES`] consecutive frames.
    StuckLoop { pc: u16 },
}

#[derive(Debug, Default)]
pub struct Watchdog {
    check_io: bool,
    check_loop: bool,
    io_reported: bool,
    loop_reported: bool,
    last_frame: u64,
    last_pc: Option<u16>,
    same_pc_frames: u32,
}

impl Watchdog {
    pub fn new(trace: TraceConfig, debug: bool) -> Self {
        Self {
            check_io: trace.cpu,
            check_loop: debug || trace.any(),
            ..Self::default()
        }
    }

    /// Forget earlier observations, keeping the enabled checks.
    pub fn reset(&mut self) {
        *self = Self {
            check_io: self.check_io,
            check_loop: self.check_loop,
            ..Self::default()
        };
    }

    /// Inspect the machine after a step. Each kind of anomaly is reported
    /// at most once.
    pub fn observe(&mut self, cpu: &Cpu, mmu: &Mmu) -> Option<Anomaly> {
        let pc = cpu.regs.pc;
        if self.check_io && !self.io_reported && (0xFF00..0xFF80).contains(&pc) {
            self.io_reported = true;
            let anomaly = Anomaly::PcInIo { pc };
            report(anomaly, cpu, mmu);
            return Some(anomaly);
        }

        if !self.check_loop || self.loop_reported {
            return None;
        }
        let frames = mmu.ppu.frames();
        if frames == self.last_frame {
            return None;
        }
        self.last_frame = frames;
        // Waiting in HALT or with interrupts enabled is normal idling.
        if cpu.ime || cpu.halted || self.last_pc != Some(pc) {
            self.last_pc = Some(pc);
            self.same_pc_frames = 0;
            return None;
        }
        self.same_pc_frames += 1;
        if self.same_pc_frames < STUCK_FRAMES {
            return None;
        }
        self.loop_reported = true;
        let anomaly = Anomaly::StuckLoop { pc };
        report(anomaly, cpu, mmu);
        Some(anomaly)
    }
}

fn report(anomaly: Anomaly, cpu: &Cpu, mmu: &Mmu) {
    let pc = cpu.regs.pc;
    let start = pc.saturating_sub(4);
    let bytes: Vec<String> = (start..=pc.saturating_add(4))
        .map(|addr| format!("{:02X}", mmu.read_byte(addr)))
        .collect();
    warn!(
        "{anomaly:?}: {} | bytes from {start:04X}: {}",
        cpu.debug_state(),
        bytes.join(" ")
    );
}
