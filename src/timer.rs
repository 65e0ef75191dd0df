use crate::interrupt::Interrupt;
use crate::mmu::{DIV, Memory, TAC, TIMA, TMA};

/// TIMA input periods in T-cycles, indexed by TAC bits 0-1.
const TIMA_PERIODS: [u32; 4] = [1024, 16, 64, 256];

/// Cycles between a TIMA overflow and the TMA reload. TIMA reads 0 meanwhile.
const RELOAD_DELAY: i32 = 4;

/// Divider and TIMA state that does not live in the I/O registers.
///
/// DIV/TIMA/TMA/TAC themselves stay in bus memory so software sees them as
/// ordinary registers; the timer only owns the accumulators behind them.
#[derive(Debug, Default)]
pub struct Timer {
    /// 16-bit free-running divider. DIV is the upper 8 bits.
    pub div_counter: u16,
    /// Cycles accumulated toward the next TIMA increment.
    tima_counter: u32,
    /// TIMA overflowed and is waiting for the TMA reload.
    overflow: bool,
    reload_delay: i32,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible DIV value.
    pub fn div(&self) -> u8 {
        (self.div_counter >> 8) as u8
    }

    /// Returns true while an overflow is waiting for its TMA reload.
    pub fn reload_pending(&self) -> bool {
        self.overflow
    }

    /// Reset the divider, as any write to DIV does.
    pub fn reset_div(&mut self, mem: &mut Memory) {
        self.div_counter = 0;
        mem.set(DIV, 0);
    }

    /// Advance the timer by `cycles` T-cycles, requesting the timer
    /// interrupt when TIMA overflows.
    pub fn step(&mut self, cycles: u16, mem: &mut Memory) {
        self.div_counter = self.div_counter.wrapping_add(cycles);
        mem.set(DIV, self.div());

        if self.overflow {
            self.reload_delay -= i32::from(cycles);
            if self.reload_delay <= 0 {
                mem.set(TIMA, mem.get(TMA));
                self.overflow = false;
            }
        }

        let tac = mem.get(TAC);
        if tac & 0x04 == 0 {
            return;
        }

        let period = TIMA_PERIODS[(tac & 0x03) as usize];
        self.tima_counter += u32::from(cycles);
        while self.tima_counter >= period {
            self.tima_counter -= period;
            let tima = mem.get(TIMA);
            if tima == 0xFF {
                mem.set(TIMA, 0);
                mem.request_interrupt(Interrupt::Timer);
                self.overflow = true;
                self.reload_delay = RELOAD_DELAY;
            } else {
                mem.set(TIMA, tima + 1);
            }
        }
    }
}
