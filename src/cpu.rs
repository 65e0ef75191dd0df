mod instructions;
mod registers;

pub use instructions::{
    AluOp, CbInstruction, Cond, Cost, EXTENDED, Indirect, Instruction, Opcode, PRIMARY, Reg8,
    Reg16, ShiftOp, StackReg,
};
pub use registers::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z, RegisterPair, Registers};

use log::{debug, trace, warn};

use crate::{interrupt::Interrupt, mmu::Mmu};

/// Cycles spent pushing PC and jumping to an interrupt vector.
pub const INTERRUPT_DISPATCH_CYCLES: u16 = 20;

const HALTED_CYCLES: u16 = 1;
const STOPPED_CYCLES: u16 = 1;
const LOCKED_CYCLES: u16 = 4;

const PREFIX: u8 = 0xCB;

pub struct Cpu {
    pub regs: Registers,
    pub cycles: u64,
    pub ime: bool,
    pub halted: bool,
    /// Entered by STOP. Only a reset leaves it.
    pub stopped: bool,
    /// Set after an unused opcode executes.
    pub locked: bool,
    halt_bug: bool,
    ime_enable_pending: bool,
    ime_disable_pending: bool,
    trace: bool,
}

impl Cpu {
    /// CPU in the state the DMG boot ROM leaves behind.
    pub fn new() -> Self {
        Self::with_registers(Registers::post_boot())
    }

    /// CPU at power on, about to run a boot image from 0x0000.
    pub fn power_on() -> Self {
        Self::with_registers(Registers::power_on())
    }

    fn with_registers(regs: Registers) -> Self {
        Self {
            regs,
            cycles: 0,
            ime: false,
            halted: false,
            stopped: false,
            locked: false,
            halt_bug: false,
            ime_enable_pending: false,
            ime_disable_pending: false,
            trace: false,
        }
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Consume the halt-bug flag armed by the last HALT.
    pub fn take_halt_bug(&mut self) -> bool {
        std::mem::take(&mut self.halt_bug)
    }

    /// Leave HALT once any enabled interrupt is requested, regardless of IME.
    pub fn wake_if_pending(&mut self, mmu: &Mmu) {
        if self.halted && mmu.pending_interrupts() != 0 {
            self.halted = false;
        }
    }

    /// Return a formatted string of the current CPU state for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} PC:{:04X} SP:{:04X} IME:{} HALT:{} CY:{}",
            self.regs.af(),
            self.regs.bc.get(),
            self.regs.de.get(),
            self.regs.hl.get(),
            self.regs.pc,
            self.regs.sp,
            u8::from(self.ime),
            u8::from(self.halted),
            self.cycles
        )
    }

    /// Dispatch the highest-priority pending interrupt if IME allows it.
    /// Returns the cycles consumed, 0 when nothing was dispatched.
    pub fn service_interrupts(&mut self, mmu: &mut Mmu) -> u16 {
        if self.locked || self.stopped || !self.ime {
            return 0;
        }
        let Some(kind) = Interrupt::highest(mmu.pending_interrupts()) else {
            return 0;
        };
        self.ime = false;
        self.halted = false;
        let pc = self.regs.pc;
        self.push_stack(mmu, pc);
        mmu.acknowledge_interrupt(kind);
        self.regs.pc = kind.vector();
        if self.trace {
            trace!("interrupt {kind:?} from {pc:04X} to {:04X}", self.regs.pc);
        }
        INTERRUPT_DISPATCH_CYCLES
    }

    /// Execute one instruction and return the T-cycles it took.
    pub fn step(&mut self, mmu: &mut Mmu) -> u16 {
        if self.locked {
            return LOCKED_CYCLES;
        }
        if self.stopped {
            return STOPPED_CYCLES;
        }
        if self.halted {
            return HALTED_CYCLES;
        }

        let enable_after = self.ime_enable_pending;
        let pc = self.regs.pc;
        let opcode = self.fetch8(mmu);
        let entry = PRIMARY[opcode as usize];
        if self.trace {
            trace!("{pc:04X}: {opcode:02X} {:?} | {}", entry.instr, self.debug_state());
        }
        let cycles = self.execute(entry, opcode, mmu);

        if self.ime_disable_pending {
            self.ime = false;
            self.ime_disable_pending = false;
            self.ime_enable_pending = false;
        } else if enable_after && self.ime_enable_pending {
            self.ime = true;
            self.ime_enable_pending = false;
        }
        cycles
    }

    #[inline(always)]
    fn fetch8(&mut self, mmu: &Mmu) -> u8 {
        let val = mmu.read_byte(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    #[inline(always)]
    fn fetch16(&mut self, mmu: &Mmu) -> u16 {
        let lo = self.fetch8(mmu);
        let hi = self.fetch8(mmu);
        u16::from_le_bytes([lo, hi])
    }

    fn push_stack(&mut self, mmu: &mut Mmu, val: u16) {
        let [hi, lo] = val.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        mmu.write_byte(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        mmu.write_byte(self.regs.sp, lo);
    }

    fn pop_stack(&mut self, mmu: &Mmu) -> u16 {
        let lo = mmu.read_byte(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = mmu.read_byte(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    fn read_reg(&self, mmu: &Mmu, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.b(),
            Reg8::C => self.regs.c(),
            Reg8::D => self.regs.d(),
            Reg8::E => self.regs.e(),
            Reg8::H => self.regs.h(),
            Reg8::L => self.regs.l(),
            Reg8::HlInd => mmu.read_byte(self.regs.hl.get()),
            Reg8::A => self.regs.a(),
        }
    }

    fn write_reg(&mut self, mmu: &mut Mmu, reg: Reg8, val: u8) {
        match reg {
            Reg8::B => self.regs.set_b(val),
            Reg8::C => self.regs.set_c(val),
            Reg8::D => self.regs.set_d(val),
            Reg8::E => self.regs.set_e(val),
            Reg8::H => self.regs.set_h(val),
            Reg8::L => self.regs.set_l(val),
            Reg8::HlInd => mmu.write_byte(self.regs.hl.get(), val),
            Reg8::A => self.regs.set_a(val),
        }
    }

    fn read_pair(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::BC => self.regs.bc.get(),
            Reg16::DE => self.regs.de.get(),
            Reg16::HL => self.regs.hl.get(),
            Reg16::SP => self.regs.sp,
        }
    }

    fn write_pair(&mut self, reg: Reg16, val: u16) {
        match reg {
            Reg16::BC => self.regs.bc.set(val),
            Reg16::DE => self.regs.de.set(val),
            Reg16::HL => self.regs.hl.set(val),
            Reg16::SP => self.regs.sp = val,
        }
    }

    /// Resolve an indirect address, applying the HL post-increment/decrement.
    fn indirect_addr(&mut self, ind: Indirect) -> u16 {
        match ind {
            Indirect::BC => self.regs.bc.get(),
            Indirect::DE => self.regs.de.get(),
            Indirect::HlInc => {
                let hl = self.regs.hl.get();
                self.regs.hl.set(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDec => {
                let hl = self.regs.hl.get();
                self.regs.hl.set(hl.wrapping_sub(1));
                hl
            }
        }
    }

    fn condition(&self, cond: Option<Cond>) -> bool {
        match cond {
            None => true,
            Some(Cond::NZ) => !self.regs.flag(FLAG_Z),
            Some(Cond::Z) => self.regs.flag(FLAG_Z),
            Some(Cond::NC) => !self.regs.flag(FLAG_C),
            Some(Cond::C) => self.regs.flag(FLAG_C),
        }
    }

    fn execute(&mut self, entry: Opcode<Instruction>, opcode: u8, mmu: &mut Mmu) -> u16 {
        let mut taken = true;
        match entry.instr {
            Instruction::Nop => {}
            Instruction::Prefix => {
                let cb = self.fetch8(mmu);
                let ext = EXTENDED[cb as usize];
                self.execute_cb(ext.instr, mmu);
                return ext.cost.cycles(true);
            }
            Instruction::Illegal => {
                self.locked = true;
                warn!(
                    "illegal opcode {opcode:02X} at {:04X}; CPU locked",
                    self.regs.pc.wrapping_sub(1)
                );
            }
            Instruction::Stop => {
                // STOP is followed by a padding byte.
                self.fetch8(mmu);
                mmu.reset_div();
                self.stopped = true;
                debug!("STOP at {:04X}", self.regs.pc.wrapping_sub(2));
            }
            Instruction::Halt => {
                if self.ime || self.ime_enable_pending || mmu.pending_interrupts() == 0 {
                    self.halted = true;
                } else {
                    self.halt_bug = true;
                }
            }
            Instruction::Di => {
                self.ime_disable_pending = true;
                self.ime_enable_pending = false;
            }
            Instruction::Ei => self.ime_enable_pending = true,

            Instruction::Ld(dst, src) => {
                let val = self.read_reg(mmu, src);
                self.write_reg(mmu, dst, val);
            }
            Instruction::LdImm(dst) => {
                let val = self.fetch8(mmu);
                self.write_reg(mmu, dst, val);
            }
            Instruction::LdImm16(reg) => {
                let val = self.fetch16(mmu);
                self.write_pair(reg, val);
            }
            Instruction::StoreA(ind) => {
                let addr = self.indirect_addr(ind);
                mmu.write_byte(addr, self.regs.a());
            }
            Instruction::LoadA(ind) => {
                let addr = self.indirect_addr(ind);
                self.regs.set_a(mmu.read_byte(addr));
            }
            Instruction::StoreAAbs => {
                let addr = self.fetch16(mmu);
                mmu.write_byte(addr, self.regs.a());
            }
            Instruction::LoadAAbs => {
                let addr = self.fetch16(mmu);
                self.regs.set_a(mmu.read_byte(addr));
            }
            Instruction::StoreHigh => {
                let addr = 0xFF00 | u16::from(self.fetch8(mmu));
                mmu.write_byte(addr, self.regs.a());
            }
            Instruction::LoadHigh => {
                let addr = 0xFF00 | u16::from(self.fetch8(mmu));
                self.regs.set_a(mmu.read_byte(addr));
            }
            Instruction::StoreHighC => {
                mmu.write_byte(0xFF00 | u16::from(self.regs.c()), self.regs.a());
            }
            Instruction::LoadHighC => {
                let val = mmu.read_byte(0xFF00 | u16::from(self.regs.c()));
                self.regs.set_a(val);
            }
            Instruction::StoreSp => {
                let addr = self.fetch16(mmu);
                let [lo, hi] = self.regs.sp.to_le_bytes();
                mmu.write_byte(addr, lo);
                mmu.write_byte(addr.wrapping_add(1), hi);
            }
            Instruction::LdSpHl => self.regs.sp = self.regs.hl.get(),
            Instruction::LdHlSp => {
                let offset = self.fetch8(mmu);
                let val = self.sp_plus(offset);
                self.regs.hl.set(val);
            }
            Instruction::AddSp => {
                let offset = self.fetch8(mmu);
                self.regs.sp = self.sp_plus(offset);
            }
            Instruction::Push(reg) => {
                let val = match reg {
                    StackReg::BC => self.regs.bc.get(),
                    StackReg::DE => self.regs.de.get(),
                    StackReg::HL => self.regs.hl.get(),
                    StackReg::AF => self.regs.af(),
                };
                self.push_stack(mmu, val);
            }
            Instruction::Pop(reg) => {
                let val = self.pop_stack(mmu);
                match reg {
                    StackReg::BC => self.regs.bc.set(val),
                    StackReg::DE => self.regs.de.set(val),
                    StackReg::HL => self.regs.hl.set(val),
                    StackReg::AF => self.regs.set_af(val),
                }
            }

            Instruction::Alu(op, src) => {
                let val = self.read_reg(mmu, src);
                self.alu(op, val);
            }
            Instruction::AluImm(op) => {
                let val = self.fetch8(mmu);
                self.alu(op, val);
            }
            Instruction::Inc(reg) => {
                let val = self.read_reg(mmu, reg);
                let res = self.inc8(val);
                self.write_reg(mmu, reg, res);
            }
            Instruction::Dec(reg) => {
                let val = self.read_reg(mmu, reg);
                let res = self.dec8(val);
                self.write_reg(mmu, reg, res);
            }
            Instruction::Inc16(reg) => {
                let val = self.read_pair(reg).wrapping_add(1);
                self.write_pair(reg, val);
            }
            Instruction::Dec16(reg) => {
                let val = self.read_pair(reg).wrapping_sub(1);
                self.write_pair(reg, val);
            }
            Instruction::AddHl(reg) => {
                let val = self.read_pair(reg);
                self.add_hl(val);
            }

            Instruction::Rlca => {
                let a = self.regs.a();
                self.regs.set_a(a.rotate_left(1));
                self.regs.set_flags(false, false, false, a & 0x80 != 0);
            }
            Instruction::Rrca => {
                let a = self.regs.a();
                self.regs.set_a(a.rotate_right(1));
                self.regs.set_flags(false, false, false, a & 0x01 != 0);
            }
            Instruction::Rla => {
                let a = self.regs.a();
                let carry_in = u8::from(self.regs.flag(FLAG_C));
                self.regs.set_a((a << 1) | carry_in);
                self.regs.set_flags(false, false, false, a & 0x80 != 0);
            }
            Instruction::Rra => {
                let a = self.regs.a();
                let carry_in = u8::from(self.regs.flag(FLAG_C));
                self.regs.set_a((a >> 1) | (carry_in << 7));
                self.regs.set_flags(false, false, false, a & 0x01 != 0);
            }
            Instruction::Daa => self.daa(),
            Instruction::Cpl => {
                self.regs.set_a(!self.regs.a());
                self.regs.set_flag(FLAG_N, true);
                self.regs.set_flag(FLAG_H, true);
            }
            Instruction::Scf => {
                let z = self.regs.flag(FLAG_Z);
                self.regs.set_flags(z, false, false, true);
            }
            Instruction::Ccf => {
                let z = self.regs.flag(FLAG_Z);
                let c = self.regs.flag(FLAG_C);
                self.regs.set_flags(z, false, false, !c);
            }

            Instruction::Jp(cond) => {
                let addr = self.fetch16(mmu);
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = addr;
                }
            }
            Instruction::JpHl => self.regs.pc = self.regs.hl.get(),
            Instruction::Jr(cond) => {
                let offset = self.fetch8(mmu) as i8;
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset));
                }
            }
            Instruction::Call(cond) => {
                let addr = self.fetch16(mmu);
                taken = self.condition(cond);
                if taken {
                    let ret = self.regs.pc;
                    self.push_stack(mmu, ret);
                    self.regs.pc = addr;
                }
            }
            Instruction::Ret(cond) => {
                taken = self.condition(cond);
                if taken {
                    self.regs.pc = self.pop_stack(mmu);
                }
            }
            Instruction::Reti => {
                self.regs.pc = self.pop_stack(mmu);
                self.ime = true;
            }
            Instruction::Rst(vector) => {
                let ret = self.regs.pc;
                self.push_stack(mmu, ret);
                self.regs.pc = u16::from(vector);
            }
        }
        entry.cost.cycles(taken)
    }

    fn execute_cb(&mut self, instr: CbInstruction, mmu: &mut Mmu) {
        match instr {
            CbInstruction::Shift(op, reg) => {
                let val = self.read_reg(mmu, reg);
                let res = self.shift(op, val);
                self.write_reg(mmu, reg, res);
            }
            CbInstruction::Bit(bit, reg) => {
                let val = self.read_reg(mmu, reg);
                let c = self.regs.flag(FLAG_C);
                self.regs.set_flags(val & (1 << bit) == 0, false, true, c);
            }
            CbInstruction::Res(bit, reg) => {
                let val = self.read_reg(mmu, reg);
                self.write_reg(mmu, reg, val & !(1 << bit));
            }
            CbInstruction::Set(bit, reg) => {
                let val = self.read_reg(mmu, reg);
                self.write_reg(mmu, reg, val | (1 << bit));
            }
        }
    }

    fn alu(&mut self, op: AluOp, val: u8) {
        let a = self.regs.a();
        let carry = u8::from(self.regs.flag(FLAG_C));
        match op {
            AluOp::Add | AluOp::Adc => {
                let c = if op == AluOp::Adc { carry } else { 0 };
                let sum = u16::from(a) + u16::from(val) + u16::from(c);
                let half = (a & 0x0F) + (val & 0x0F) + c > 0x0F;
                let res = sum as u8;
                self.regs.set_a(res);
                self.regs.set_flags(res == 0, false, half, sum > 0xFF);
            }
            AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
                let c = if op == AluOp::Sbc { carry } else { 0 };
                let diff = i16::from(a) - i16::from(val) - i16::from(c);
                let half = (a & 0x0F) < (val & 0x0F) + c;
                let res = diff as u8;
                if op != AluOp::Cp {
                    self.regs.set_a(res);
                }
                self.regs.set_flags(res == 0, true, half, diff < 0);
            }
            AluOp::And => {
                let res = a & val;
                self.regs.set_a(res);
                self.regs.set_flags(res == 0, false, true, false);
            }
            AluOp::Xor => {
                let res = a ^ val;
                self.regs.set_a(res);
                self.regs.set_flags(res == 0, false, false, false);
            }
            AluOp::Or => {
                let res = a | val;
                self.regs.set_a(res);
                self.regs.set_flags(res == 0, false, false, false);
            }
        }
    }

    fn inc8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_add(1);
        let c = self.regs.flag(FLAG_C);
        self.regs.set_flags(res == 0, false, val & 0x0F == 0x0F, c);
        res
    }

    fn dec8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_sub(1);
        let c = self.regs.flag(FLAG_C);
        self.regs.set_flags(res == 0, true, val & 0x0F == 0, c);
        res
    }

    fn add_hl(&mut self, val: u16) {
        let hl = self.regs.hl.get();
        let (res, carry) = hl.overflowing_add(val);
        let half = (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF;
        let z = self.regs.flag(FLAG_Z);
        self.regs.hl.set(res);
        self.regs.set_flags(z, false, half, carry);
    }

    /// SP plus a signed offset. H and C come from the unsigned low-byte add.
    fn sp_plus(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let off = u16::from(offset);
        let half = (sp & 0x000F) + (off & 0x000F) > 0x000F;
        let carry = (sp & 0x00FF) + off > 0x00FF;
        self.regs.set_flags(false, false, half, carry);
        sp.wrapping_add_signed(i16::from(offset as i8))
    }

    fn daa(&mut self) {
        let mut a = self.regs.a();
        let n = self.regs.flag(FLAG_N);
        let mut correction = 0u8;
        let mut carry = false;
        if self.regs.flag(FLAG_H) || (!n && (a & 0x0F) > 9) {
            correction |= 0x06;
        }
        if self.regs.flag(FLAG_C) || (!n && a > 0x99) {
            correction |= 0x60;
            carry = true;
        }
        a = if n {
            a.wrapping_sub(correction)
        } else {
            a.wrapping_add(correction)
        };
        self.regs.set_a(a);
        self.regs.set_flags(a == 0, n, false, carry);
    }

    fn shift(&mut self, op: ShiftOp, val: u8) -> u8 {
        let carry_in = u8::from(self.regs.flag(FLAG_C));
        let (res, carry) = match op {
            ShiftOp::Rlc => (val.rotate_left(1), val & 0x80 != 0),
            ShiftOp::Rrc => (val.rotate_right(1), val & 0x01 != 0),
            ShiftOp::Rl => ((val << 1) | carry_in, val & 0x80 != 0),
            ShiftOp::Rr => ((val >> 1) | (carry_in << 7), val & 0x01 != 0),
            ShiftOp::Sla => (val << 1, val & 0x80 != 0),
            ShiftOp::Sra => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            ShiftOp::Swap => (val.rotate_left(4), false),
            ShiftOp::Srl => (val >> 1, val & 0x01 != 0),
        };
        self.regs.set_flags(res == 0, false, false, carry);
        res
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with_a(a: u8, f: u8) -> Cpu {
        let mut cpu = Cpu::power_on();
        cpu.regs.set_a(a);
        cpu.regs.set_f(f);
        cpu
    }

    #[test]
    fn add_sets_half_and_full_carry() {
        let mut cpu = cpu_with_a(0x3A, 0);
        cpu.alu(AluOp::Add, 0xC6);
        assert_eq!(cpu.regs.a(), 0x00);
        assert_eq!(cpu.regs.f(), FLAG_Z | FLAG_H | FLAG_C);

        let mut cpu = cpu_with_a(0x0F, FLAG_C);
        cpu.alu(AluOp::Adc, 0x00);
        assert_eq!(cpu.regs.a(), 0x10);
        assert_eq!(cpu.regs.f(), FLAG_H);
    }

    #[test]
    fn sub_and_compare_borrow() {
        let mut cpu = cpu_with_a(0x3E, 0);
        cpu.alu(AluOp::Cp, 0x40);
        assert_eq!(cpu.regs.a(), 0x3E);
        assert_eq!(cpu.regs.f(), FLAG_N | FLAG_C);

        cpu.alu(AluOp::Sub, 0x0F);
        assert_eq!(cpu.regs.a(), 0x2F);
        assert_eq!(cpu.regs.f(), FLAG_N | FLAG_H);

        let mut cpu = cpu_with_a(0x00, FLAG_C);
        cpu.alu(AluOp::Sbc, 0x00);
        assert_eq!(cpu.regs.a(), 0xFF);
        assert_eq!(cpu.regs.f(), FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn inc_dec_keep_carry() {
        let mut cpu = cpu_with_a(0, FLAG_C);
        assert_eq!(cpu.inc8(0xFF), 0x00);
        assert_eq!(cpu.regs.f(), FLAG_Z | FLAG_H | FLAG_C);
        assert_eq!(cpu.dec8(0x10), 0x0F);
        assert_eq!(cpu.regs.f(), FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn sp_offset_flags_use_low_byte() {
        let mut cpu = Cpu::power_on();
        cpu.regs.sp = 0x00FF;
        assert_eq!(cpu.sp_plus(0x01), 0x0100);
        assert_eq!(cpu.regs.f(), FLAG_H | FLAG_C);
        cpu.regs.sp = 0x1000;
        assert_eq!(cpu.sp_plus(0xFF), 0x0FFF);
        assert_eq!(cpu.regs.f(), 0);
    }

    #[test]
    fn daa_adjusts_bcd_add() {
        // 0x45 + 0x38 = 0x7D, adjusted to 0x83
        let mut cpu = cpu_with_a(0x45, 0);
        cpu.alu(AluOp::Add, 0x38);
        cpu.daa();
        assert_eq!(cpu.regs.a(), 0x83);
        assert!(!cpu.regs.flag(FLAG_C));

        let mut cpu = cpu_with_a(0x99, 0);
        cpu.alu(AluOp::Add, 0x01);
        cpu.daa();
        assert_eq!(cpu.regs.a(), 0x00);
        assert_eq!(cpu.regs.f(), FLAG_Z | FLAG_C);
    }

    #[test]
    fn swap_clears_carry() {
        let mut cpu = cpu_with_a(0, FLAG_C);
        assert_eq!(cpu.shift(ShiftOp::Swap, 0xF1), 0x1F);
        assert_eq!(cpu.regs.f(), 0);
        assert_eq!(cpu.shift(ShiftOp::Sra, 0x81), 0xC0);
        assert_eq!(cpu.regs.f(), FLAG_C);
    }
}
