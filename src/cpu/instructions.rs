//! Opcode decoding for the primary and 0xCB-prefixed tables.
//!
//! Both tables are built at compile time from exhaustive matches, so every
//! one of the 512 slots has a defined instruction and cost.

/// 8-bit operand in the standard B,C,D,E,H,L,(HL),A encoding order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl Reg8 {
    const fn from_index(i: u8) -> Self {
        match i & 0x07 {
            0 => Reg8::B,
            1 => Reg8::C,
            2 => Reg8::D,
            3 => Reg8::E,
            4 => Reg8::H,
            5 => Reg8::L,
            6 => Reg8::HlInd,
            _ => Reg8::A,
        }
    }

    const fn is_memory(self) -> bool {
        matches!(self, Reg8::HlInd)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    BC,
    DE,
    HL,
    SP,
}

impl Reg16 {
    const fn from_index(i: u8) -> Self {
        match i & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }
}

/// PUSH/POP operand; AF takes the place of SP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackReg {
    BC,
    DE,
    HL,
    AF,
}

impl StackReg {
    const fn from_index(i: u8) -> Self {
        match i & 0x03 {
            0 => StackReg::BC,
            1 => StackReg::DE,
            2 => StackReg::HL,
            _ => StackReg::AF,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
}

impl Cond {
    const fn from_index(i: u8) -> Self {
        match i & 0x03 {
            0 => Cond::NZ,
            1 => Cond::Z,
            2 => Cond::NC,
            _ => Cond::C,
        }
    }
}

/// Address operand of `LD (rr),A` / `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    BC,
    DE,
    HlInc,
    HlDec,
}

impl Indirect {
    const fn from_index(i: u8) -> Self {
        match i & 0x03 {
            0 => Indirect::BC,
            1 => Indirect::DE,
            2 => Indirect::HlInc,
            _ => Indirect::HlDec,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    const fn from_index(i: u8) -> Self {
        match i & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    const fn from_index(i: u8) -> Self {
        match i & 0x07 {
            0 => ShiftOp::Rlc,
            1 => ShiftOp::Rrc,
            2 => ShiftOp::Rl,
            3 => ShiftOp::Rr,
            4 => ShiftOp::Sla,
            5 => ShiftOp::Sra,
            6 => ShiftOp::Swap,
            _ => ShiftOp::Srl,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    /// 0xCB; the real instruction and its cost come from [`EXTENDED`].
    Prefix,
    /// Unused opcode. Locks the CPU.
    Illegal,
    Ld(Reg8, Reg8),
    LdImm(Reg8),
    LdImm16(Reg16),
    Alu(AluOp, Reg8),
    AluImm(AluOp),
    StoreA(Indirect),
    LoadA(Indirect),
    StoreAAbs,
    LoadAAbs,
    StoreHigh,
    LoadHigh,
    StoreHighC,
    LoadHighC,
    StoreSp,
    Inc(Reg8),
    Dec(Reg8),
    Inc16(Reg16),
    Dec16(Reg16),
    AddHl(Reg16),
    AddSp,
    LdHlSp,
    LdSpHl,
    Push(StackReg),
    Pop(StackReg),
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jp(Option<Cond>),
    JpHl,
    Jr(Option<Cond>),
    Call(Option<Cond>),
    Ret(Option<Cond>),
    Reti,
    Rst(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CbInstruction {
    Shift(ShiftOp, Reg8),
    Bit(u8, Reg8),
    Res(u8, Reg8),
    Set(u8, Reg8),
}

/// T-cycle cost of one opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cost {
    Fixed(u16),
    Branch { taken: u16, not_taken: u16 },
}

impl Cost {
    #[inline]
    pub const fn cycles(self, taken: bool) -> u16 {
        match self {
            Cost::Fixed(c) => c,
            Cost::Branch { taken: t, not_taken: n } => {
                if taken {
                    t
                } else {
                    n
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode<T> {
    pub instr: T,
    pub cost: Cost,
}

pub static PRIMARY: [Opcode<Instruction>; 256] = build_primary();
pub static EXTENDED: [Opcode<CbInstruction>; 256] = build_extended();

const fn build_primary() -> [Opcode<Instruction>; 256] {
    let mut table = [Opcode {
        instr: Instruction::Nop,
        cost: Cost::Fixed(4),
    }; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = decode(i as u8);
        i += 1;
    }
    table
}

const fn build_extended() -> [Opcode<CbInstruction>; 256] {
    let mut table = [Opcode {
        instr: CbInstruction::Bit(0, Reg8::B),
        cost: Cost::Fixed(8),
    }; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = decode_cb(i as u8);
        i += 1;
    }
    table
}

const fn fixed(instr: Instruction, cycles: u16) -> Opcode<Instruction> {
    Opcode {
        instr,
        cost: Cost::Fixed(cycles),
    }
}

const fn branch(instr: Instruction, taken: u16, not_taken: u16) -> Opcode<Instruction> {
    Opcode {
        instr,
        cost: Cost::Branch { taken, not_taken },
    }
}

/// Register operand cost, plus `extra` when (HL) is involved.
const fn reg_cost(base: u16, reg: Reg8, extra: u16) -> u16 {
    if reg.is_memory() { base + extra } else { base }
}

const fn decode(op: u8) -> Opcode<Instruction> {
    use Instruction::*;

    let src = Reg8::from_index(op);
    let dst = Reg8::from_index(op >> 3);
    let pair = Reg16::from_index(op >> 4);
    let cond = Some(Cond::from_index(op >> 3));

    match op {
        0x00 => fixed(Nop, 4),
        0x10 => fixed(Stop, 4),
        0x76 => fixed(Halt, 4),
        0xF3 => fixed(Di, 4),
        0xFB => fixed(Ei, 4),
        0xCB => fixed(Prefix, 0),
        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
            fixed(Illegal, 4)
        }

        0x01 | 0x11 | 0x21 | 0x31 => fixed(LdImm16(pair), 12),
        0x02 | 0x12 | 0x22 | 0x32 => fixed(StoreA(Indirect::from_index(op >> 4)), 8),
        0x0A | 0x1A | 0x2A | 0x3A => fixed(LoadA(Indirect::from_index(op >> 4)), 8),
        0x03 | 0x13 | 0x23 | 0x33 => fixed(Inc16(pair), 8),
        0x0B | 0x1B | 0x2B | 0x3B => fixed(Dec16(pair), 8),
        0x09 | 0x19 | 0x29 | 0x39 => fixed(AddHl(pair), 8),
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            fixed(Inc(dst), reg_cost(4, dst, 8))
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            fixed(Dec(dst), reg_cost(4, dst, 8))
        }
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
            fixed(LdImm(dst), reg_cost(8, dst, 4))
        }
        0x07 => fixed(Rlca, 4),
        0x0F => fixed(Rrca, 4),
        0x17 => fixed(Rla, 4),
        0x1F => fixed(Rra, 4),
        0x27 => fixed(Daa, 4),
        0x2F => fixed(Cpl, 4),
        0x37 => fixed(Scf, 4),
        0x3F => fixed(Ccf, 4),
        0x08 => fixed(StoreSp, 20),
        0x18 => fixed(Jr(None), 12),
        0x20 | 0x28 | 0x30 | 0x38 => branch(Jr(cond), 12, 8),

        0x40..=0x7F => {
            let cost = if src.is_memory() || dst.is_memory() { 8 } else { 4 };
            fixed(Ld(dst, src), cost)
        }
        0x80..=0xBF => fixed(Alu(AluOp::from_index(op >> 3), src), reg_cost(4, src, 4)),

        0xC0 | 0xC8 | 0xD0 | 0xD8 => branch(Ret(cond), 20, 8),
        0xC9 => fixed(Ret(None), 16),
        0xD9 => fixed(Reti, 16),
        0xC2 | 0xCA | 0xD2 | 0xDA => branch(Jp(cond), 16, 12),
        0xC3 => fixed(Jp(None), 16),
        0xE9 => fixed(JpHl, 4),
        0xC4 | 0xCC | 0xD4 | 0xDC => branch(Call(cond), 24, 12),
        0xCD => fixed(Call(None), 24),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => fixed(Pop(StackReg::from_index(op >> 4)), 12),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => fixed(Push(StackReg::from_index(op >> 4)), 16),
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
            fixed(AluImm(AluOp::from_index(op >> 3)), 8)
        }
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => fixed(Rst(op & 0x38), 16),
        0xE0 => fixed(StoreHigh, 12),
        0xF0 => fixed(LoadHigh, 12),
        0xE2 => fixed(StoreHighC, 8),
        0xF2 => fixed(LoadHighC, 8),
        0xEA => fixed(StoreAAbs, 16),
        0xFA => fixed(LoadAAbs, 16),
        0xE8 => fixed(AddSp, 16),
        0xF8 => fixed(LdHlSp, 12),
        0xF9 => fixed(LdSpHl, 8),
    }
}

const fn decode_cb(op: u8) -> Opcode<CbInstruction> {
    let reg = Reg8::from_index(op);
    let bit = (op >> 3) & 0x07;
    let group = op >> 6;
    let instr = match group {
        0 => CbInstruction::Shift(ShiftOp::from_index(op >> 3), reg),
        1 => CbInstruction::Bit(bit, reg),
        2 => CbInstruction::Res(bit, reg),
        _ => CbInstruction::Set(bit, reg),
    };
    // BIT only reads (HL); the others read and write it back.
    let cycles = if !reg.is_memory() {
        8
    } else if group == 1 {
        12
    } else {
        16
    };
    Opcode {
        instr,
        cost: Cost::Fixed(cycles),
    }
}
