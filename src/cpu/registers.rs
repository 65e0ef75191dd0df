pub const FLAG_Z: u8 = 0x80;
pub const FLAG_N: u8 = 0x40;
pub const FLAG_H: u8 = 0x20;
pub const FLAG_C: u8 = 0x10;

/// Only the upper nibble of F is backed by hardware.
const FLAG_MASK: u8 = 0xF0;

/// A 16-bit register pair with byte views over one store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub const fn new(val: u16) -> Self {
        Self(val)
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn set(&mut self, val: u16) {
        self.0 = val;
    }

    #[inline]
    pub const fn hi(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn lo(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn set_hi(&mut self, val: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(val) << 8);
    }

    #[inline]
    pub fn set_lo(&mut self, val: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(val);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    /// DMG register state after the boot ROM hands over to the cartridge.
    pub fn post_boot() -> Self {
        Self {
            af: RegisterPair::new(0x01B0),
            bc: RegisterPair::new(0x0013),
            de: RegisterPair::new(0x00D8),
            hl: RegisterPair::new(0x014D),
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }

    /// Cleared state used when a boot image runs from 0x0000.
    pub fn power_on() -> Self {
        Self::default()
    }

    pub fn af(&self) -> u16 {
        self.af.get()
    }

    pub fn set_af(&mut self, val: u16) {
        self.af.set(val & 0xFFF0);
    }

    pub fn a(&self) -> u8 {
        self.af.hi()
    }

    pub fn set_a(&mut self, val: u8) {
        self.af.set_hi(val);
    }

    pub fn f(&self) -> u8 {
        self.af.lo()
    }

    pub fn set_f(&mut self, val: u8) {
        self.af.set_lo(val & FLAG_MASK);
    }

    pub fn b(&self) -> u8 {
        self.bc.hi()
    }

    pub fn set_b(&mut self, val: u8) {
        self.bc.set_hi(val);
    }

    pub fn c(&self) -> u8 {
        self.bc.lo()
    }

    pub fn set_c(&mut self, val: u8) {
        self.bc.set_lo(val);
    }

    pub fn d(&self) -> u8 {
        self.de.hi()
    }

    pub fn set_d(&mut self, val: u8) {
        self.de.set_hi(val);
    }

    pub fn e(&self) -> u8 {
        self.de.lo()
    }

    pub fn set_e(&mut self, val: u8) {
        self.de.set_lo(val);
    }

    pub fn h(&self) -> u8 {
        self.hl.hi()
    }

    pub fn set_h(&mut self, val: u8) {
        self.hl.set_hi(val);
    }

    pub fn l(&self) -> u8 {
        self.hl.lo()
    }

    pub fn set_l(&mut self, val: u8) {
        self.hl.set_lo(val);
    }

    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        self.f() & mask != 0
    }

    #[inline]
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        let f = if on { self.f() | mask } else { self.f() & !mask };
        self.set_f(f);
    }

    /// Replace all four flags at once.
    #[inline]
    pub fn set_flags(&mut self, z: bool, n: bool, h: bool, c: bool) {
        let mut f = 0;
        if z {
            f |= FLAG_Z;
        }
        if n {
            f |= FLAG_N;
        }
        if h {
            f |= FLAG_H;
        }
        if c {
            f |= FLAG_C;
        }
        self.set_f(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_views_share_storage() {
        let mut pair = RegisterPair::new(0x1234);
        assert_eq!((pair.hi(), pair.lo()), (0x12, 0x34));
        pair.set_hi(0xAB);
        assert_eq!(pair.get(), 0xAB34);
        pair.set_lo(0xCD);
        assert_eq!(pair.get(), 0xABCD);
        pair.set(0x0001);
        assert_eq!((pair.hi(), pair.lo()), (0x00, 0x01));
    }

    #[test]
    fn flag_low_nibble_stays_clear() {
        let mut regs = Registers::power_on();
        regs.set_af(0x12FF);
        assert_eq!(regs.af(), 0x12F0);
        regs.set_f(0x0F);
        assert_eq!(regs.f(), 0);
        regs.set_flags(true, false, true, false);
        assert_eq!(regs.f(), FLAG_Z | FLAG_H);
        regs.set_flag(FLAG_C, true);
        assert!(regs.flag(FLAG_C));
        assert_eq!(regs.a(), 0x12);
    }

    #[test]
    fn post_boot_matches_dmg() {
        let regs = Registers::post_boot();
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc.get(), 0x0013);
        assert_eq!(regs.de.get(), 0x00D8);
        assert_eq!(regs.hl.get(), 0x014D);
        assert_eq!((regs.sp, regs.pc), (0xFFFE, 0x0100));
    }
}
