/// Interrupt flag register (IF).
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register (IE).
pub const IE_ADDR: u16 = 0xFFFF;

/// Only the low five bits of IF/IE name interrupt sources.
pub const INTERRUPT_MASK: u8 = 0x1F;

/// Interrupt sources in priority order (gbdev.io/pandocs/Interrupts.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    Stat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::Stat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Bit position in IF/IE.
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Fixed dispatch address.
    #[inline]
    pub const fn vector(self) -> u16 {
        0x40 + 8 * self as u16
    }

    /// Highest-priority source set in `mask`, if any.
    pub fn highest(mask: u8) -> Option<Interrupt> {
        Self::ALL.into_iter().find(|kind| mask & kind.bit() != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_follow_bit_order() {
        let vectors: Vec<u16> = Interrupt::ALL.iter().map(|i| i.vector()).collect();
        assert_eq!(vectors, [0x40, 0x48, 0x50, 0x58, 0x60]);
        assert_eq!(Interrupt::Joypad.bit(), 0x10);
    }

    #[test]
    fn lowest_bit_wins() {
        assert_eq!(Interrupt::highest(0x1F), Some(Interrupt::VBlank));
        assert_eq!(Interrupt::highest(0x14), Some(Interrupt::Timer));
        assert_eq!(Interrupt::highest(0x10), Some(Interrupt::Joypad));
        assert_eq!(Interrupt::highest(0xE0), None);
    }
}
