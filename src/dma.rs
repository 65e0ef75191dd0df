use crate::mmu::Memory;

/// First byte of the sprite attribute table.
pub const OAM_START: u16 = 0xFE00;
/// Bytes moved by one transfer (40 sprites x 4 bytes).
pub const OAM_SIZE: u8 = 0xA0;

/// OAM DMA engine (gbdev.io/pandocs/OAM_DMA_Transfer.html).
///
/// Armed by a write to 0xFF46 and advanced one byte per elapsed cycle by the
/// scheduler.
#[derive(Debug, Default)]
pub struct Dma {
    active: bool,
    source: u8,
    index: u8,
}

impl Dma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a transfer from `page * 0x100`. Restarts any transfer in flight.
    pub fn start(&mut self, page: u8) {
        self.source = page;
        self.index = 0;
        self.active = true;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Bytes already copied by the current transfer.
    pub fn progress(&self) -> u8 {
        self.index
    }

    /// Copy the next byte into OAM.
    pub fn step(&mut self, mem: &mut Memory) {
        if !self.active {
            return;
        }
        let src = u16::from_be_bytes([self.source, self.index]);
        let val = mem.get(src);
        mem.set(OAM_START + u16::from(self.index), val);
        self.index += 1;
        if self.index == OAM_SIZE {
            self.active = false;
        }
    }
}
