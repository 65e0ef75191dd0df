#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// Bus access gating policy.
///
/// Real hardware locks the CPU out of OAM while DMA runs and out of VRAM/OAM
/// while the PPU is reading them. Most software never relies on it, so the
/// policy is selectable.
pub enum AccessGating {
    /// Every address is always reachable.
    Open,
    /// OAM is blocked while a DMA transfer is active.
    #[default]
    DmaOnly,
    /// DMA gating plus PPU-mode gating (OAM in modes 2/3, VRAM in mode 3).
    Strict,
}

impl AccessGating {
    #[inline]
    /// Returns whether an active DMA transfer blocks OAM.
    pub const fn dma_blocks_oam(self) -> bool {
        matches!(self, AccessGating::DmaOnly | AccessGating::Strict)
    }

    #[inline]
    /// Returns whether PPU modes 2 and 3 block OAM and mode 3 blocks VRAM.
    pub const fn ppu_blocks_video(self) -> bool {
        matches!(self, AccessGating::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_only_gates_dma() {
        let gating = AccessGating::default();
        assert!(gating.dma_blocks_oam());
        assert!(!gating.ppu_blocks_video());
        assert!(!AccessGating::Open.dma_blocks_oam());
        assert!(AccessGating::Strict.ppu_blocks_video());
    }
}
