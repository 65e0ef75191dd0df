use log::{debug, trace};

use crate::interrupt::Interrupt;
use crate::mmu::{BGP, LCDC, LY, LYC, Memory, OBP0, OBP1, SCX, SCY, STAT, WX, WY};

// Screen resolution used by the Game Boy PPU
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

// Timing constants per LCD mode in T-cycles
const MODE0_CYCLES: u16 = 204; // HBlank
const MODE1_CYCLES: u16 = 456; // One line during VBlank
const MODE2_CYCLES: u16 = 80; // OAM scan
const MODE3_CYCLES: u16 = 172; // Pixel transfer

// Number of lines spent in VBlank
const VBLANK_LINES: u8 = 10;
const LAST_LINE: u8 = SCREEN_HEIGHT as u8 + VBLANK_LINES - 1;

// Sprite limits
const MAX_SPRITES_PER_LINE: usize = 10;
const TOTAL_SPRITES: u16 = 40;

// Window X position is clipped if greater than this value
const WINDOW_X_MAX: u8 = 166;

// VRAM layout
const BG_MAP_0_BASE: u16 = 0x9800;
const BG_MAP_1_BASE: u16 = 0x9C00;
const TILE_DATA_UNSIGNED_BASE: u16 = 0x8000;
const TILE_DATA_SIGNED_BASE: u16 = 0x9000;
const OAM_BASE: u16 = 0xFE00;

/// DMG shades as 0xRRGGBBAA, lightest first.
pub const DMG_PALETTE: [u32; 4] = [0xFFFF_FFFF, 0xAAAA_AAFF, 0x5555_55FF, 0x0000_00FF];

/// LCD mode as encoded in STAT bits 0-1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

#[derive(Copy, Clone, Default)]
struct Sprite {
    x: i16,
    y: i16,
    tile: u8,
    flags: u8,
    oam_index: u16,
}

/// Scanline-based PPU.
///
/// LCDC/STAT/scroll/palette registers live in bus memory and are read when
/// they are needed, so mid-frame writes take effect on the next line.
pub struct Ppu {
    mode: Mode,
    mode_clock: u16,
    ly: u8,
    lcd_on: bool,

    scy: u8,
    scx: u8,
    wy: u8,
    wx: u8,
    bg_palette: [u32; 4],
    obj_palettes: [[u32; 4]; 2],

    /// Internal window line counter
    win_line_counter: u8,

    framebuffer: Box<[u32; SCREEN_WIDTH * SCREEN_HEIGHT]>,
    /// BG/window color index 0 at each column of the current line
    line_color_zero: [bool; SCREEN_WIDTH],
    /// Latched sprites for the current scanline
    line_sprites: [Sprite; MAX_SPRITES_PER_LINE],
    sprite_count: usize,
    /// Sprite height (8 or 16) at the time `line_sprites` was selected
    sprite_height: i16,
    /// Indicates a completed frame is available in `framebuffer`
    frame_ready: bool,
    frame_counter: u64,
    trace: bool,
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            mode: Mode::OamScan,
            mode_clock: 0,
            ly: 0,
            lcd_on: false,
            scy: 0,
            scx: 0,
            wy: 0,
            wx: 0,
            bg_palette: DMG_PALETTE,
            obj_palettes: [DMG_PALETTE; 2],
            win_line_counter: 0,
            framebuffer: Box::new([DMG_PALETTE[0]; SCREEN_WIDTH * SCREEN_HEIGHT]),
            line_color_zero: [true; SCREEN_WIDTH],
            line_sprites: [Sprite::default(); MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            sprite_height: 8,
            frame_ready: false,
            frame_counter: 0,
            trace: false,
        }
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Returns true if a full frame has been rendered and is ready to display.
    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Returns the current framebuffer as 0xRRGGBBAA pixels. Call
    /// `frame_ready()` to check if a frame is complete. After presenting,
    /// call `clear_frame_flag()`.
    pub fn framebuffer(&self) -> &[u32; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.framebuffer
    }

    /// Clears the frame ready flag after a frame has been consumed.
    pub fn clear_frame_flag(&mut self) {
        self.frame_ready = false;
    }

    /// Returns the number of frames that have been completed since power on.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn lcd_on(&self) -> bool {
        self.lcd_on
    }

    /// Returns the current value of the internal window line counter.
    pub fn window_line_counter(&self) -> u8 {
        self.win_line_counter
    }

    /// Advance the PPU by `cycles` T-cycles.
    pub fn step(&mut self, cycles: u16, mem: &mut Memory) {
        if mem.get(LCDC) & 0x80 == 0 {
            if self.lcd_on {
                self.switch_off(mem);
            }
            return;
        }
        if !self.lcd_on {
            self.switch_on(mem);
        }

        self.mode_clock += cycles;
        loop {
            match self.mode {
                Mode::OamScan => {
                    if self.mode_clock < MODE2_CYCLES {
                        break;
                    }
                    self.mode_clock -= MODE2_CYCLES;
                    self.oam_scan(mem);
                    self.set_mode(Mode::Transfer, mem);
                }
                Mode::Transfer => {
                    if self.mode_clock < MODE3_CYCLES {
                        break;
                    }
                    self.mode_clock -= MODE3_CYCLES;
                    self.render_scanline(mem);
                    self.set_mode(Mode::HBlank, mem);
                    self.stat_source(mem, 0x08);
                }
                Mode::HBlank => {
                    if self.mode_clock < MODE0_CYCLES {
                        break;
                    }
                    self.mode_clock -= MODE0_CYCLES;
                    self.advance_line(mem);
                    if self.ly as usize == SCREEN_HEIGHT {
                        self.enter_vblank(mem);
                    } else {
                        self.set_mode(Mode::OamScan, mem);
                        self.stat_source(mem, 0x20);
                    }
                }
                Mode::VBlank => {
                    if self.mode_clock < MODE1_CYCLES {
                        break;
                    }
                    self.mode_clock -= MODE1_CYCLES;
                    self.advance_line(mem);
                    if self.ly == 0 {
                        self.win_line_counter = 0;
                        self.set_mode(Mode::OamScan, mem);
                        self.stat_source(mem, 0x20);
                    }
                }
            }
        }
    }

    fn switch_on(&mut self, mem: &mut Memory) {
        self.lcd_on = true;
        self.mode_clock = 0;
        self.ly = 0;
        self.win_line_counter = 0;
        mem.set(LY, 0);
        self.set_mode(Mode::OamScan, mem);
        if self.trace {
            debug!("LCD on");
        }
    }

    /// LCD off: LY and mode reset and the screen goes blank.
    fn switch_off(&mut self, mem: &mut Memory) {
        self.lcd_on = false;
        self.mode_clock = 0;
        self.ly = 0;
        self.win_line_counter = 0;
        mem.set(LY, 0);
        self.set_mode(Mode::HBlank, mem);
        self.framebuffer.fill(DMG_PALETTE[0]);
        if self.trace {
            debug!("LCD off");
        }
    }

    fn enter_vblank(&mut self, mem: &mut Memory) {
        self.set_mode(Mode::VBlank, mem);
        mem.request_interrupt(Interrupt::VBlank);
        self.stat_source(mem, 0x10);
        self.frame_ready = true;
        self.frame_counter = self.frame_counter.wrapping_add(1);
        if self.trace {
            trace!("frame {} ready", self.frame_counter);
            if self.frame_counter % 60 == 0 {
                debug!(
                    "frame {}: LCDC={:02X} BGP={:02X} SCX={:02X} SCY={:02X}",
                    self.frame_counter,
                    mem.get(LCDC),
                    mem.get(BGP),
                    self.scx,
                    self.scy
                );
            }
        }
    }

    /// Move to the next scanline (wrapping after 153) and run the LYC check.
    fn advance_line(&mut self, mem: &mut Memory) {
        self.ly = if self.ly >= LAST_LINE { 0 } else { self.ly + 1 };
        mem.set(LY, self.ly);
        self.sync_stat(mem);
        if self.ly == mem.get(LYC) {
            self.stat_source(mem, 0x40);
        }
    }

    /// Request the STAT interrupt if the given STAT enable bit is set.
    fn stat_source(&self, mem: &mut Memory, bit: u8) {
        if mem.get(STAT) & bit != 0 {
            mem.request_interrupt(Interrupt::Stat);
        }
    }

    fn set_mode(&mut self, mode: Mode, mem: &mut Memory) {
        self.mode = mode;
        self.sync_stat(mem);
    }

    /// Mirror mode and LY=LYC into STAT bits 0-2.
    fn sync_stat(&self, mem: &mut Memory) {
        let stat = mem.get(STAT);
        let coincidence = if self.ly == mem.get(LYC) { 0x04 } else { 0 };
        mem.set(STAT, 0x80 | (stat & 0x78) | coincidence | self.mode as u8);
    }

    /// Collect up to 10 sprites visible on the current scanline.
    fn oam_scan(&mut self, mem: &Memory) {
        let sprite_height: i16 = if mem.get(LCDC) & 0x04 != 0 { 16 } else { 8 };
        let ly = self.ly as i16;
        self.sprite_height = sprite_height;
        self.sprite_count = 0;
        for i in 0..TOTAL_SPRITES {
            if self.sprite_count >= MAX_SPRITES_PER_LINE {
                break;
            }
            let base = OAM_BASE + i * 4;
            let y = mem.get(base) as i16 - 16;
            if ly >= y && ly < y + sprite_height {
                self.line_sprites[self.sprite_count] = Sprite {
                    x: mem.get(base + 1) as i16 - 8,
                    y,
                    tile: mem.get(base + 2),
                    flags: mem.get(base + 3),
                    oam_index: i,
                };
                self.sprite_count += 1;
            }
        }
        // DMG-style priority: sort by X position then OAM index
        self.line_sprites[..self.sprite_count].sort_by_key(|s| (s.x, s.oam_index));
    }

    fn latch_registers(&mut self, mem: &Memory) {
        self.scy = mem.get(SCY);
        self.scx = mem.get(SCX);
        self.wy = mem.get(WY);
        self.wx = mem.get(WX);
        self.bg_palette = Self::decode_palette(mem.get(BGP));
        self.obj_palettes = [
            Self::decode_palette(mem.get(OBP0)),
            Self::decode_palette(mem.get(OBP1)),
        ];
    }

    fn decode_palette(reg: u8) -> [u32; 4] {
        std::array::from_fn(|id| DMG_PALETTE[((reg >> (id * 2)) & 0x03) as usize])
    }

    /// 2-bit color index of the BG/window pixel at (`x`, `y`) within a 256x256
    /// tile map.
    fn tile_pixel(mem: &Memory, lcdc: u8, map_base: u16, x: u8, y: u8) -> u8 {
        let map_addr = map_base + (y as u16 / 8) * 32 + x as u16 / 8;
        let tile_index = mem.get(map_addr);
        let tile_addr = if lcdc & 0x10 != 0 {
            TILE_DATA_UNSIGNED_BASE + tile_index as u16 * 16
        } else {
            TILE_DATA_SIGNED_BASE.wrapping_add_signed(tile_index as i8 as i16 * 16)
        };
        let row = tile_addr + (y as u16 % 8) * 2;
        let lo = mem.get(row);
        let hi = mem.get(row + 1);
        let bit = 7 - (x % 8);
        ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1)
    }

    fn render_scanline(&mut self, mem: &Memory) {
        if self.ly as usize >= SCREEN_HEIGHT {
            return;
        }
        self.latch_registers(mem);
        let lcdc = mem.get(LCDC);
        let row = self.ly as usize * SCREEN_WIDTH;

        // With the background disabled the line shows color 0 and sprites
        // treat every column as color 0.
        let fill = self.bg_palette[0];
        self.framebuffer[row..row + SCREEN_WIDTH].fill(fill);
        self.line_color_zero.fill(true);

        if lcdc & 0x01 != 0 {
            let map_base = if lcdc & 0x08 != 0 {
                BG_MAP_1_BASE
            } else {
                BG_MAP_0_BASE
            };
            let y = self.ly.wrapping_add(self.scy);
            for x in 0..SCREEN_WIDTH {
                let px = (x as u8).wrapping_add(self.scx);
                let color_id = Self::tile_pixel(mem, lcdc, map_base, px, y);
                self.framebuffer[row + x] = self.bg_palette[color_id as usize];
                self.line_color_zero[x] = color_id == 0;
            }

            if lcdc & 0x20 != 0 && self.ly >= self.wy && self.wx <= WINDOW_X_MAX {
                let map_base = if lcdc & 0x40 != 0 {
                    BG_MAP_1_BASE
                } else {
                    BG_MAP_0_BASE
                };
                let origin = self.wx as i16 - 7;
                let y = self.win_line_counter;
                for x in origin.max(0) as usize..SCREEN_WIDTH {
                    let wx = (x as i16 - origin) as u8;
                    let color_id = Self::tile_pixel(mem, lcdc, map_base, wx, y);
                    self.framebuffer[row + x] = self.bg_palette[color_id as usize];
                    self.line_color_zero[x] = color_id == 0;
                }
                self.win_line_counter = self.win_line_counter.wrapping_add(1);
            }
        }

        if lcdc & 0x02 != 0 {
            self.render_sprites(mem, row);
        }
    }

    fn render_sprites(&mut self, mem: &Memory, row: usize) {
        // Height latched at OAM scan, not the current LCDC.2.
        let sprite_height = self.sprite_height;
        let mut drawn = [false; SCREEN_WIDTH];
        for s in &self.line_sprites[..self.sprite_count] {
            let mut tile = s.tile;
            if sprite_height == 16 {
                tile &= 0xFE;
            }
            let mut line_idx = self.ly as i16 - s.y;
            if s.flags & 0x40 != 0 {
                line_idx = sprite_height - 1 - line_idx;
            }
            let row_in_tile = (line_idx & (sprite_height - 1)) as u16;
            let addr = TILE_DATA_UNSIGNED_BASE + tile as u16 * 16 + row_in_tile * 2;
            let lo = mem.get(addr);
            let hi = mem.get(addr + 1);
            let palette = &self.obj_palettes[usize::from(s.flags & 0x10 != 0)];
            for px in 0..8u8 {
                let bit = if s.flags & 0x20 != 0 { px } else { 7 - px };
                let color_id = ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1);
                if color_id == 0 {
                    continue;
                }
                let sx = s.x + px as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&sx) || drawn[sx as usize] {
                    continue;
                }
                let sx = sx as usize;
                // A higher-priority sprite claims the pixel even when hidden
                // behind the background.
                drawn[sx] = true;
                if s.flags & 0x80 != 0 && !self.line_color_zero[sx] {
                    continue;
                }
                self.framebuffer[row + sx] = palette[color_id as usize];
            }
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
