use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::error::LoadError;

/// End of the cartridge header; anything shorter is a truncated image.
pub const HEADER_END: usize = 0x150;
/// Size of the window a cartridge without a bank controller occupies.
pub const ROM_WINDOW: usize = 0x8000;
/// Largest image that fits the flat address space.
pub const MAX_IMAGE: usize = 0x1_0000;
/// DMG boot image size.
pub const BOOT_ROM_SIZE: usize = 0x100;

/// A cartridge image mapped flat from 0x0000. Bank controllers are not
/// emulated; the header is only inspected for diagnostics.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub rom: Vec<u8>,
    pub title: String,
    pub cart_type: u8,
}

impl Cartridge {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = read_image(path)?;
        let cart = Self::from_bytes(data)?;
        info!(
            "Loaded ROM {}: \"{}\" ({} bytes, type {:02X})",
            path.display(),
            cart.title,
            cart.rom.len(),
            cart.cart_type
        );
        Ok(cart)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LoadError> {
        if data.len() < HEADER_END {
            return Err(LoadError::RomTooSmall { len: data.len() });
        }
        let header = Header::parse(&data);
        let title = header.title();
        let cart_type = header.cart_type();

        if header.has_bank_controller() {
            warn!("cartridge type {cart_type:02X} uses a bank controller; mapping it flat");
        }
        if data.len() > ROM_WINDOW {
            warn!(
                "ROM is {} bytes; only the first {:#X} are reachable without banking",
                data.len(),
                ROM_WINDOW
            );
        }
        Ok(Self {
            rom: data,
            title,
            cart_type,
        })
    }

    /// Bytes copied into the address space, capped at 64 KiB.
    pub fn image(&self) -> &[u8] {
        &self.rom[..self.rom.len().min(MAX_IMAGE)]
    }
}

/// The 256-byte image shadowing 0x0000-0x00FF until 0xFF50 is written.
#[derive(Debug, Clone)]
pub struct BootRom {
    data: Box<[u8; BOOT_ROM_SIZE]>,
}

impl BootRom {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let boot = Self::from_bytes(read_image(path)?)?;
        info!("Loaded boot ROM {}", path.display());
        Ok(boot)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LoadError> {
        let len = data.len();
        let data: Box<[u8; BOOT_ROM_SIZE]> = data
            .into_boxed_slice()
            .try_into()
            .map_err(|_| LoadError::BootRomSize { len })?;
        Ok(Self { data })
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize & (BOOT_ROM_SIZE - 1)]
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::Io {
        path: PathBuf::from(path),
        source,
    })
}

struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn title(&self) -> String {
        let end = 0x0143.min(self.data.len());
        let mut slice = &self.data[0x0134.min(self.data.len())..end];
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    fn cart_type(&self) -> u8 {
        self.data.get(0x0147).copied().unwrap_or(0)
    }

    /// ROM-only (0x00) and ROM+RAM (0x08/0x09) carts need no banking.
    fn has_bank_controller(&self) -> bool {
        !matches!(self.cart_type(), 0x00 | 0x08 | 0x09)
    }
}
