use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems while loading ROM or boot images.
///
/// None of these are recoverable: the machine is never started with a
/// partially loaded image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM image is truncated ({len} bytes, need at least 0x150 for the header)")]
    RomTooSmall { len: usize },

    #[error("boot image must be exactly 256 bytes (got {len})")]
    BootRomSize { len: usize },
}
