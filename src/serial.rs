use std::io::{self, Write};

/// SC value that starts a transfer with the internal clock.
pub const TRANSFER_START: u8 = 0x81;

pub trait SerialSink: Send {
    /// Receive one byte written out through the serial port.
    fn emit(&mut self, byte: u8);
}

/// Prints serial traffic the way test ROMs expect a terminal to show it.
/// Printable ASCII passes through, CR/LF become a newline and anything else
/// is dropped.
#[derive(Default)]
pub struct StdoutSink;

impl SerialSink for StdoutSink {
    fn emit(&mut self, byte: u8) {
        let mut out = io::stdout().lock();
        let res = match byte {
            0x20..=0x7E => out.write_all(&[byte]),
            b'\n' | b'\r' => out.write_all(b"\n"),
            _ => return,
        };
        if res.and_then(|_| out.flush()).is_err() {
            log::warn!("serial output to stdout failed");
        }
    }
}

/// Serial output hook.
///
/// Only the debugging convention is modeled: writing 0x81 to SC sends the
/// byte in SB immediately. Every byte is kept in `out_buf` and forwarded to
/// the installed sink, if any.
#[derive(Default)]
pub struct Serial {
    pub(crate) out_buf: Vec<u8>,
    sink: Option<Box<dyn SerialSink>>,
}

impl Serial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, sink: Box<dyn SerialSink>) {
        self.sink = Some(sink);
    }

    pub fn transmit(&mut self, byte: u8) {
        log::debug!("serial out {byte:02X}");
        self.out_buf.push(byte);
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(byte);
        }
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.out_buf)
    }

    pub fn peek_output(&self) -> &[u8] {
        &self.out_buf
    }
}
