//! Serial port adapter
//!
//! `etch_hal::UartTx` is implemented here for anything that speaks
//! `embedded_io::Write`, which covers the embassy-rp blocking UART.

use etch_hal::UartTx;

/// Blocking serial transmitter
pub struct SerialTx<W> {
    inner: W,
}

impl<W: embedded_io::Write> SerialTx<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: embedded_io::Write> UartTx for SerialTx<W> {
    type Error = W::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}
