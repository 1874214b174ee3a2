//! UART serial transmit abstraction
//!
//! The terminal output and the I2C diagnostic line both go out over the
//! same serial link, so the sink is a trait and [`SharedTx`] lets several
//! writers take turns on one port.

use core::cell::RefCell;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a string slice
    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        self.write_blocking(text.as_bytes())
    }
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write_blocking(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}

/// Handle onto a transmitter owned by a `RefCell`
///
/// Each write borrows the port for the duration of that write only. There
/// is a single thread of control, so the borrow can't be contended unless a
/// writer re-enters from inside another write.
pub struct SharedTx<'a, T> {
    port: &'a RefCell<T>,
}

impl<'a, T> SharedTx<'a, T> {
    pub fn new(port: &'a RefCell<T>) -> Self {
        Self { port }
    }
}

impl<T> Clone for SharedTx<'_, T> {
    fn clone(&self) -> Self {
        Self { port: self.port }
    }
}

impl<T: UartTx> UartTx for SharedTx<'_, T> {
    type Error = T::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.port.borrow_mut().write_blocking(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.borrow_mut().flush()
    }
}
