//! UART2 transmitter for PIC24
//!
//! The Explorer16 routes UART2 to its RS-232 connector, which is where the
//! terminal emulator listens.

use etch_hal::UartTx;

#[cfg(feature = "mmio")]
use crate::regs::Mmio;
use crate::regs::RegisterFile;

/// UART2 register addresses
pub mod reg {
    /// Mode register
    pub const U2MODE: u16 = 0x0230;
    /// Status and control register
    pub const U2STA: u16 = 0x0232;
    /// Transmit register
    pub const U2TXREG: u16 = 0x0234;
    /// Baud rate generator
    pub const U2BRG: u16 = 0x0238;
}

/// U2MODE bits
pub mod mode {
    /// UART enable
    pub const UARTEN: u16 = 1 << 15;
}

/// U2STA bits
pub mod sta {
    /// Transmit shift register empty
    pub const TRMT: u16 = 1 << 8;
    /// Transmit buffer full
    pub const UTXBF: u16 = 1 << 9;
    /// Transmit enable
    pub const UTXEN: u16 = 1 << 10;
}

/// Default number of status polls before a write gives up
pub const DEFAULT_SPIN_LIMIT: u32 = 100_000;

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Transmitter never drained
    Timeout,
    /// Requested baud rate can't be generated from FCY
    InvalidBaudrate,
}

/// UART2 transmitter, 8N1, standard-speed baud generator
pub struct Uart2Tx<R> {
    regs: R,
    spin_limit: u32,
}

#[cfg(feature = "mmio")]
impl Uart2Tx<Mmio> {
    /// Take the on-chip UART2 transmitter
    ///
    /// # Safety
    ///
    /// See [`Mmio::steal`]. Only one `Uart2Tx` may exist.
    pub unsafe fn take() -> Self {
        Self::new(Mmio::steal())
    }
}

impl<R: RegisterFile> Uart2Tx<R> {
    /// Wrap a register file holding the UART2 SFRs
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            spin_limit: DEFAULT_SPIN_LIMIT,
        }
    }

    /// Bound every wait on the transmitter to `spin_limit` status polls
    pub fn with_spin_limit(mut self, spin_limit: u32) -> Self {
        self.spin_limit = spin_limit.max(1);
        self
    }

    /// Program the baud rate and enable the transmitter
    ///
    /// BRG = FCY / (16 * baud) - 1
    pub fn configure(&mut self, fcy: u32, baudrate: u32) -> Result<(), UartError> {
        let brg = fcy
            .checked_div(baudrate.checked_mul(16).ok_or(UartError::InvalidBaudrate)?)
            .and_then(|ratio| ratio.checked_sub(1))
            .ok_or(UartError::InvalidBaudrate)?;
        let brg = u16::try_from(brg).map_err(|_| UartError::InvalidBaudrate)?;

        self.regs.write(reg::U2BRG, brg);
        self.regs.write(reg::U2MODE, mode::UARTEN);
        self.regs.set_bits(reg::U2STA, sta::UTXEN);
        Ok(())
    }

    /// Release the register file
    pub fn release(self) -> R {
        self.regs
    }

    fn wait_status(&mut self, mask: u16, set: bool) -> Result<(), UartError> {
        for _ in 0..self.spin_limit {
            if (self.regs.read(reg::U2STA) & mask != 0) == set {
                return Ok(());
            }
        }
        Err(UartError::Timeout)
    }
}

impl<R: RegisterFile> UartTx for Uart2Tx<R> {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError> {
        for &byte in data {
            self.wait_status(sta::UTXBF, false)?;
            self.regs.write(reg::U2TXREG, byte as u16);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), UartError> {
        self.wait_status(sta::TRMT, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    struct Model {
        mode: u16,
        sta: u16,
        brg: u16,
        sent: Vec<u8, 32>,
        /// Transmit buffer never drains
        stuck: bool,
    }

    impl Model {
        fn new() -> Self {
            Self {
                mode: 0,
                sta: sta::TRMT,
                brg: 0,
                sent: Vec::new(),
                stuck: false,
            }
        }
    }

    impl RegisterFile for Model {
        fn read(&mut self, address: u16) -> u16 {
            match address {
                reg::U2MODE => self.mode,
                reg::U2STA => {
                    let value = self.sta;
                    if !self.stuck {
                        self.sta = (self.sta & !sta::UTXBF) | sta::TRMT;
                    }
                    value
                }
                reg::U2BRG => self.brg,
                _ => 0,
            }
        }

        fn write(&mut self, address: u16, value: u16) {
            match address {
                reg::U2MODE => self.mode = value,
                reg::U2STA => self.sta = value,
                reg::U2BRG => self.brg = value,
                reg::U2TXREG => {
                    self.sent.push(value as u8).unwrap();
                    self.sta = (self.sta | sta::UTXBF) & !sta::TRMT;
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_configure_baud_generator() {
        let mut uart = Uart2Tx::new(Model::new());
        uart.configure(crate::FCY, 9_600).unwrap();

        let model = uart.release();
        // 16 MHz / (16 * 9600) - 1 = 103
        assert_eq!(model.brg, 103);
        assert_eq!(model.mode, mode::UARTEN);
        assert_ne!(model.sta & sta::UTXEN, 0);
    }

    #[test]
    fn test_configure_rejects_zero_baud() {
        let mut uart = Uart2Tx::new(Model::new());
        assert_eq!(uart.configure(crate::FCY, 0), Err(UartError::InvalidBaudrate));
    }

    #[test]
    fn test_write_waits_for_buffer() {
        let mut uart = Uart2Tx::new(Model::new());
        uart.write_str("\x1b[H").unwrap();
        uart.flush().unwrap();

        assert_eq!(uart.release().sent.as_slice(), b"\x1b[H");
    }

    #[test]
    fn test_stuck_transmitter_times_out() {
        let mut model = Model::new();
        model.stuck = true;
        let mut uart = Uart2Tx::new(model).with_spin_limit(8);

        uart.write_blocking(b"a").unwrap();
        assert_eq!(uart.write_blocking(b"b"), Err(UartError::Timeout));
        assert_eq!(uart.flush(), Err(UartError::Timeout));
    }
}
