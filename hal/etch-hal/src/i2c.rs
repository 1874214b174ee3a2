//! I2C master peripheral abstraction
//!
//! The engine in `etch-core` drives the bus one hardware step at a time:
//! it kicks off an action with a `begin_*` call and then polls the matching
//! `*_pending` flag until the peripheral reports the action finished. This
//! mirrors how register-level I2C modules (PIC24 I2Cx, AVR TWI) work and
//! leaves the bounding of every wait to the caller.

/// Acknowledgment bit clocked on the ninth SCL pulse of every byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// SDA pulled low: keep going
    Ack,
    /// SDA left high: stop sending
    Nack,
}

impl Ack {
    /// Decode a sampled SDA level (low means acknowledge)
    pub fn from_sda(high: bool) -> Self {
        if high {
            Ack::Nack
        } else {
            Ack::Ack
        }
    }

    /// SDA level that encodes this acknowledgment
    pub fn sda_level(self) -> bool {
        matches!(self, Ack::Nack)
    }

    pub fn is_ack(self) -> bool {
        matches!(self, Ack::Ack)
    }

    pub fn is_nack(self) -> bool {
        matches!(self, Ack::Nack)
    }
}

/// I2C master peripheral
///
/// Every bus action is split into a `begin_*` call that starts it and a
/// `*_pending` poll that stays `true` until the hardware has finished.
/// Implementations must never block; a peripheral that can't make progress
/// simply keeps reporting the action as pending.
pub trait I2cPeripheral {
    /// Program the baud-rate divisor and enable the module
    fn enable(&mut self, divisor: u16);

    /// Begin a start condition (SDA falls while SCL is high)
    fn begin_start(&mut self);

    /// Start condition still in progress
    fn start_pending(&mut self) -> bool;

    /// Begin a repeated start condition
    fn begin_restart(&mut self);

    /// Repeated start condition still in progress
    fn restart_pending(&mut self) -> bool;

    /// Begin a stop condition (SDA rises while SCL is high)
    fn begin_stop(&mut self);

    /// Stop condition still in progress
    fn stop_pending(&mut self) -> bool;

    /// Load a byte into the transmit register, which starts clocking it out
    fn load_transmit(&mut self, byte: u8);

    /// Byte plus slave acknowledgment still being clocked
    fn transmit_pending(&mut self) -> bool;

    /// Acknowledgment sampled from the slave after the last transmitted byte
    fn ack_status(&mut self) -> Ack;

    /// No start, stop, receive or acknowledge sequence in progress
    fn is_idle(&mut self) -> bool;

    /// Enable reception of one byte
    fn begin_receive(&mut self);

    /// A full byte is waiting in the receive register
    fn receive_full(&mut self) -> bool;

    /// Read the received byte out of the receive register
    fn take_received(&mut self) -> u8;

    /// Drive `ack` back to the slave
    fn begin_ack(&mut self, ack: Ack);

    /// Acknowledgment bit still being clocked out
    fn ack_pending(&mut self) -> bool;
}
