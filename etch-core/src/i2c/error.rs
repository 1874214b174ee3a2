/// Hardware flag a bounded wait was polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPoint {
    Start,
    Restart,
    Stop,
    /// Byte plus slave ACK being clocked out
    Transmit,
    /// Bus returning to idle before or after a reception
    BusIdle,
    /// Receive buffer filling
    Receive,
    /// Master ACK/NACK being clocked out
    AckSend,
}

/// A wait ran out of polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout(pub WaitPoint);

/// Error from an I2C transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// No slave acknowledged the address byte
    AddressNack,
    /// Slave NACKed the data byte at `index` within the write
    DataNack { index: usize },
    /// The peripheral never finished an action
    Timeout(WaitPoint),
    /// Read into an empty buffer
    EmptyRead,
    /// Address needs more than seven bits
    InvalidAddress,
    /// Register address plus data exceed the transfer buffer
    TooLong,
}

impl From<Timeout> for I2cError {
    fn from(timeout: Timeout) -> Self {
        I2cError::Timeout(timeout.0)
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

        match self {
            I2cError::AddressNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            I2cError::DataNack { .. } => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            _ => ErrorKind::Other,
        }
    }
}
