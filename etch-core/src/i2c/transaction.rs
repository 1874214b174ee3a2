use etch_hal::{Ack, I2cPeripheral, UartTx};

use super::{Direction, I2cError, I2cMaster, SlaveAddress};
use crate::config::NackPolicy;

/// Tracks write-side NACKs over one transaction
pub(super) struct Nacks {
    policy: NackPolicy,
    first: Option<I2cError>,
}

impl Nacks {
    pub(super) fn new(policy: NackPolicy) -> Self {
        Self {
            policy,
            first: None,
        }
    }

    /// Note a NACK as `error`; under `Abort` this ends the transaction
    fn record(&mut self, ack: Ack, error: I2cError) -> Result<(), I2cError> {
        if ack.is_ack() {
            return Ok(());
        }
        self.first.get_or_insert(error);
        match self.policy {
            NackPolicy::Continue => Ok(()),
            NackPolicy::Abort => Err(error),
        }
    }

    /// First NACK seen, if any
    pub(super) fn finish(self) -> Result<(), I2cError> {
        match self.first {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<P: I2cPeripheral, D: UartTx> I2cMaster<P, D> {
    /// Run `body` between a start and a stop
    ///
    /// The stop is issued exactly once whatever `body` returns, including
    /// after a timeout. An error from `body` wins over an error from the
    /// stop.
    pub(super) fn bracket<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, I2cError>,
    ) -> Result<T, I2cError> {
        let result = match self.start() {
            Ok(()) => body(self),
            Err(timeout) => Err(timeout.into()),
        };
        let stopped = self.stop();
        let value = result?;
        stopped?;
        Ok(value)
    }

    pub(super) fn send_address(
        &mut self,
        address: SlaveAddress,
        direction: Direction,
        nacks: &mut Nacks,
    ) -> Result<(), I2cError> {
        let ack = self.put(address.byte(direction))?;
        nacks.record(ack, I2cError::AddressNack)
    }

    /// Put `bytes`; `first_index` is the position of `bytes[0]` within the
    /// whole write, used for `DataNack`
    pub(super) fn send_bytes(
        &mut self,
        bytes: &[u8],
        first_index: usize,
        nacks: &mut Nacks,
    ) -> Result<(), I2cError> {
        for (offset, &byte) in bytes.iter().enumerate() {
            let ack = self.put(byte)?;
            nacks.record(
                ack,
                I2cError::DataNack {
                    index: first_index + offset,
                },
            )?;
        }
        Ok(())
    }

    /// Get into `buf`, ACKing every byte except the last when `nack_last`
    pub(super) fn receive_bytes(&mut self, buf: &mut [u8], nack_last: bool) -> Result<(), I2cError> {
        let last = buf.len().saturating_sub(1);
        for (index, slot) in buf.iter_mut().enumerate() {
            let ack = if nack_last && index == last {
                Ack::Nack
            } else {
                Ack::Ack
            };
            *slot = self.get(ack)?;
        }
        Ok(())
    }

    /// Write a single byte
    pub fn write_one(&mut self, address: SlaveAddress, byte: u8) -> Result<(), I2cError> {
        self.write_many(address, &[byte])
    }

    /// Write `bytes` in order; an empty slice sends only the address
    pub fn write_many(&mut self, address: SlaveAddress, bytes: &[u8]) -> Result<(), I2cError> {
        let policy = self.config().nack_policy;
        self.bracket(|master| {
            let mut nacks = Nacks::new(policy);
            master.send_address(address, Direction::Write, &mut nacks)?;
            master.send_bytes(bytes, 0, &mut nacks)?;
            nacks.finish()
        })
    }

    /// Read a single byte, NACKing it
    pub fn read_one(&mut self, address: SlaveAddress) -> Result<u8, I2cError> {
        let mut buf = [0];
        self.read_many(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Fill `buf`, ACKing every byte but the last
    pub fn read_many(&mut self, address: SlaveAddress, buf: &mut [u8]) -> Result<(), I2cError> {
        if buf.is_empty() {
            return Err(I2cError::EmptyRead);
        }
        let policy = self.config().nack_policy;
        self.bracket(|master| {
            let mut nacks = Nacks::new(policy);
            master.send_address(address, Direction::Read, &mut nacks)?;
            master.receive_bytes(buf, true)?;
            nacks.finish()
        })
    }

    /// Write `bytes`, then read into `buf` after a repeated start
    pub fn write_read(
        &mut self,
        address: SlaveAddress,
        bytes: &[u8],
        buf: &mut [u8],
    ) -> Result<(), I2cError> {
        if buf.is_empty() {
            return Err(I2cError::EmptyRead);
        }
        let policy = self.config().nack_policy;
        self.bracket(|master| {
            let mut nacks = Nacks::new(policy);
            master.send_address(address, Direction::Write, &mut nacks)?;
            master.send_bytes(bytes, 0, &mut nacks)?;
            master.restart()?;
            master.send_address(address, Direction::Read, &mut nacks)?;
            master.receive_bytes(buf, true)?;
            nacks.finish()
        })
    }
}
