//! `embedded-hal` 1.0 blocking I2C on top of the engine
//!
//! Lets off-the-shelf sensor drivers run over any `I2cMaster`. Operations
//! always abort on the first NACK, whatever the configured policy.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use etch_hal::{I2cPeripheral, UartTx};

use super::transaction::Nacks;
use super::{Direction, I2cError, I2cMaster, SlaveAddress};
use crate::config::NackPolicy;

impl<P, D> ErrorType for I2cMaster<P, D> {
    type Error = I2cError;
}

impl<P: I2cPeripheral, D: UartTx> I2c<SevenBitAddress> for I2cMaster<P, D> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), I2cError> {
        let address = SlaveAddress::try_from(address)?;
        if operations.is_empty() {
            return Ok(());
        }
        if operations
            .iter()
            .any(|op| matches!(op, Operation::Read(buf) if buf.is_empty()))
        {
            return Err(I2cError::EmptyRead);
        }

        self.bracket(|master| {
            let mut nacks = Nacks::new(NackPolicy::Abort);
            let mut current: Option<Direction> = None;
            let mut written = 0;

            for index in 0..operations.len() {
                let read_follows = matches!(operations.get(index + 1), Some(Operation::Read(_)));
                match &mut operations[index] {
                    Operation::Write(bytes) => {
                        if current != Some(Direction::Write) {
                            if current.is_some() {
                                master.restart()?;
                            }
                            master.send_address(address, Direction::Write, &mut nacks)?;
                            current = Some(Direction::Write);
                        }
                        master.send_bytes(*bytes, written, &mut nacks)?;
                        written += bytes.len();
                    }
                    Operation::Read(buf) => {
                        if current != Some(Direction::Read) {
                            if current.is_some() {
                                master.restart()?;
                            }
                            master.send_address(address, Direction::Read, &mut nacks)?;
                            current = Some(Direction::Read);
                        }
                        // Adjacent reads form one run; only its final byte is NACKed
                        master.receive_bytes(&mut **buf, !read_follows)?;
                    }
                }
            }
            nacks.finish()
        })
    }
}
