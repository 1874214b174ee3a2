use etch_hal::{Ack, I2cPeripheral, UartTx};

use super::{I2cMaster, Timeout, WaitPoint};

/// Line written to the diagnostic sink whenever a slave NACKs a byte
pub const NACK_DIAGNOSTIC: &str = "*** I2C1PUT, NAK returned ***\r\n";

impl<P: I2cPeripheral, D: UartTx> I2cMaster<P, D> {
    /// Clock one byte out and return the slave's acknowledgment
    ///
    /// A NACK is reported on the diagnostic sink but is not an error here;
    /// the transaction layer decides what it means.
    pub fn put(&mut self, byte: u8) -> Result<Ack, Timeout> {
        self.peripheral_mut().load_transmit(byte);
        self.wait(WaitPoint::Transmit, |p| !p.transmit_pending())?;

        let ack = self.peripheral_mut().ack_status();
        if ack.is_nack() {
            warn!("I2C put: NAK returned for {=u8:#04x}", byte);
            // Sink errors are dropped, the NACK is what gets reported
            let _ = self.diagnostics_mut().write_str(NACK_DIAGNOSTIC);
        }
        Ok(ack)
    }

    /// Clock one byte in and answer it with `ack`
    pub fn get(&mut self, ack: Ack) -> Result<u8, Timeout> {
        self.wait(WaitPoint::BusIdle, |p| p.is_idle())?;
        self.peripheral_mut().begin_receive();
        self.wait(WaitPoint::Receive, |p| p.receive_full())?;
        let byte = self.peripheral_mut().take_received();

        self.wait(WaitPoint::BusIdle, |p| p.is_idle())?;
        self.peripheral_mut().begin_ack(ack);
        self.wait(WaitPoint::AckSend, |p| !p.ack_pending())?;
        Ok(byte)
    }
}
