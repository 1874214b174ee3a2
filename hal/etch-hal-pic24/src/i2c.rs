//! I2C1 master for PIC24
//!
//! Drives the PIC24 I2C1 module through its SFRs. Every bus step is started
//! by setting an enable bit in I2C1CON (SEN, RSEN, PEN, RCEN, ACKEN) and is
//! finished when the hardware clears that bit again; transmit completion is
//! signalled by TRSTAT in I2C1STAT.

use etch_hal::{Ack, I2cPeripheral};

#[cfg(feature = "mmio")]
use crate::regs::Mmio;
use crate::regs::RegisterFile;

/// I2C1 register addresses
pub mod reg {
    /// Receive buffer
    pub const I2C1RCV: u16 = 0x0200;
    /// Transmit register
    pub const I2C1TRN: u16 = 0x0202;
    /// Baud rate generator reload
    pub const I2C1BRG: u16 = 0x0204;
    /// Control register
    pub const I2C1CON: u16 = 0x0206;
    /// Status register
    pub const I2C1STAT: u16 = 0x0208;
}

/// I2C1CON bits
pub mod con {
    /// Start condition enable
    pub const SEN: u16 = 1 << 0;
    /// Repeated start condition enable
    pub const RSEN: u16 = 1 << 1;
    /// Stop condition enable
    pub const PEN: u16 = 1 << 2;
    /// Receive enable
    pub const RCEN: u16 = 1 << 3;
    /// Acknowledge sequence enable
    pub const ACKEN: u16 = 1 << 4;
    /// Acknowledge data bit (1 = NACK)
    pub const ACKDT: u16 = 1 << 5;
    /// Slew rate control disabled
    pub const DISSLW: u16 = 1 << 9;
    /// Module enable
    pub const I2CEN: u16 = 1 << 15;
    /// Low five bits: any master sequence in progress
    pub const SEQUENCE_MASK: u16 = 0x1F;
}

/// I2C1STAT bits
pub mod stat {
    /// Transmit buffer full
    pub const TBF: u16 = 1 << 0;
    /// Receive buffer full
    pub const RBF: u16 = 1 << 1;
    /// Master transmit in progress (8 bits + ACK)
    pub const TRSTAT: u16 = 1 << 14;
    /// Acknowledge received from slave (1 = NACK)
    pub const ACKSTAT: u16 = 1 << 15;
}

/// I2C1 module in master mode
pub struct I2c1<R> {
    regs: R,
}

#[cfg(feature = "mmio")]
impl I2c1<Mmio> {
    /// Take the on-chip I2C1 module
    ///
    /// # Safety
    ///
    /// See [`Mmio::steal`]. Only one `I2c1` may exist.
    pub unsafe fn take() -> Self {
        Self::new(Mmio::steal())
    }
}

impl<R: RegisterFile> I2c1<R> {
    /// Wrap a register file holding the I2C1 SFRs
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register file
    pub fn release(self) -> R {
        self.regs
    }

    fn con_set(&mut self, mask: u16) -> bool {
        self.regs.read(reg::I2C1CON) & mask != 0
    }

    fn stat_set(&mut self, mask: u16) -> bool {
        self.regs.read(reg::I2C1STAT) & mask != 0
    }
}

impl<R: RegisterFile> I2cPeripheral for I2c1<R> {
    fn enable(&mut self, divisor: u16) {
        self.regs.write(reg::I2C1BRG, divisor);

        // Master mode, 7-bit addressing, slew rate control off, module off
        self.regs.write(reg::I2C1CON, con::DISSLW);

        self.regs.write(reg::I2C1RCV, 0);
        self.regs.write(reg::I2C1TRN, 0);

        self.regs.set_bits(reg::I2C1CON, con::I2CEN);
    }

    fn begin_start(&mut self) {
        self.regs.set_bits(reg::I2C1CON, con::SEN);
    }

    fn start_pending(&mut self) -> bool {
        self.con_set(con::SEN)
    }

    fn begin_restart(&mut self) {
        self.regs.set_bits(reg::I2C1CON, con::RSEN);
    }

    fn restart_pending(&mut self) -> bool {
        self.con_set(con::RSEN)
    }

    fn begin_stop(&mut self) {
        self.regs.set_bits(reg::I2C1CON, con::PEN);
    }

    fn stop_pending(&mut self) -> bool {
        self.con_set(con::PEN)
    }

    fn load_transmit(&mut self, byte: u8) {
        self.regs.write(reg::I2C1TRN, byte as u16);
    }

    fn transmit_pending(&mut self) -> bool {
        self.stat_set(stat::TRSTAT)
    }

    fn ack_status(&mut self) -> Ack {
        if self.stat_set(stat::ACKSTAT) {
            Ack::Nack
        } else {
            Ack::Ack
        }
    }

    fn is_idle(&mut self) -> bool {
        !self.con_set(con::SEQUENCE_MASK)
    }

    fn begin_receive(&mut self) {
        self.regs.set_bits(reg::I2C1CON, con::RCEN);
    }

    fn receive_full(&mut self) -> bool {
        self.stat_set(stat::RBF)
    }

    fn take_received(&mut self) -> u8 {
        // Reading I2C1RCV clears RBF
        self.regs.read(reg::I2C1RCV) as u8
    }

    fn begin_ack(&mut self, ack: Ack) {
        if ack.is_nack() {
            self.regs.set_bits(reg::I2C1CON, con::ACKDT);
        } else {
            self.regs.clear_bits(reg::I2C1CON, con::ACKDT);
        }
        self.regs.set_bits(reg::I2C1CON, con::ACKEN);
    }

    fn ack_pending(&mut self) -> bool {
        self.con_set(con::ACKEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etch_core::config::BusConfig;
    use etch_core::i2c::{I2cError, I2cMaster, SlaveAddress};
    use etch_core::testing::RecordingTx;
    use heapless::{Deque, Vec};

    /// Bus-visible effect of a register write
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Start,
        Restart,
        Stop,
        Tx(u8),
        Rx(u8),
        /// Acknowledge sequence with ACKDT (true = NACK)
        AckBit(bool),
    }

    /// Behavioural model of the I2C1 SFRs
    ///
    /// Sequence bits in I2C1CON and TRSTAT read back set exactly once, then
    /// clear, so every wait in the engine sees one busy poll.
    struct Model {
        rcv: u16,
        trn: u16,
        brg: u16,
        con: u16,
        stat: u16,
        in_flight: u16,
        rx_script: Deque<u8, 8>,
        nack_bytes: Vec<u8, 4>,
        events: Vec<Event, 32>,
    }

    impl Model {
        fn new() -> Self {
            Self {
                rcv: 0xFFFF,
                trn: 0xFFFF,
                brg: 0,
                con: 0,
                stat: 0,
                in_flight: 0,
                rx_script: Deque::new(),
                nack_bytes: Vec::new(),
                events: Vec::new(),
            }
        }

        fn write_con(&mut self, value: u16) {
            let rising = value & !self.con;
            self.con = value;

            if rising & con::SEN != 0 {
                self.events.push(Event::Start).unwrap();
            }
            if rising & con::RSEN != 0 {
                self.events.push(Event::Restart).unwrap();
            }
            if rising & con::PEN != 0 {
                self.events.push(Event::Stop).unwrap();
            }
            if rising & con::RCEN != 0 {
                let byte = self.rx_script.pop_front().unwrap_or(0xFF);
                self.rcv = byte as u16;
                self.stat |= stat::RBF;
                self.events.push(Event::Rx(byte)).unwrap();
            }
            if rising & con::ACKEN != 0 {
                self.events
                    .push(Event::AckBit(value & con::ACKDT != 0))
                    .unwrap();
            }

            self.in_flight |= rising & con::SEQUENCE_MASK;
        }
    }

    impl RegisterFile for Model {
        fn read(&mut self, address: u16) -> u16 {
            match address {
                reg::I2C1RCV => {
                    self.stat &= !stat::RBF;
                    self.rcv
                }
                reg::I2C1TRN => self.trn,
                reg::I2C1BRG => self.brg,
                reg::I2C1CON => {
                    let value = self.con;
                    self.con &= !self.in_flight;
                    self.in_flight = 0;
                    value
                }
                reg::I2C1STAT => {
                    let value = self.stat;
                    self.stat &= !stat::TRSTAT;
                    value
                }
                _ => 0,
            }
        }

        fn write(&mut self, address: u16, value: u16) {
            match address {
                reg::I2C1RCV => self.rcv = value,
                reg::I2C1TRN => {
                    self.trn = value;
                    if self.con & con::I2CEN == 0 {
                        return;
                    }
                    let byte = value as u8;
                    self.events.push(Event::Tx(byte)).unwrap();
                    self.stat |= stat::TRSTAT;
                    if self.nack_bytes.contains(&byte) {
                        self.stat |= stat::ACKSTAT;
                    } else {
                        self.stat &= !stat::ACKSTAT;
                    }
                }
                reg::I2C1BRG => self.brg = value,
                reg::I2C1CON => self.write_con(value),
                _ => {}
            }
        }
    }

    fn master(model: Model) -> I2cMaster<I2c1<Model>, RecordingTx> {
        I2cMaster::new(I2c1::new(model), RecordingTx::new(), BusConfig::default()).unwrap()
    }

    fn address(raw: u8) -> SlaveAddress {
        SlaveAddress::new(raw).unwrap()
    }

    #[test]
    fn test_enable_programs_registers() {
        let mut i2c = I2c1::new(Model::new());
        i2c.enable(38);

        let model = i2c.release();
        assert_eq!(model.brg, 38);
        assert_eq!(model.con, con::I2CEN | con::DISSLW);
        assert_eq!(model.rcv, 0);
        assert_eq!(model.trn, 0);
        assert!(model.events.is_empty());
    }

    #[test]
    fn test_default_config_divisor_reaches_brg() {
        let master = master(Model::new());
        let (i2c, _) = master.release();
        assert_eq!(i2c.release().brg, 38);
    }

    #[test]
    fn test_start_flag_clears_after_hardware() {
        let mut i2c = I2c1::new(Model::new());
        i2c.enable(38);

        i2c.begin_start();
        assert!(i2c.start_pending());
        assert!(!i2c.start_pending());
        assert!(i2c.is_idle());
    }

    #[test]
    fn test_write_one_sequence() {
        let mut master = master(Model::new());
        master.write_one(address(0x29), 0x07).unwrap();

        let (i2c, _) = master.release();
        assert_eq!(
            i2c.release().events.as_slice(),
            &[Event::Start, Event::Tx(0x52), Event::Tx(0x07), Event::Stop]
        );
    }

    #[test]
    fn test_read_many_ack_polarity() {
        let mut model = Model::new();
        model.rx_script.push_back(0x12).unwrap();
        model.rx_script.push_back(0x34).unwrap();
        let mut master = master(model);

        let mut buf = [0u8; 2];
        master.read_many(address(0x20), &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);

        let (i2c, _) = master.release();
        assert_eq!(
            i2c.release().events.as_slice(),
            &[
                Event::Start,
                Event::Tx(0x41),
                Event::Rx(0x12),
                Event::AckBit(false),
                Event::Rx(0x34),
                Event::AckBit(true),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_ackstat_nack_is_reported() {
        let mut model = Model::new();
        model.nack_bytes.push(0x52).unwrap();
        let mut master = master(model);

        assert_eq!(
            master.write_one(address(0x29), 0x07),
            Err(I2cError::AddressNack)
        );

        let (i2c, diagnostics) = master.release();
        assert_eq!(diagnostics.lines(), 1);
        assert_eq!(
            i2c.release().events.as_slice(),
            &[Event::Start, Event::Tx(0x52), Event::Tx(0x07), Event::Stop]
        );
    }

    #[test]
    fn test_write_read_uses_repeated_start() {
        let mut model = Model::new();
        model.rx_script.push_back(0xB4).unwrap();
        let mut master = master(model);

        let mut buf = [0u8; 1];
        master
            .write_read(address(0x29), &[0x00, 0x16], &mut buf)
            .unwrap();
        assert_eq!(buf, [0xB4]);

        let (i2c, _) = master.release();
        assert_eq!(
            i2c.release().events.as_slice(),
            &[
                Event::Start,
                Event::Tx(0x52),
                Event::Tx(0x00),
                Event::Tx(0x16),
                Event::Restart,
                Event::Tx(0x53),
                Event::Rx(0xB4),
                Event::AckBit(true),
                Event::Stop,
            ]
        );
    }
}
