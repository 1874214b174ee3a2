//! Bit-banged I2C master on two open-drain GPIOs
//!
//! Each `begin_*` call clocks the whole sequence out synchronously, so the
//! pending flags are normally clear by the time they are polled. If a pin
//! operation fails the driver latches a fault and reports every action as
//! pending from then on, which surfaces as a bus timeout in the engine.
//!
//! Clock stretching is not supported: SCL is driven, never sampled.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::i2c::{Ack, I2cPeripheral};

/// SCL half period before [`I2cPeripheral::enable`] is called (100 kHz)
const DEFAULT_HALF_PERIOD_NS: u32 = 5_000;

/// Bit-banged I2C master
///
/// `SDA` must be an open-drain pin that can be read back while released.
pub struct BitBang<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    /// Reference clock the divisor was computed against
    core_clock_hz: u32,
    half_period_ns: u32,
    ack: Ack,
    received: u8,
    receive_full: bool,
    fault: bool,
}

impl<SCL, SDA, D> BitBang<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    /// Create a new bit-banged master
    ///
    /// # Arguments
    /// - `scl`: Clock line, open-drain output
    /// - `sda`: Data line, open-drain input/output
    /// - `delay`: Delay provider for bit timing
    /// - `core_clock_hz`: Clock the bus divisor is derived from
    pub fn new(scl: SCL, sda: SDA, delay: D, core_clock_hz: u32) -> Self {
        Self {
            scl,
            sda,
            delay,
            core_clock_hz: core_clock_hz.max(1),
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
            ack: Ack::Nack,
            received: 0,
            receive_full: false,
            fault: false,
        }
    }

    /// Current SCL half period in nanoseconds
    pub fn half_period_ns(&self) -> u32 {
        self.half_period_ns
    }

    /// A pin operation has failed since the last [`I2cPeripheral::enable`]
    pub fn is_faulted(&self) -> bool {
        self.fault
    }

    /// Release the pins and delay provider
    pub fn release(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn set_scl(&mut self, high: bool) {
        if self.fault {
            return;
        }
        let result = if high {
            self.scl.set_high()
        } else {
            self.scl.set_low()
        };
        if result.is_err() {
            self.fault = true;
        }
    }

    fn set_sda(&mut self, high: bool) {
        if self.fault {
            return;
        }
        let result = if high {
            self.sda.set_high()
        } else {
            self.sda.set_low()
        };
        if result.is_err() {
            self.fault = true;
        }
    }

    fn sample_sda(&mut self) -> bool {
        if self.fault {
            return true;
        }
        match self.sda.is_high() {
            Ok(level) => level,
            Err(_) => {
                self.fault = true;
                true
            }
        }
    }

    fn half_period(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    /// One SCL pulse with SDA already set up
    fn pulse(&mut self) {
        self.half_period();
        self.set_scl(true);
        self.half_period();
        self.set_scl(false);
    }
}

impl<SCL, SDA, D> I2cPeripheral for BitBang<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    fn enable(&mut self, divisor: u16) {
        // Fscl = Fcy / (BRG + 1 + Fcy / 10 MHz)
        let core = self.core_clock_hz as u64;
        let cycles = divisor as u64 + 1 + core / 10_000_000;
        let half = cycles * 1_000_000_000 / (2 * core);
        self.half_period_ns = half.clamp(1, u32::MAX as u64) as u32;

        self.fault = false;
        self.receive_full = false;
        self.set_sda(true);
        self.set_scl(true);
    }

    fn begin_start(&mut self) {
        self.set_sda(true);
        self.set_scl(true);
        self.half_period();
        self.set_sda(false);
        self.half_period();
        self.set_scl(false);
    }

    fn start_pending(&mut self) -> bool {
        self.fault
    }

    fn begin_restart(&mut self) {
        self.set_sda(true);
        self.half_period();
        self.set_scl(true);
        self.half_period();
        self.set_sda(false);
        self.half_period();
        self.set_scl(false);
    }

    fn restart_pending(&mut self) -> bool {
        self.fault
    }

    fn begin_stop(&mut self) {
        self.set_sda(false);
        self.half_period();
        self.set_scl(true);
        self.half_period();
        self.set_sda(true);
        self.half_period();
    }

    fn stop_pending(&mut self) -> bool {
        self.fault
    }

    fn load_transmit(&mut self, byte: u8) {
        for bit in (0..8).rev() {
            self.set_sda((byte >> bit) & 1 == 1);
            self.pulse();
        }

        // Release SDA and clock in the slave's acknowledgment
        self.set_sda(true);
        self.half_period();
        self.set_scl(true);
        self.half_period();
        let level = self.sample_sda();
        self.ack = Ack::from_sda(level);
        self.set_scl(false);
    }

    fn transmit_pending(&mut self) -> bool {
        self.fault
    }

    fn ack_status(&mut self) -> Ack {
        if self.fault {
            Ack::Nack
        } else {
            self.ack
        }
    }

    fn is_idle(&mut self) -> bool {
        !self.fault
    }

    fn begin_receive(&mut self) {
        self.set_sda(true);
        let mut byte = 0u8;
        for _ in 0..8 {
            self.half_period();
            self.set_scl(true);
            self.half_period();
            byte = (byte << 1) | self.sample_sda() as u8;
            self.set_scl(false);
        }
        self.received = byte;
        self.receive_full = true;
    }

    fn receive_full(&mut self) -> bool {
        self.receive_full && !self.fault
    }

    fn take_received(&mut self) -> u8 {
        self.receive_full = false;
        self.received
    }

    fn begin_ack(&mut self, ack: Ack) {
        self.set_sda(ack.sda_level());
        self.pulse();
        self.set_sda(true);
    }

    fn ack_pending(&mut self) -> bool {
        self.fault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};
    use heapless::{Deque, Vec};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Condition {
        Start,
        Stop,
    }

    /// Two-wire bus with a scripted slave on SDA
    struct Wire {
        scl: bool,
        sda_out: bool,
        /// Levels the slave drives when the master releases SDA
        slave: Deque<bool, 32>,
        /// Master's SDA level at every SCL rising edge
        clocked: Vec<bool, 64>,
        conditions: Vec<Condition, 8>,
    }

    impl Wire {
        fn new() -> Self {
            Self {
                scl: true,
                sda_out: true,
                slave: Deque::new(),
                clocked: Vec::new(),
                conditions: Vec::new(),
            }
        }

        fn script_byte(&mut self, byte: u8) {
            for bit in (0..8).rev() {
                self.slave.push_back((byte >> bit) & 1 == 1).unwrap();
            }
        }

        fn set_scl(&mut self, level: bool) {
            if level && !self.scl {
                self.clocked.push(self.sda_out).unwrap();
            }
            self.scl = level;
        }

        fn set_sda(&mut self, level: bool) {
            if self.scl && level != self.sda_out {
                let condition = if level {
                    Condition::Stop
                } else {
                    Condition::Start
                };
                self.conditions.push(condition).unwrap();
            }
            self.sda_out = level;
        }

        fn sample(&mut self) -> bool {
            if !self.sda_out {
                return false;
            }
            self.slave.pop_front().unwrap_or(true)
        }
    }

    struct Scl<'a>(&'a RefCell<Wire>);
    struct Sda<'a>(&'a RefCell<Wire>);

    impl ErrorType for Scl<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Scl<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_scl(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_scl(true);
            Ok(())
        }
    }

    impl ErrorType for Sda<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Sda<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_sda(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().set_sda(true);
            Ok(())
        }
    }

    impl InputPin for Sda<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.borrow_mut().sample())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.borrow_mut().sample())
        }
    }

    #[derive(Debug)]
    struct Stuck;

    impl Error for Stuck {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct StuckPin;

    impl ErrorType for StuckPin {
        type Error = Stuck;
    }

    impl OutputPin for StuckPin {
        fn set_low(&mut self) -> Result<(), Stuck> {
            Err(Stuck)
        }

        fn set_high(&mut self) -> Result<(), Stuck> {
            Err(Stuck)
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn bus(wire: &RefCell<Wire>) -> BitBang<Scl<'_>, Sda<'_>, NoDelay> {
        let mut bus = BitBang::new(Scl(wire), Sda(wire), NoDelay, 16_000_000);
        bus.enable(38);
        bus
    }

    #[test]
    fn test_divisor_to_half_period() {
        let wire = RefCell::new(Wire::new());
        let bus = bus(&wire);
        // (38 + 1 + 1) cycles at 16 MHz = 2.5 us period
        assert_eq!(bus.half_period_ns(), 1_250);
    }

    #[test]
    fn test_start_and_stop_conditions() {
        let wire = RefCell::new(Wire::new());
        let mut bus = bus(&wire);

        bus.begin_start();
        assert!(!bus.start_pending());
        bus.begin_stop();
        assert!(!bus.stop_pending());

        assert_eq!(
            wire.borrow().conditions.as_slice(),
            &[Condition::Start, Condition::Stop]
        );
    }

    #[test]
    fn test_transmit_msb_first_with_ack() {
        let wire = RefCell::new(Wire::new());
        wire.borrow_mut().slave.push_back(false).unwrap();
        let mut bus = bus(&wire);

        bus.begin_start();
        bus.load_transmit(0xA5);
        assert!(!bus.transmit_pending());
        assert_eq!(bus.ack_status(), Ack::Ack);

        let wire = wire.borrow();
        let bits = &wire.clocked[..9];
        assert_eq!(
            bits,
            &[true, false, true, false, false, true, false, true, true]
        );
    }

    #[test]
    fn test_transmit_without_slave_is_nack() {
        let wire = RefCell::new(Wire::new());
        let mut bus = bus(&wire);

        bus.begin_start();
        bus.load_transmit(0x52);
        assert_eq!(bus.ack_status(), Ack::Nack);
    }

    #[test]
    fn test_receive_then_nack() {
        let wire = RefCell::new(Wire::new());
        wire.borrow_mut().script_byte(0x3C);
        let mut bus = bus(&wire);

        bus.begin_receive();
        assert!(bus.receive_full());
        assert_eq!(bus.take_received(), 0x3C);
        assert!(!bus.receive_full());

        let before = wire.borrow().clocked.len();
        bus.begin_ack(Ack::Nack);
        assert!(!bus.ack_pending());
        // NACK leaves SDA released on the ninth clock
        assert_eq!(wire.borrow().clocked[before], true);

        bus.begin_ack(Ack::Ack);
        assert_eq!(wire.borrow().clocked[before + 1], false);
    }

    #[test]
    fn test_pin_fault_keeps_actions_pending() {
        let wire = RefCell::new(Wire::new());
        let mut bus = BitBang::new(StuckPin, Sda(&wire), NoDelay, 16_000_000);
        bus.enable(38);

        assert!(bus.is_faulted());
        bus.begin_start();
        assert!(bus.start_pending());
        assert!(!bus.is_idle());
        assert_eq!(bus.ack_status(), Ack::Nack);
    }
}
