//! VL6180 time-of-flight range sensor
//!
//! 16-bit register addresses. After power-up the sensor flags itself as
//! fresh out of reset and needs the private register table from the
//! application note loaded once before ranging works.

use etch_core::i2c::{I2cError, SlaveAddress};
use etch_core::register::{RegisterAccess, RegisterAddress};

/// Factory-default address
pub const DEFAULT_ADDRESS: SlaveAddress = SlaveAddress::new_const(0x29);

/// Register map
pub mod reg {
    /// Reads 1 until the private table has been loaded
    pub const SYSTEM_FRESH_OUT_OF_RESET: u16 = 0x0016;
    pub const SYSTEM_INTERRUPT_CLEAR: u16 = 0x0015;
    pub const SYSRANGE_START: u16 = 0x0018;
    pub const RESULT_INTERRUPT_STATUS_GPIO: u16 = 0x004F;
    pub const RESULT_RANGE_VAL: u16 = 0x0062;
}

/// Range-ready code in the low three bits of the interrupt status
const RANGE_READY: u8 = 0x04;

/// Clear range, ALS and error interrupts
const CLEAR_ALL: u8 = 0x07;

/// Private registers written after reset, in order
pub const INIT_TABLE: [(u16, u8); 36] = [
    (0x0207, 0x01),
    (0x0208, 0x01),
    (0x0096, 0x00),
    (0x0097, 0xfd),
    (0x00e3, 0x00),
    (0x00e4, 0x04),
    (0x00e5, 0x02),
    (0x00e6, 0x01),
    (0x00e7, 0x03),
    (0x00f5, 0x02),
    (0x00d9, 0x05),
    (0x00db, 0xce),
    (0x00dc, 0x03),
    (0x00dd, 0xf8),
    (0x009f, 0x00),
    (0x00a3, 0x3c),
    (0x00b7, 0x00),
    (0x00bb, 0x3c),
    (0x00b2, 0x09),
    (0x00ca, 0x09),
    (0x0198, 0x01),
    (0x01b0, 0x17),
    (0x01ad, 0x00),
    (0x00ff, 0x05),
    (0x0100, 0x05),
    (0x0199, 0x05),
    (0x01a6, 0x1b),
    (0x01ac, 0x3e),
    (0x01a7, 0x1f),
    (0x0030, 0x00),
    // Public registers: GPIO1 interrupt, averaging, range check
    (0x0011, 0x10),
    (0x010a, 0x30),
    (0x003f, 0x46),
    (0x0031, 0xFF),
    (0x0040, 0x63),
    (0x002e, 0x01),
];

/// VL6180 on an I2C bus
#[derive(Debug, Clone, Copy)]
pub struct Vl6180 {
    address: SlaveAddress,
}

impl Default for Vl6180 {
    fn default() -> Self {
        Self::new()
    }
}

impl Vl6180 {
    /// Sensor at the factory-default address
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
        }
    }

    /// Sensor moved to another address
    pub const fn with_address(address: SlaveAddress) -> Self {
        Self { address }
    }

    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    fn write<B: RegisterAccess>(&self, bus: &mut B, reg: u16, value: u8) -> Result<(), I2cError> {
        bus.write_register(self.address, RegisterAddress::Word(reg), &[value])
    }

    fn read<B: RegisterAccess>(&self, bus: &mut B, reg: u16) -> Result<u8, I2cError> {
        bus.read_register(self.address, RegisterAddress::Word(reg))
    }

    /// Load the private register table if the sensor is fresh out of reset
    ///
    /// Returns `true` if the table was written, `false` if the sensor had
    /// already been set up.
    pub fn init<B: RegisterAccess>(&self, bus: &mut B) -> Result<bool, I2cError> {
        if self.read(bus, reg::SYSTEM_FRESH_OUT_OF_RESET)? != 1 {
            debug!("VL6180 already initialised");
            return Ok(false);
        }

        for (register, value) in INIT_TABLE {
            self.write(bus, register, value)?;
        }
        self.write(bus, reg::SYSTEM_FRESH_OUT_OF_RESET, 0x00)?;
        info!("VL6180 register table loaded");
        Ok(true)
    }

    /// Trigger a single-shot range measurement
    pub fn start_range<B: RegisterAccess>(&self, bus: &mut B) -> Result<(), I2cError> {
        self.write(bus, reg::SYSRANGE_START, 0x01)
    }

    /// Spin until a range result is ready
    ///
    /// The sensor is asked as often as the bus allows. Only a bus error
    /// ends the loop early.
    pub fn poll_range<B: RegisterAccess>(&self, bus: &mut B) -> Result<(), I2cError> {
        loop {
            let status = self.read(bus, reg::RESULT_INTERRUPT_STATUS_GPIO)?;
            if status & 0x07 == RANGE_READY {
                return Ok(());
            }
        }
    }

    /// Range in millimetres
    pub fn read_range<B: RegisterAccess>(&self, bus: &mut B) -> Result<u8, I2cError> {
        self.read(bus, reg::RESULT_RANGE_VAL)
    }

    pub fn clear_interrupts<B: RegisterAccess>(&self, bus: &mut B) -> Result<(), I2cError> {
        self.write(bus, reg::SYSTEM_INTERRUPT_CLEAR, CLEAR_ALL)
    }

    /// Start, wait for and read one measurement, then clear its interrupt
    pub fn measure_range<B: RegisterAccess>(&self, bus: &mut B) -> Result<u8, I2cError> {
        self.start_range(bus)?;
        self.poll_range(bus)?;
        let range = self.read_range(bus)?;
        self.clear_interrupts(bus)?;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etch_core::config::BusConfig;
    use etch_core::i2c::{I2cMaster, WaitPoint};
    use etch_core::testing::{BusEvent, RecordingTx, RegisterSlave, SimBus};

    type Bus = I2cMaster<SimBus<RegisterSlave>, RecordingTx>;

    fn bus_with(
        slave: RegisterSlave,
        adjust: impl FnOnce(SimBus<RegisterSlave>) -> SimBus<RegisterSlave>,
    ) -> Bus {
        let config = BusConfig {
            poll_limit: 64,
            ..BusConfig::default()
        };
        I2cMaster::new(adjust(SimBus::new(slave)), RecordingTx::new(), config).unwrap()
    }

    fn slave() -> RegisterSlave {
        RegisterSlave::new(DEFAULT_ADDRESS, 2)
    }

    #[test]
    fn test_init_fresh_sensor_loads_table() {
        let mut slave = slave();
        slave.set(reg::SYSTEM_FRESH_OUT_OF_RESET, 1);
        let mut bus = bus_with(slave, |b| b);

        assert_eq!(Vl6180::new().init(&mut bus), Ok(true));

        let (sim, _) = bus.release();
        let writes = sim.slave().writes();
        assert_eq!(writes.len(), INIT_TABLE.len() + 1);
        assert_eq!(&writes[..INIT_TABLE.len()], &INIT_TABLE[..]);
        assert_eq!(writes.last(), Some(&(reg::SYSTEM_FRESH_OUT_OF_RESET, 0x00)));
    }

    #[test]
    fn test_init_skips_configured_sensor() {
        let mut bus = bus_with(slave(), |b| b);
        assert_eq!(Vl6180::new().init(&mut bus), Ok(false));

        let (sim, _) = bus.release();
        assert!(sim.slave().writes().is_empty());
    }

    #[test]
    fn test_init_twice_is_identical() {
        // Fresh flag set again between runs, as after a sensor reset
        let mut slave = slave();
        slave.set(reg::SYSTEM_FRESH_OUT_OF_RESET, 1);
        let mut bus = bus_with(slave, |b| b);
        let sensor = Vl6180::new();

        sensor.init(&mut bus).unwrap();
        let first: heapless::Vec<BusEvent, 512> = bus.peripheral().trace().iter().copied().collect();
        bus.peripheral_mut().clear_trace();
        bus.peripheral_mut()
            .slave_mut()
            .set(reg::SYSTEM_FRESH_OUT_OF_RESET, 1);
        sensor.init(&mut bus).unwrap();

        assert_eq!(bus.peripheral().trace(), first.as_slice());
    }

    #[test]
    fn test_measure_range() {
        let mut slave = slave();
        slave.script(reg::RESULT_INTERRUPT_STATUS_GPIO, &[0x00, 0x40, 0x4C]);
        slave.set(reg::RESULT_RANGE_VAL, 87);
        let mut bus = bus_with(slave, |b| b);

        assert_eq!(Vl6180::new().measure_range(&mut bus), Ok(87));

        let (sim, diagnostics) = bus.release();
        assert_eq!(
            sim.slave().writes(),
            &[(reg::SYSRANGE_START, 0x01), (reg::SYSTEM_INTERRUPT_CLEAR, 0x07)]
        );
        assert_eq!(diagnostics.lines(), 0);
    }

    #[test]
    fn test_poll_range_never_ready_ends_on_timeout() {
        // Status register stays 0; only the frozen bus stops the loop
        let mut bus = bus_with(slave(), |b| b.freeze_after(500));

        let result = Vl6180::new().poll_range(&mut bus);
        assert!(matches!(result, Err(I2cError::Timeout(_))));

        let (sim, _) = bus.release();
        let reads = sim
            .trace()
            .iter()
            .filter(|e| matches!(e, BusEvent::Read { .. }))
            .count();
        // Many status reads went by before the hang
        assert!(reads > 10);
        assert_eq!(sim.trace().last(), Some(&BusEvent::Stop));
    }

    #[test]
    fn test_poll_range_bus_error_ends_loop() {
        let mut bus = bus_with(slave(), |b| b);
        bus.peripheral_mut().freeze();
        assert_eq!(
            Vl6180::new().poll_range(&mut bus),
            Err(I2cError::Timeout(WaitPoint::Start))
        );
    }
}
