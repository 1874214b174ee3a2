use etch_hal::{I2cPeripheral, UartTx};

use super::{Timeout, WaitPoint};
use crate::config::{BusConfig, ConfigError};

/// Bus context: owns the peripheral and the diagnostic sink
///
/// Created once at startup. All bus access goes through `&mut self`, so
/// there is never more than one transaction in flight.
pub struct I2cMaster<P, D> {
    peripheral: P,
    diagnostics: D,
    config: BusConfig,
    divisor: u16,
}

impl<P: I2cPeripheral, D: UartTx> I2cMaster<P, D> {
    /// Compute the clock divisor from `config` and enable the peripheral
    pub fn new(mut peripheral: P, diagnostics: D, config: BusConfig) -> Result<Self, ConfigError> {
        let divisor = config.validate()?;
        peripheral.enable(divisor);
        info!(
            "I2C master enabled: {} kHz, divisor {}",
            config.speed_khz, divisor
        );

        Ok(Self {
            peripheral,
            diagnostics,
            config,
            divisor,
        })
    }

    /// Baud-rate divisor programmed at construction
    pub fn divisor(&self) -> u16 {
        self.divisor
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Give back the peripheral and the diagnostic sink
    pub fn release(self) -> (P, D) {
        (self.peripheral, self.diagnostics)
    }

    /// Direct access to the peripheral, bypassing the engine
    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    /// Poll `done` until it returns true, at most `poll_limit` times
    pub(super) fn wait(
        &mut self,
        point: WaitPoint,
        mut done: impl FnMut(&mut P) -> bool,
    ) -> Result<(), Timeout> {
        for _ in 0..self.config.poll_limit {
            if done(&mut self.peripheral) {
                return Ok(());
            }
        }
        warn!("I2C wait timed out: {}", point);
        Err(Timeout(point))
    }

    /// Generate a start condition
    pub fn start(&mut self) -> Result<(), Timeout> {
        self.peripheral.begin_start();
        self.wait(WaitPoint::Start, |p| !p.start_pending())
    }

    /// Generate a repeated start condition
    pub fn restart(&mut self) -> Result<(), Timeout> {
        self.peripheral.begin_restart();
        self.wait(WaitPoint::Restart, |p| !p.restart_pending())
    }

    /// Generate a stop condition
    pub fn stop(&mut self) -> Result<(), Timeout> {
        self.peripheral.begin_stop();
        self.wait(WaitPoint::Stop, |p| !p.stop_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BusEvent, RecordingTx, RegisterSlave, SimBus};
    use crate::SlaveAddress;

    fn bus() -> SimBus<RegisterSlave> {
        SimBus::new(RegisterSlave::new(SlaveAddress::new(0x29).unwrap(), 2))
    }

    #[test]
    fn test_new_programs_divisor() {
        let master = I2cMaster::new(bus(), RecordingTx::new(), BusConfig::default()).unwrap();
        assert_eq!(master.divisor(), 38);
        assert_eq!(master.peripheral().divisor(), Some(38));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = BusConfig {
            speed_khz: 0,
            ..BusConfig::default()
        };
        let result = I2cMaster::new(bus(), RecordingTx::new(), config);
        assert!(matches!(result, Err(ConfigError::ZeroSpeed)));
    }

    #[test]
    fn test_start_stop_trace() {
        let mut master = I2cMaster::new(bus(), RecordingTx::new(), BusConfig::default()).unwrap();
        master.start().unwrap();
        master.stop().unwrap();

        let (bus, _) = master.release();
        assert_eq!(bus.trace(), &[BusEvent::Start, BusEvent::Stop]);
    }

    #[test]
    fn test_latency_within_limit() {
        let config = BusConfig {
            poll_limit: 4,
            ..BusConfig::default()
        };
        let mut master = I2cMaster::new(bus().with_latency(3), RecordingTx::new(), config).unwrap();
        assert_eq!(master.start(), Ok(()));
        assert_eq!(master.stop(), Ok(()));
    }

    #[test]
    fn test_wait_times_out() {
        let config = BusConfig {
            poll_limit: 4,
            ..BusConfig::default()
        };
        let mut master = I2cMaster::new(bus().with_latency(4), RecordingTx::new(), config).unwrap();
        assert_eq!(master.start(), Err(Timeout(WaitPoint::Start)));
    }
}
