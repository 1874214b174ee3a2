//! Host-side bus simulator
//!
//! [`SimBus`] implements [`I2cPeripheral`] against one simulated slave and
//! records every bus event, so tests can assert on exactly what went over
//! the wire. Latency and hangs can be injected to exercise the bounded
//! waits.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream dev-dependencies.

use etch_hal::{Ack, I2cPeripheral, UartTx};
use heapless::{Deque, FnvIndexMap, Vec};

use crate::i2c::{Direction, SlaveAddress};

/// Events kept per bus
pub const TRACE_CAPACITY: usize = 1024;

/// Bytes kept by a [`RecordingTx`]
pub const RECORD_CAPACITY: usize = 4096;

/// Something that happened on the simulated wires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Start,
    Restart,
    Stop,
    /// Master clocked `byte` out, slave answered `ack`
    Write { byte: u8, ack: Ack },
    /// Slave clocked `byte` out, master answered `ack`
    Read { byte: u8, ack: Ack },
}

/// Simulated slave device
pub trait SimSlave {
    fn address(&self) -> SlaveAddress;

    /// Start or repeated start seen on the bus
    fn on_start(&mut self) {}

    /// Slave was addressed for `direction`
    fn begin(&mut self, direction: Direction);

    /// Acknowledge bit driven for a matching address byte
    fn address_ack(&mut self) -> Ack {
        Ack::Ack
    }

    /// Data byte from the master
    fn write(&mut self, byte: u8) -> Ack;

    /// Next byte to send to the master
    fn read(&mut self) -> u8;

    /// Stop seen on the bus
    fn on_stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Address,
    Write,
    Read,
    /// Address byte matched nobody
    Unaddressed,
}

/// Simulated I2C master peripheral with one slave attached
pub struct SimBus<S> {
    slave: S,
    trace: Vec<BusEvent, TRACE_CAPACITY>,
    divisor: Option<u16>,
    latency: u32,
    busy: u32,
    actions_left: Option<usize>,
    frozen: bool,
    phase: Phase,
    last_ack: Ack,
    received: u8,
}

impl<S: SimSlave> SimBus<S> {
    pub fn new(slave: S) -> Self {
        Self {
            slave,
            trace: Vec::new(),
            divisor: None,
            latency: 0,
            busy: 0,
            actions_left: None,
            frozen: false,
            phase: Phase::Idle,
            last_ack: Ack::Nack,
            received: 0xFF,
        }
    }

    /// Every action reports pending for `polls` polls before completing
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = polls;
        self
    }

    /// Let `actions` more actions complete, then hang forever
    pub fn freeze_after(mut self, actions: usize) -> Self {
        self.actions_left = Some(actions);
        self
    }

    /// Hang from now on
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn trace(&self) -> &[BusEvent] {
        &self.trace
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    /// Divisor passed to `enable`, if it has been called
    pub fn divisor(&self) -> Option<u16> {
        self.divisor
    }

    pub fn slave(&self) -> &S {
        &self.slave
    }

    pub fn slave_mut(&mut self) -> &mut S {
        &mut self.slave
    }

    fn record(&mut self, event: BusEvent) {
        // A full trace just stops growing
        let _ = self.trace.push(event);
    }

    fn begin(&mut self) {
        match self.actions_left {
            Some(0) => self.frozen = true,
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        self.busy = self.latency;
    }

    /// True while the current action is still in progress
    fn poll_busy(&mut self) -> bool {
        if self.frozen {
            return true;
        }
        if self.busy > 0 {
            self.busy -= 1;
            return true;
        }
        false
    }

    fn begin_condition(&mut self, event: BusEvent) {
        self.begin();
        self.phase = Phase::Address;
        self.slave.on_start();
        self.record(event);
    }
}

impl<S: SimSlave> I2cPeripheral for SimBus<S> {
    fn enable(&mut self, divisor: u16) {
        self.divisor = Some(divisor);
    }

    fn begin_start(&mut self) {
        self.begin_condition(BusEvent::Start);
    }

    fn start_pending(&mut self) -> bool {
        self.poll_busy()
    }

    fn begin_restart(&mut self) {
        self.begin_condition(BusEvent::Restart);
    }

    fn restart_pending(&mut self) -> bool {
        self.poll_busy()
    }

    fn begin_stop(&mut self) {
        self.begin();
        if self.phase != Phase::Idle {
            self.slave.on_stop();
        }
        self.phase = Phase::Idle;
        self.record(BusEvent::Stop);
    }

    fn stop_pending(&mut self) -> bool {
        self.poll_busy()
    }

    fn load_transmit(&mut self, byte: u8) {
        self.begin();
        let ack = match self.phase {
            Phase::Address if byte >> 1 == self.slave.address().get() => {
                let direction = if byte & 1 == 1 {
                    self.phase = Phase::Read;
                    Direction::Read
                } else {
                    self.phase = Phase::Write;
                    Direction::Write
                };
                self.slave.begin(direction);
                self.slave.address_ack()
            }
            Phase::Address => {
                self.phase = Phase::Unaddressed;
                Ack::Nack
            }
            Phase::Write => self.slave.write(byte),
            Phase::Idle | Phase::Read | Phase::Unaddressed => Ack::Nack,
        };
        self.last_ack = ack;
        self.record(BusEvent::Write { byte, ack });
    }

    fn transmit_pending(&mut self) -> bool {
        self.poll_busy()
    }

    fn ack_status(&mut self) -> Ack {
        self.last_ack
    }

    fn is_idle(&mut self) -> bool {
        !self.poll_busy()
    }

    fn begin_receive(&mut self) {
        self.begin();
        // Nobody drives SDA when no slave is selected
        self.received = if self.phase == Phase::Read {
            self.slave.read()
        } else {
            0xFF
        };
    }

    fn receive_full(&mut self) -> bool {
        !self.poll_busy()
    }

    fn take_received(&mut self) -> u8 {
        self.received
    }

    fn begin_ack(&mut self, ack: Ack) {
        self.begin();
        self.record(BusEvent::Read {
            byte: self.received,
            ack,
        });
    }

    fn ack_pending(&mut self) -> bool {
        self.poll_busy()
    }
}

/// Registers a [`RegisterSlave`] can hold
pub const REGISTER_CAPACITY: usize = 64;

/// Register writes a [`RegisterSlave`] logs
pub const WRITE_LOG_CAPACITY: usize = 128;

/// Device with an auto-incrementing register pointer
///
/// The first `width` bytes of every write set the pointer (big-endian),
/// the rest are stored starting there. Reads come from the pointer
/// onwards, taking scripted values first.
pub struct RegisterSlave {
    address: SlaveAddress,
    width: usize,
    pointer: u16,
    received: usize,
    registers: FnvIndexMap<u16, u8, REGISTER_CAPACITY>,
    scripts: FnvIndexMap<u16, Deque<u8, 16>, 8>,
    writes: Vec<(u16, u8), WRITE_LOG_CAPACITY>,
    nack_from: Option<usize>,
    nack_address: bool,
}

impl RegisterSlave {
    /// `width` is the register address size in bytes, 1 or 2
    pub fn new(address: SlaveAddress, width: usize) -> Self {
        Self {
            address,
            width,
            pointer: 0,
            received: 0,
            registers: FnvIndexMap::new(),
            scripts: FnvIndexMap::new(),
            writes: Vec::new(),
            nack_from: None,
            nack_address: false,
        }
    }

    /// Preload a register
    pub fn set(&mut self, register: u16, value: u8) {
        let _ = self.registers.insert(register, value);
    }

    /// Current register value, 0 if never written
    pub fn get(&self, register: u16) -> u8 {
        self.registers.get(&register).copied().unwrap_or(0)
    }

    /// Queue values returned by the next reads of `register`
    pub fn script(&mut self, register: u16, values: &[u8]) {
        if !self.scripts.contains_key(&register) {
            let _ = self.scripts.insert(register, Deque::new());
        }
        if let Some(queue) = self.scripts.get_mut(&register) {
            for &value in values {
                let _ = queue.push_back(value);
            }
        }
    }

    /// NACK every data byte from position `index` of a write on
    pub fn nack_data_from(&mut self, index: usize) {
        self.nack_from = Some(index);
    }

    /// Leave the address acknowledge bit high while still taking the data
    pub fn nack_address(&mut self) {
        self.nack_address = true;
    }

    /// Register writes in the order they happened
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    pub fn pointer(&self) -> u16 {
        self.pointer
    }
}

impl SimSlave for RegisterSlave {
    fn address(&self) -> SlaveAddress {
        self.address
    }

    fn begin(&mut self, direction: Direction) {
        if direction == Direction::Write {
            self.received = 0;
        }
    }

    fn address_ack(&mut self) -> Ack {
        if self.nack_address {
            Ack::Nack
        } else {
            Ack::Ack
        }
    }

    fn write(&mut self, byte: u8) -> Ack {
        let index = self.received;
        self.received += 1;
        if self.nack_from.is_some_and(|from| index >= from) {
            return Ack::Nack;
        }

        if index < self.width {
            self.pointer = if index == 0 {
                byte as u16
            } else {
                (self.pointer << 8) | byte as u16
            };
        } else {
            self.set(self.pointer, byte);
            let _ = self.writes.push((self.pointer, byte));
            self.pointer = self.pointer.wrapping_add(1);
        }
        Ack::Ack
    }

    fn read(&mut self) -> u8 {
        let scripted = self
            .scripts
            .get_mut(&self.pointer)
            .and_then(|queue| queue.pop_front());
        let value = scripted.unwrap_or_else(|| self.get(self.pointer));
        self.pointer = self.pointer.wrapping_add(1);
        value
    }
}

/// Error from a [`RecordingTx`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// Capture buffer is full
    Full,
    /// Port was created with [`RecordingTx::broken`]
    Broken,
}

/// Serial transmitter that keeps everything written to it
pub struct RecordingTx {
    bytes: Vec<u8, RECORD_CAPACITY>,
    broken: bool,
}

impl RecordingTx {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            broken: false,
        }
    }

    /// Port that fails every write
    pub fn broken() -> Self {
        Self {
            bytes: Vec::new(),
            broken: true,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Captured output as text, empty if it isn't valid UTF-8
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.bytes).unwrap_or("")
    }

    /// Number of line feeds written
    pub fn lines(&self) -> usize {
        self.bytes.iter().filter(|&&b| b == b'\n').count()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl Default for RecordingTx {
    fn default() -> Self {
        Self::new()
    }
}

impl UartTx for RecordingTx {
    type Error = RecordError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), RecordError> {
        if self.broken {
            return Err(RecordError::Broken);
        }
        self.bytes
            .extend_from_slice(data)
            .map_err(|_| RecordError::Full)
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        if self.broken {
            return Err(RecordError::Broken);
        }
        Ok(())
    }
}
