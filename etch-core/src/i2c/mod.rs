//! Polled I2C master engine
//!
//! Layered leaf first:
//!
//! 1. Signaling: [`I2cMaster::start`], [`I2cMaster::restart`],
//!    [`I2cMaster::stop`]
//! 2. Byte transfer: [`I2cMaster::put`], [`I2cMaster::get`]
//! 3. Transactions: `write_one`, `write_many`, `read_one`, `read_many`,
//!    `write_read`, and the `embedded_hal::i2c::I2c` implementation
//!
//! Every poll of a hardware flag is bounded by [`BusConfig::poll_limit`]
//! and every transaction that issues a start issues exactly one stop.
//!
//! [`BusConfig::poll_limit`]: crate::config::BusConfig::poll_limit

mod address;
mod error;
mod hal;
mod master;
mod transaction;
mod transfer;

pub use address::{Direction, SlaveAddress};
pub use error::{I2cError, Timeout, WaitPoint};
pub use master::I2cMaster;
pub use transfer::NACK_DIAGNOSTIC;
