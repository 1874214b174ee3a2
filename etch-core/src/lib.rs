//! Board-agnostic core logic for the etch sketchpad firmware
//!
//! This crate contains everything that does not depend on a particular
//! chip:
//!
//! - The polled I2C master engine (signaling, byte transfer, transactions)
//! - Register access on top of the transaction layer
//! - Cursor tracking and terminal escape sequences
//! - Configuration type definitions
//! - A host-side bus simulator (feature `testing`)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the log macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod config;
pub mod cursor;
pub mod i2c;
pub mod register;
pub mod terminal;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{BusConfig, Config, ConfigError, CursorConfig, NackPolicy};
pub use cursor::{Cursor, Position};
pub use i2c::{Direction, I2cError, I2cMaster, SlaveAddress, Timeout, WaitPoint};
pub use register::{RegisterAccess, RegisterAddress};
pub use terminal::Terminal;
