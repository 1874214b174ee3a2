//! Device drivers and the sketchpad application
//!
//! Drivers are written against [`etch_core::register::RegisterAccess`], so
//! they run on any bus back-end:
//!
//! - [`sensor::Vl6180`] - time-of-flight range sensor
//! - [`sensor::XzSensor`] - X-Z position sensor
//! - [`sketch::Sketchpad`] - cursor drawing driven by the X-Z sensor

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod sensor;
pub mod sketch;
