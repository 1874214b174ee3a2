//! Etch - serial terminal sketchpad
//!
//! Reads an X-Z position sensor over a bit-banged I2C bus, moves the cursor
//! of a VT100 terminal on UART0 accordingly, and draws, erases or clears
//! while the push-buttons are held.
//!
//! Wiring:
//! - I2C SCL GPIO5, SDA GPIO4 (open-drain, external pull-ups)
//! - UART0 TX GPIO0
//! - Buttons to ground: draw GPIO13, erase GPIO14, clear GPIO15

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, OutputOpenDrain, Pull};
use embassy_rp::uart::{Config as UartConfig, UartTx};
use embassy_time::{Delay, Timer};
use {defmt_rtt as _, panic_probe as _};

use etch_core::i2c::I2cMaster;
use etch_drivers::sensor::XzSensor;
use etch_drivers::sketch::{Buttons, SketchError, Sketchpad};
use etch_hal::{BitBang, Button, SharedTx};

use crate::serial::SerialTx;

mod serial;

// Generated from etch.toml by build.rs
include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Etch firmware starting...");

    let p = embassy_rp::init(Default::default());

    // One serial port shared by the terminal and the I2C diagnostics
    let uart = UartTx::new_blocking(p.UART0, p.PIN_0, UartConfig::default());
    let port = RefCell::new(SerialTx::new(uart));

    let scl = OutputOpenDrain::new(p.PIN_5, Level::High);
    let sda = OutputOpenDrain::new(p.PIN_4, Level::High);
    let bitbang = BitBang::new(scl, sda, Delay, CONFIG.bus.core_clock_hz);

    let mut bus = match I2cMaster::new(bitbang, SharedTx::new(&port), CONFIG.bus) {
        Ok(bus) => bus,
        Err(e) => {
            // build.rs already validated CONFIG
            error!("Invalid bus configuration: {}", e);
            loop {
                Timer::after_secs(1).await;
            }
        }
    };
    info!(
        "I2C bus ready: {} kHz, bit half period {} ns",
        CONFIG.bus.speed_khz,
        bus.peripheral().half_period_ns()
    );

    let mut draw = Button::new(Input::new(p.PIN_13, Pull::Up));
    let mut erase = Button::new(Input::new(p.PIN_14, Pull::Up));
    let mut clear = Button::new(Input::new(p.PIN_15, Pull::Up));

    let mut pad = Sketchpad::new(XzSensor::new(), CONFIG.cursor, SharedTx::new(&port));

    // Keep trying until the sensor answers
    while let Err(e) = pad.start(&mut bus) {
        warn!("Sketchpad start failed: {}", e);
        Timer::after_secs(1).await;
    }
    info!("Sketchpad running, sampling every {} ms", CONFIG.sample_period_ms);

    loop {
        Timer::after_millis(CONFIG.sample_period_ms as u64).await;

        let buttons = Buttons::read(&mut draw, &mut erase, &mut clear);
        match pad.step(&mut bus, buttons) {
            Ok(_) => {}
            Err(SketchError::Bus(e)) => warn!("Sensor read failed: {}", e),
            Err(SketchError::Terminal) => warn!("Terminal write failed"),
        }
    }
}
