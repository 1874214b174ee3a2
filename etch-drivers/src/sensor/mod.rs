//! I2C sensors

pub mod vl6180;
pub mod xz;

pub use vl6180::Vl6180;
pub use xz::XzSensor;
