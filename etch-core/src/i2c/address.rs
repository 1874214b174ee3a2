/// Transfer direction, carried in bit 0 of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// 7-bit slave address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveAddress(u8);

impl SlaveAddress {
    /// Largest address that fits in seven bits
    pub const MAX: u8 = 0x7F;

    /// Returns `None` if `raw` needs more than seven bits
    pub const fn new(raw: u8) -> Option<Self> {
        if raw <= Self::MAX {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Address for `const` items, where an out-of-range value fails the
    /// build
    pub const fn new_const(raw: u8) -> Self {
        assert!(raw <= Self::MAX, "I2C address needs more than seven bits");
        Self(raw)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Byte sent right after the start condition
    pub const fn byte(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction as u8
    }

    pub const fn write_byte(self) -> u8 {
        self.byte(Direction::Write)
    }

    pub const fn read_byte(self) -> u8 {
        self.byte(Direction::Read)
    }
}

impl TryFrom<u8> for SlaveAddress {
    type Error = super::I2cError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(super::I2cError::InvalidAddress)
    }
}
