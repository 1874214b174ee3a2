//! Special function register access

/// 16-bit special function register file
pub trait RegisterFile {
    /// Read the register at `address`
    fn read(&mut self, address: u16) -> u16;

    /// Write `value` to the register at `address`
    fn write(&mut self, address: u16, value: u16);

    /// Set the bits in `mask`, leaving the others untouched
    fn set_bits(&mut self, address: u16, mask: u16) {
        let value = self.read(address);
        self.write(address, value | mask);
    }

    /// Clear the bits in `mask`, leaving the others untouched
    fn clear_bits(&mut self, address: u16, mask: u16) {
        let value = self.read(address);
        self.write(address, value & !mask);
    }
}

/// Memory-mapped SFR access on the target
#[cfg(feature = "mmio")]
pub struct Mmio {
    _private: (),
}

#[cfg(feature = "mmio")]
impl Mmio {
    /// Get a handle to the SFR space
    ///
    /// # Safety
    ///
    /// Must only be called on a PIC24 where the SFRs live at their datasheet
    /// addresses, and no other code may drive the same peripherals.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

#[cfg(feature = "mmio")]
impl RegisterFile for Mmio {
    fn read(&mut self, address: u16) -> u16 {
        // SAFETY: `steal` guarantees `address` is a valid, aligned SFR
        unsafe { (address as usize as *const u16).read_volatile() }
    }

    fn write(&mut self, address: u16, value: u16) {
        // SAFETY: as above
        unsafe { (address as usize as *mut u16).write_volatile(value) }
    }
}
