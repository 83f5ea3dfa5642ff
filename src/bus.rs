//! I2C bus contract consumed by [`crate::I2cConnection`].

use crate::error::Result;

/// Register-oriented I2C master.
pub trait I2cBus {
    /// Writes `value` into register `register` of the device at 7-bit `address`.
    fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()>;

    /// Releases the bus.
    fn close(&mut self) -> Result<()>;
}

impl<B: I2cBus + ?Sized> I2cBus for &mut B {
    fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        (**self).write_byte_to_register(address, register, value)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<B: I2cBus + ?Sized> I2cBus for Box<B> {
    fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        (**self).write_byte_to_register(address, register, value)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
