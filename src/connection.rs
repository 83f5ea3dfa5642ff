//! 4-bit HD44780 bus emulated on the output register of an I2C GPIO expander.

use crate::bus::I2cBus;
use crate::consts::{self, mcp23017};
use crate::error::{Error, Result};
use log::{debug, trace};
use std::thread;

/// Link between [`crate::CharLcd`] and the controller's pins.
pub trait Connection {
    /// Sends one byte. `register_select` is `true` for character data and
    /// `false` for instructions.
    fn write(&mut self, register_select: bool, data: u8) -> Result<()>;

    /// Turns the optional backlight on.
    fn backlight_on(&mut self) -> Result<()>;

    /// Turns the optional backlight off.
    fn backlight_off(&mut self) -> Result<()>;

    /// Closes all open resources.
    fn close(&mut self) -> Result<()>;
}

/// Logic level that lights the backlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightPolarity {
    /// Active-high: the bit must be set to light the backlight.
    Positive,
    /// Active-low: the bit must be clear to light the backlight.
    Negative,
}

/// Backlight switch wired to one bit of an expander register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklightLine {
    /// Expander register holding the backlight bit.
    pub register: u8,
    /// Bit position of the backlight line within `register`.
    pub bit: u8,
    pub polarity: BacklightPolarity,
}

impl BacklightLine {
    /// Register value for the requested backlight state.
    pub fn value(&self, on: bool) -> u8 {
        let set = on != (self.polarity == BacklightPolarity::Negative);
        if set {
            1 << self.bit
        } else {
            0
        }
    }
}

/// Bit positions of the controller lines on the expander's output register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// Register select.
    pub rs: u8,
    /// Read/write. The driver is write-only, so this line is always held low.
    pub rw: u8,
    /// Enable (strobe).
    pub en: u8,
    pub d4: u8,
    pub d5: u8,
    pub d6: u8,
    pub d7: u8,
    pub backlight: Option<BacklightLine>,
}

impl PinMap {
    /// Adafruit RGB LCD plate (MCP23017): control and data lines on GPIOB,
    /// data lines reversed, backlight on GPIOA bit 6, active-low.
    pub const ADAFRUIT_PLATE: PinMap = PinMap {
        rs: 7,
        rw: 6,
        en: 5,
        d4: 4,
        d5: 3,
        d6: 2,
        d7: 1,
        backlight: Some(BacklightLine {
            register: mcp23017::GPIOA,
            bit: 6,
            polarity: BacklightPolarity::Negative,
        }),
    };

    /// Checks that every line sits on its own bit of an 8-bit register.
    ///
    /// A backlight on the data register (GPIOB) must not share a bit with the
    /// controller lines either.
    pub fn validate(&self) -> Result<()> {
        let mut lines = vec![
            ("RS", self.rs),
            ("RW", self.rw),
            ("EN", self.en),
            ("D4", self.d4),
            ("D5", self.d5),
            ("D6", self.d6),
            ("D7", self.d7),
        ];
        if let Some(line) = self.backlight {
            if line.bit > 7 {
                return Err(Error::ArgumentOutOfRange(format!(
                    "backlight bit {} must be 0-7",
                    line.bit
                )));
            }
            if line.register == mcp23017::GPIOB {
                lines.push(("backlight", line.bit));
            }
        }
        let mut used = 0u8;
        for (name, bit) in lines {
            if bit > 7 {
                return Err(Error::ArgumentOutOfRange(format!(
                    "{} bit {} must be 0-7",
                    name, bit
                )));
            }
            if used & (1 << bit) != 0 {
                return Err(Error::ArgumentOutOfRange(format!(
                    "{} bit {} is already assigned to another line",
                    name, bit
                )));
            }
            used |= 1 << bit;
        }
        Ok(())
    }

    /// Places a nibble (bits 0-3 of `nibble`) on D4-D7.
    pub fn nibble_frame(&self, nibble: u8) -> u8 {
        ((nibble & 0x01) << self.d4)
            | (((nibble >> 1) & 0x01) << self.d5)
            | (((nibble >> 2) & 0x01) << self.d6)
            | (((nibble >> 3) & 0x01) << self.d7)
    }

    /// The two frames for `data`, high nibble first, RS applied.
    pub fn frames(&self, register_select: bool, data: u8) -> [u8; 2] {
        let rs = if register_select { 1 << self.rs } else { 0 };
        [
            self.nibble_frame(data >> 4) | rs,
            self.nibble_frame(data & 0x0F) | rs,
        ]
    }

    /// Frame with the enable line raised.
    #[inline]
    pub fn strobe(&self, frame: u8) -> u8 {
        frame | (1 << self.en)
    }
}

/// [`Connection`] over an MCP23017-style expander on an [`I2cBus`].
///
/// Every nibble costs three register writes (enable low, high, low), each a
/// full bus round-trip.
#[derive(Debug)]
pub struct I2cConnection<B: I2cBus> {
    bus: B,
    address: u8,
    pin_map: PinMap,
}

impl<B: I2cBus> I2cConnection<B> {
    /// Puts the expander at `address` into the layout this driver expects:
    /// BANK=0 without sequential addressing, backlight off, both ports output.
    ///
    /// `pin_map` is checked with [`PinMap::validate`] before the bus is touched.
    pub fn new(mut bus: B, address: u8, pin_map: PinMap) -> Result<Self> {
        pin_map.validate()?;
        debug!(
            "Configuring expander at 0x{:02X} for character LCD output",
            address
        );
        // If the chip is still in BANK=1, IOCON lives at 0x05; clearing it there
        // moves the chip to BANK=0. In BANK=0, 0x05 is a harmless GPINTENB write.
        bus.write_byte_to_register(address, mcp23017::IOCON_BANK1, 0x00)?;
        bus.write_byte_to_register(address, mcp23017::IOCON, mcp23017::IOCON_SEQOP)?;
        if let Some(line) = pin_map.backlight {
            bus.write_byte_to_register(address, line.register, line.value(false))?;
        }
        bus.write_byte_to_register(address, mcp23017::IODIRA, 0x00)?;
        bus.write_byte_to_register(address, mcp23017::IODIRB, 0x00)?;
        Ok(Self {
            bus,
            address,
            pin_map,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn pin_map(&self) -> &PinMap {
        &self.pin_map
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    fn pulse_enable(&mut self, frame: u8) -> Result<()> {
        for value in [frame, self.pin_map.strobe(frame), frame] {
            thread::sleep(consts::PULSE_DELAY);
            self.bus
                .write_byte_to_register(self.address, mcp23017::GPIOB, value)?;
        }
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<()> {
        match self.pin_map.backlight {
            Some(line) => {
                debug!("Backlight {}", if on { "on" } else { "off" });
                self.bus
                    .write_byte_to_register(self.address, line.register, line.value(on))
            }
            None => {
                debug!("No backlight line configured; ignoring backlight request");
                Ok(())
            }
        }
    }
}

impl<B: I2cBus> Connection for I2cConnection<B> {
    fn write(&mut self, register_select: bool, data: u8) -> Result<()> {
        for frame in self.pin_map.frames(register_select, data) {
            trace!("Writing nibble frame 0x{:02X} (rs={})", frame, register_select);
            self.pulse_enable(frame)?;
        }
        thread::sleep(consts::WRITE_DELAY);
        Ok(())
    }

    fn backlight_on(&mut self) -> Result<()> {
        self.set_backlight(true)
    }

    fn backlight_off(&mut self) -> Result<()> {
        self.set_backlight(false)
    }

    fn close(&mut self) -> Result<()> {
        debug!("Closing I2C bus for expander at 0x{:02X}", self.address);
        self.bus.close()
    }
}
