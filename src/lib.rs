//! # hd44780-expander
//!
//! Drives HD44780-compatible character LCDs that are wired to an I2C GPIO
//! expander (MCP23017 register layout, as on the Adafruit RGB LCD plate)
//! instead of to parallel output lines, and hands out capability-checked
//! handles to general-purpose pins.
//!
//! ## Features
//!
//! *   Character LCD control ([`CharLcd`]):
//!     *   Entry, display and function modes tracked as bitfields and re-sent
//!         as whole register bytes (`set_mode`, `display_on`, `cursor_on`, ...).
//!     *   Clear, home, display shift, cursor positioning with 16/20 column
//!         row tables ([`RowAddress`]).
//!     *   Custom CGRAM glyphs (`create_char`) and plain text (`print`).
//!     *   Backlight control with configurable polarity.
//! *   4-bit bus emulation over an I2C expander ([`I2cConnection`]):
//!     *   Arbitrary assignment of RS/EN/D4-D7 to expander bits ([`PinMap`]).
//!     *   Enable strobe and settle delays as the controller requires.
//! *   Pin arbitration ([`PinArbiter`]):
//!     *   Lookup by number or alias in a [`PinRegistry`].
//!     *   At most one live handle per physical pin; mode conflicts and
//!         missing capabilities are reported, not papered over.
//! *   Optional XR2280x USB-HID bridge backend (`hid` feature), providing both
//!     an [`I2cBus`] and a [`PinDriver`].
//!
//! ## Usage
//!
//! Any type implementing [`I2cBus`] can carry the display traffic:
//!
//! ```no_run
//! use hd44780_expander::{CharLcd, I2cBus, Mode, PinMap, Result, RowAddress};
//!
//! struct MyBus; // e.g. a wrapper around /dev/i2c-1
//!
//! impl I2cBus for MyBus {
//!     fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
//!         // ... issue [register, value] to `address`
//!         Ok(())
//!     }
//!     fn close(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let mut lcd = CharLcd::new_i2c(
//!         MyBus,
//!         0x20,
//!         PinMap::ADAFRUIT_PLATE,
//!         RowAddress::COLS_16,
//!         &[Mode::CursorOn],
//!     )?;
//!     lcd.backlight_on()?;
//!     lcd.clear()?;
//!     lcd.print("Hello,")?;
//!     lcd.set_cursor(0, 1)?;
//!     lcd.print("world!")?;
//!     lcd.close()
//! }
//! ```
//!
//! ## Timing
//!
//! Every byte goes out as two nibbles, each strobed with three register
//! writes, followed by a 37 µs settle; clear and home wait 1.52 ms. These
//! delays are not configurable: shortening them garbles the display.
//!
//! ## Concurrency
//!
//! Everything here is blocking and unsynchronized. One caller drives a given
//! [`CharLcd`] or [`PinArbiter`] at a time; wrap them in a mutex to share.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade: lifecycle at `debug`, every bus
//! frame at `trace`, the "pin also has other functions" advisory at `info`.
//!
//! ## License
//!
//! This project is licensed under the WTFPL.

mod arbiter;
mod bus;
mod connection;
mod consts;
mod controller;
mod error;
pub mod gpio; // Keep gpio public for its enums and traits
pub mod pins;
pub mod xr2280x;

pub use arbiter::{PinArbiter, PinHandle};
pub use bus::I2cBus;
pub use connection::{BacklightLine, BacklightPolarity, Connection, I2cConnection, PinMap};
pub use consts::mcp23017;
pub use controller::{CharLcd, ControllerState, Mode, RowAddress, DEFAULT_MODES};
pub use error::{Error, Result};
pub use gpio::{DigitalPin, GpioDirection, GpioLevel, NoPwm, PinDriver, PinIo, PinKind, PwmPin};
pub use pins::{Capabilities, PinDescriptor, PinKey, PinRegistry};

/// Protocol timing, exposed for callers that schedule their own bus traffic.
pub mod timing {
    pub use crate::consts::{CLEAR_DELAY, PULSE_DELAY, WRITE_DELAY};
}
