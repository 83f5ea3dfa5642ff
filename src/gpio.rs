//! Pin transport contracts consumed by [`crate::PinArbiter`].

use crate::error::Result;
use crate::pins::PinDescriptor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    Input,
    Output,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioLevel {
    Low,
    High,
}

/// The mode a pin handle was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinKind {
    /// General-purpose digital I/O.
    Digital,
    /// Pulse-width modulated output.
    Pwm,
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKind::Digital => write!(f, "digital I/O"),
            PinKind::Pwm => write!(f, "PWM"),
        }
    }
}

/// Anything the arbiter holds on behalf of a pin.
pub trait PinIo {
    /// Physical pin number this handle drives.
    fn number(&self) -> u32;

    /// Releases the pin in the underlying transport.
    fn close(&mut self) -> Result<()>;
}

/// A pin opened for general-purpose digital I/O.
pub trait DigitalPin: PinIo {
    fn set_direction(&mut self, direction: GpioDirection) -> Result<()>;
    fn write(&mut self, level: GpioLevel) -> Result<()>;
    fn read(&mut self) -> Result<GpioLevel>;
}

/// A pin opened for PWM output.
pub trait PwmPin: PinIo {
    /// Sets the high and low durations of one period, in nanoseconds.
    fn set_periods_ns(&mut self, high_ns: u64, low_ns: u64) -> Result<()>;

    /// Starts (`true`) or stops (`false`) free-running output.
    fn set_enabled(&mut self, enabled: bool) -> Result<()>;
}

/// Opens physical pins. Implemented by each board or bridge backend.
///
/// The arbiter calls these at most once per pin for as long as the handle
/// stays claimed.
pub trait PinDriver {
    type Digital: DigitalPin;
    type Pwm: PwmPin;

    fn open_digital(&mut self, pin: &PinDescriptor) -> Result<Self::Digital>;
    fn open_pwm(&mut self, pin: &PinDescriptor) -> Result<Self::Pwm>;
}

/// PWM handle type for drivers that cannot generate PWM.
///
/// It has no values, so a driver using it can only fail in `open_pwm`.
#[derive(Debug)]
pub enum NoPwm {}

impl PinIo for NoPwm {
    fn number(&self) -> u32 {
        match *self {}
    }
    fn close(&mut self) -> Result<()> {
        match *self {}
    }
}

impl PwmPin for NoPwm {
    fn set_periods_ns(&mut self, _high_ns: u64, _low_ns: u64) -> Result<()> {
        match *self {}
    }
    fn set_enabled(&mut self, _enabled: bool) -> Result<()> {
        match *self {}
    }
}
