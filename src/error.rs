use crate::gpio::PinKind;
use thiserror::Error;

/// Errors that can occur when driving the display or claiming pins.
///
/// Pin lookups, mode checks and every bus or pin transport failure end up
/// here. Nothing in the crate retries; each variant is handed back to the
/// immediate caller.
#[derive(Error, Debug)]
pub enum Error {
    /// No pin in the registry matches the requested number or alias.
    #[error("Pin not found for key '{key}'")]
    PinNotFound {
        /// The number or alias that was looked up.
        key: String,
    },
    /// The pin is already held under a different mode.
    #[error("Pin '{key}' is already initialized as {held} and cannot be opened as {requested}")]
    PinModeConflict {
        /// The number or alias that was looked up.
        key: String,
        /// The kind the caller asked for.
        requested: PinKind,
        /// The kind of the handle already held for this pin.
        held: PinKind,
    },
    /// The pin's capability mask does not allow the requested mode.
    #[error("Pin '{key}' cannot be used as {requested}")]
    UnsupportedPinMode {
        /// The number or alias that was looked up.
        key: String,
        /// The kind the caller asked for.
        requested: PinKind,
    },
    /// General I/O error from a bus or pin transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Error from the underlying HID API layer.
    #[cfg(feature = "hid")]
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    /// No XR2280x interface was found with the specified vendor/product ID.
    #[error("Device not found with specified VID/PID")]
    DeviceNotFound,
    /// Invalid or malformed HID report received from device.
    #[error("Invalid HID report received or unexpected size ({0} bytes)")]
    InvalidReport(usize),
    /// HID feature report operation failed.
    #[error("Feature report error while accessing register 0x{reg_addr:04X}")]
    FeatureReportError {
        /// The register address that was being accessed.
        reg_addr: u16,
    },
    /// Function argument is outside the valid range.
    #[error("Argument out of range: {0}")]
    ArgumentOutOfRange(String),
    /// Pin number is outside the range a backend can drive.
    #[error("Pin {pin} argument out of range: {message}")]
    PinArgumentOutOfRange {
        /// The invalid pin number that was specified.
        pin: u32,
        /// Detailed error message explaining the constraint.
        message: String,
    },
    /// I2C slave device responded with NACK (not acknowledged).
    #[error("No device at I2C address 0x{address:02X}: device did not acknowledge (NACK)")]
    I2cNack {
        /// The 7-bit address that sent the NACK.
        address: u8,
    },
    /// I2C bus arbitration was lost during transaction.
    #[error("I2C bus conflict at address 0x{address:02X}: arbitration lost")]
    I2cArbitrationLost {
        /// The 7-bit address being accessed when arbitration was lost.
        address: u8,
    },
    /// I2C bus timeout occurred during transaction.
    #[error(
        "I2C timeout at address 0x{address:02X}: device did not respond. Check device power and connections."
    )]
    I2cTimeout {
        /// The 7-bit address being accessed when timeout occurred.
        address: u8,
    },
    /// I2C transaction failed due to invalid request parameters.
    #[error("I2C request error at address 0x{address:02X}: invalid parameters sent to bridge firmware")]
    I2cRequestError {
        /// The 7-bit address being accessed when the error occurred.
        address: u8,
    },
    /// I2C transaction failed with unknown error condition.
    #[error("I2C unknown error at address 0x{address:02X} (status: 0x{flags:02X})")]
    I2cUnknownError {
        /// The 7-bit address being accessed when the error occurred.
        address: u8,
        /// Raw status flags reported by the bridge.
        flags: u8,
    },
    /// Feature is not supported by this backend or chip model.
    #[error("Feature not supported: {0}")]
    UnsupportedFeature(String),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
