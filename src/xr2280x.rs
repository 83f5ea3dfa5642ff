//! Backend for MaxLinear/Exar XR22800/1/2/4 USB bridges.
//!
//! The bridge exposes two USB HID interfaces: an I2C master, which can carry
//! the expander traffic for [`crate::I2cConnection`], and the EDGE controller
//! (GPIO and two PWM channels), which backs a [`crate::PinArbiter`].
//!
//! The pin table and PWM unit conversions are always available. The device
//! handles need the `hid` feature.
//!
//! ```no_run
//! # #[cfg(feature = "hid")]
//! # fn main() -> hd44780_expander::Result<()> {
//! use hd44780_expander::xr2280x::{Xr2280xEdge, Xr2280xI2c};
//! use hd44780_expander::{CharLcd, PinArbiter, PinMap, RowAddress};
//! use hidapi::HidApi;
//!
//! let hid_api = HidApi::new()?;
//! let bus = Xr2280xI2c::open(&hid_api)?;
//! let mut lcd = CharLcd::new_i2c(bus, 0x20, PinMap::ADAFRUIT_PLATE, RowAddress::COLS_16, &[])?;
//! lcd.print("Hello")?;
//!
//! let edge = Xr2280xEdge::open(&hid_api)?;
//! let mut pins = PinArbiter::new(edge.registry(), edge);
//! pins.acquire_digital("E0")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "hid"))]
//! # fn main() {}
//! ```

use crate::error::{Error, Result};
use crate::pins::{Capabilities, PinDescriptor, PinRegistry};

/// Exar Corporation vendor ID.
pub const EXAR_VID: u16 = 0x04E2;
/// Product ID of the I2C interface (common for XR22800/1/2/4).
pub const XR2280X_I2C_PID: u16 = 0x1100;
/// Product ID of the EDGE (GPIO/PWM) interface (common for XR22800/1/2/4).
pub const XR2280X_EDGE_PID: u16 = 0x1200;

// PWM periods count in 60MHz / 16 ticks: 266.666... ns each.
const PWM_UNIT_TIME_NS: f64 = 1_000_000_000.0 / (60_000_000.0 / 16.0);
const PWM_MIN_UNITS: u16 = 1;
const PWM_MAX_UNITS: u16 = 4095;

/// Pin table for the EDGE interface: pins 0..`gpio_count` named `E<n>` and
/// `GPIO<n>`. Any EDGE pin can carry a PWM channel.
pub fn edge_pin_registry(gpio_count: u8) -> PinRegistry {
    (0..u32::from(gpio_count))
        .map(|n| {
            PinDescriptor::new(
                n,
                [format!("E{}", n), format!("GPIO{}", n)],
                Capabilities::NORMAL | Capabilities::PWM,
            )
        })
        .collect()
}

/// Converts nanoseconds to PWM units (increments of ~266.667ns).
/// Returns `Err` if the time is out of range (1 - 4095 units).
pub fn ns_to_pwm_units(nanoseconds: u64) -> Result<u16> {
    if nanoseconds == 0 {
        return Err(Error::ArgumentOutOfRange(
            "PWM time must be greater than 0 ns".to_string(),
        ));
    }
    let units = (nanoseconds as f64 / PWM_UNIT_TIME_NS).round() as u64;
    if units < u64::from(PWM_MIN_UNITS) {
        Err(Error::ArgumentOutOfRange(format!(
            "PWM time {} ns is too small (min {} ns)",
            nanoseconds,
            pwm_units_to_ns(PWM_MIN_UNITS)
        )))
    } else if units > u64::from(PWM_MAX_UNITS) {
        Err(Error::ArgumentOutOfRange(format!(
            "PWM time {} ns is too large (max {} ns)",
            nanoseconds,
            pwm_units_to_ns(PWM_MAX_UNITS)
        )))
    } else {
        Ok(units as u16)
    }
}

/// Converts PWM units to nanoseconds (units * 266.667ns).
pub fn pwm_units_to_ns(units: u16) -> u64 {
    (f64::from(units) * PWM_UNIT_TIME_NS).round() as u64
}

#[cfg(feature = "hid")]
pub use self::hid::{Xr2280xEdge, Xr2280xI2c, XrDigitalPin, XrPwmPin};

#[cfg(feature = "hid")]
mod hid {
    use super::*;
    use crate::bus::I2cBus;
    use crate::gpio::{DigitalPin, GpioDirection, GpioLevel, PinDriver, PinIo, PwmPin};
    use hidapi::{HidApi, HidDevice};
    use log::{debug, trace, warn};
    use std::cell::Cell;
    use std::rc::Rc;

    const DEFAULT_I2C_TIMEOUT_MS: i32 = 500;

    // Feature reports (control transfer)
    const REPORT_ID_WRITE_HID_REGISTER: u8 = 0x3C;
    const REPORT_ID_SET_HID_READ_ADDRESS: u8 = 0x4B;
    const REPORT_ID_READ_HID_REGISTER: u8 = 0x5A;

    mod i2c {
        pub const REPORT_MAX_DATA_SIZE: usize = 32;
        // Flags(1) + WrSize(1) + RdSize(1) + SlaveAddr(1) + Data(32)
        pub const OUT_REPORT_WRITE_BUF_SIZE: usize = 36;
        pub const IN_REPORT_READ_BUF_SIZE: usize = 36;

        pub const REG_SCL_LOW: u16 = 0x0341;
        pub const REG_SCL_HIGH: u16 = 0x0342;

        pub const START_BIT: u8 = 1 << 0;
        pub const STOP_BIT: u8 = 1 << 1;

        pub const REQUEST_ERROR: u8 = 1 << 0;
        pub const NAK_RECEIVED: u8 = 1 << 1;
        pub const ARBITRATION_LOST: u8 = 1 << 2;
        pub const TIMEOUT: u8 = 1 << 3;
    }

    mod edge {
        // Group 0 (E0-E15); group 1 (E16-E31) sits GROUP1_OFFSET higher.
        pub const REG_FUNC_SEL_0: u16 = 0x03C0;
        pub const REG_DIR_0: u16 = 0x03C1;
        pub const REG_SET_0: u16 = 0x03C2;
        pub const REG_CLEAR_0: u16 = 0x03C3;
        pub const REG_STATE_0: u16 = 0x03C4;
        pub const GROUP1_OFFSET: u16 = 0x000C;
        pub const REG_FUNC_SEL_1: u16 = REG_FUNC_SEL_0 + GROUP1_OFFSET;

        pub const REG_PWM0_CTRL: u16 = 0x03D8;
        pub const REG_PWM0_HIGH: u16 = 0x03D9;
        pub const REG_PWM0_LOW: u16 = 0x03DA;
        pub const REG_PWM1_CTRL: u16 = 0x03DB;
        pub const REG_PWM1_HIGH: u16 = 0x03DC;
        pub const REG_PWM1_LOW: u16 = 0x03DD;

        pub const PWM_PIN_MASK: u16 = 0b0000_0000_0001_1111;
        pub const PWM_ENABLE_MASK: u16 = 0b0000_0000_0010_0000;
        pub const PWM_CMD_MASK: u16 = 0b0000_0001_1100_0000;
        pub const PWM_CMD_SHIFT: u8 = 6;
        pub const PWM_CMD_IDLE: u16 = 0b000;
        pub const PWM_CMD_FREE_RUN: u16 = 0b110;
    }

    fn write_hid_register(device: &HidDevice, reg_addr: u16, value: u16) -> Result<()> {
        let [reg_lo, reg_hi] = reg_addr.to_le_bytes();
        let [val_lo, val_hi] = value.to_le_bytes();
        let buf = [REPORT_ID_WRITE_HID_REGISTER, reg_lo, reg_hi, val_lo, val_hi];
        trace!(
            "Writing Feature Report (Write Reg {:04X} = {:04X}): {:02X?}",
            reg_addr,
            value,
            &buf[..]
        );
        device.send_feature_report(&buf).map_err(|e| {
            trace!("send_feature_report error: {}", e);
            Error::FeatureReportError { reg_addr }
        })
    }

    fn read_hid_register(device: &HidDevice, reg_addr: u16) -> Result<u16> {
        let [reg_lo, reg_hi] = reg_addr.to_le_bytes();
        device
            .send_feature_report(&[REPORT_ID_SET_HID_READ_ADDRESS, reg_lo, reg_hi])
            .map_err(|e| {
                trace!("send_feature_report error: {}", e);
                Error::FeatureReportError { reg_addr }
            })?;

        let mut buf = [REPORT_ID_READ_HID_REGISTER, 0, 0];
        match device.get_feature_report(&mut buf) {
            Ok(len) if len == buf.len() && buf[0] == REPORT_ID_READ_HID_REGISTER => {
                let value = u16::from_le_bytes([buf[1], buf[2]]);
                trace!("Read Reg 0x{:04X} = 0x{:04X}", reg_addr, value);
                Ok(value)
            }
            Ok(len) => {
                warn!(
                    "get_feature_report returned unexpected report: {:02X?} ({} bytes)",
                    buf, len
                );
                Err(Error::FeatureReportError { reg_addr })
            }
            Err(e) => {
                trace!("get_feature_report error: {}", e);
                Err(Error::FeatureReportError { reg_addr })
            }
        }
    }

    /// The bridge's I2C master, usable as an [`I2cBus`].
    ///
    /// **Note:** This handle is not thread-safe (`!Sync`).
    #[derive(Debug)]
    pub struct Xr2280xI2c {
        device: Option<HidDevice>,
        timeout_ms: i32,
    }

    impl Xr2280xI2c {
        /// Opens the first I2C interface with the default VID/PID.
        /// **Warning:** Ambiguous if multiple devices exist.
        pub fn open(hid_api: &HidApi) -> Result<Self> {
            Self::open_by_vid_pid(hid_api, EXAR_VID, XR2280X_I2C_PID)
        }

        pub fn open_by_vid_pid(hid_api: &HidApi, vid: u16, pid: u16) -> Result<Self> {
            let device = hid_api.open(vid, pid).map_err(|e| {
                debug!("Failed to open I2C interface {:04X}:{:04X}: {}", vid, pid, e);
                Error::DeviceNotFound
            })?;
            debug!("Opened XR2280x I2C interface: VID={:04X}, PID={:04X}", vid, pid);
            Ok(Self::from_device(device))
        }

        pub fn from_device(device: HidDevice) -> Self {
            Self {
                device: Some(device),
                timeout_ms: DEFAULT_I2C_TIMEOUT_MS,
            }
        }

        /// `false` once [`I2cBus::close`] has released the interface.
        pub fn is_open(&self) -> bool {
            self.device.is_some()
        }

        fn device(&self) -> Result<&HidDevice> {
            self.device.as_ref().ok_or(Error::DeviceNotFound)
        }

        /// Sets how long to wait for the bridge's status report.
        pub fn set_timeout_ms(&mut self, timeout_ms: i32) {
            self.timeout_ms = timeout_ms;
        }

        /// Sets the I2C bus speed (approximated). Max supported is 400 kHz.
        pub fn set_speed_khz(&self, speed_khz: u32) -> Result<()> {
            if speed_khz == 0 || speed_khz > 400 {
                return Err(Error::ArgumentOutOfRange(format!(
                    "I2C speed {} kHz out of range (1-400)",
                    speed_khz
                )));
            }
            let total_cycles = 60_000 / speed_khz;
            let low_cycles = total_cycles / 2;
            let high_cycles = total_cycles - low_cycles;
            let (min_low, min_high) = if speed_khz <= 100 { (252, 240) } else { (78, 36) };
            let scl_low = low_cycles.max(min_low) as u16;
            let scl_high = high_cycles.max(min_high) as u16;
            debug!(
                "Setting I2C speed ~{}kHz: SCL_LOW=0x{:04X}, SCL_HIGH=0x{:04X}",
                speed_khz, scl_low, scl_high
            );
            let device = self.device()?;
            write_hid_register(device, i2c::REG_SCL_LOW, scl_low)?;
            write_hid_register(device, i2c::REG_SCL_HIGH, scl_high)
        }

        /// Writes `data` to the 7-bit `address` in one START..STOP transaction.
        pub fn write(&self, address: u8, data: &[u8]) -> Result<()> {
            if address > 0x7F {
                return Err(Error::ArgumentOutOfRange(
                    "7-bit I2C address must be 0-127".to_string(),
                ));
            }
            if data.len() > i2c::REPORT_MAX_DATA_SIZE {
                return Err(Error::ArgumentOutOfRange(format!(
                    "I2C write of {} bytes exceeds the {} byte report",
                    data.len(),
                    i2c::REPORT_MAX_DATA_SIZE
                )));
            }

            let mut out_buf = [0u8; i2c::OUT_REPORT_WRITE_BUF_SIZE];
            out_buf[0] = i2c::START_BIT | i2c::STOP_BIT;
            out_buf[1] = data.len() as u8;
            out_buf[2] = 0;
            out_buf[3] = address << 1;
            out_buf[4..4 + data.len()].copy_from_slice(data);
            trace!("I2C OUT buffer: {:02X?}", &out_buf[..]);

            let device = self.device()?;
            let written = device.write(&out_buf)?;
            if written != out_buf.len() {
                warn!("Partial write: sent {} of {} bytes", written, out_buf.len());
                return Err(Error::Io(std::io::Error::other("Partial HID write")));
            }

            // The bridge always answers with a status report, even for writes.
            let mut in_buf = [0u8; i2c::IN_REPORT_READ_BUF_SIZE];
            let received = device.read_timeout(&mut in_buf, self.timeout_ms)?;
            if received < 4 {
                return Err(Error::InvalidReport(received));
            }
            let status = in_buf[0];
            if status & i2c::REQUEST_ERROR != 0 {
                return Err(Error::I2cRequestError { address });
            }
            if status & i2c::NAK_RECEIVED != 0 {
                return Err(Error::I2cNack { address });
            }
            if status & i2c::ARBITRATION_LOST != 0 {
                return Err(Error::I2cArbitrationLost { address });
            }
            if status & i2c::TIMEOUT != 0 {
                return Err(Error::I2cTimeout { address });
            }
            if status & 0x0F != 0 {
                return Err(Error::I2cUnknownError {
                    address,
                    flags: status,
                });
            }
            Ok(())
        }
    }

    impl I2cBus for Xr2280xI2c {
        fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
            self.write(address, &[register, value])
        }

        /// Releases the HID interface. Later transfers fail with
        /// [`Error::DeviceNotFound`]; closing twice is a no-op.
        fn close(&mut self) -> Result<()> {
            if self.device.take().is_some() {
                debug!("Closed XR2280x I2C interface");
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct EdgeDevice {
        device: HidDevice,
        gpio_count: u8,
        pwm_in_use: Cell<[bool; 2]>,
    }

    impl EdgeDevice {
        fn group_reg(reg0: u16, pin: u8) -> u16 {
            if pin < 16 {
                reg0
            } else {
                reg0 + edge::GROUP1_OFFSET
            }
        }

        fn mask(pin: u8) -> u16 {
            1 << (pin % 16)
        }

        fn update_bit(&self, reg0: u16, pin: u8, set: bool) -> Result<()> {
            let reg = Self::group_reg(reg0, pin);
            let current = read_hid_register(&self.device, reg)?;
            let new_val = if set {
                current | Self::mask(pin)
            } else {
                current & !Self::mask(pin)
            };
            if new_val != current {
                write_hid_register(&self.device, reg, new_val)?;
            }
            Ok(())
        }

        fn check_pin(&self, pin: &PinDescriptor) -> Result<u8> {
            match u8::try_from(pin.number()) {
                Ok(n) if n < self.gpio_count => Ok(n),
                _ => Err(Error::PinArgumentOutOfRange {
                    pin: pin.number(),
                    message: format!("this model exposes {} EDGE pins", self.gpio_count),
                }),
            }
        }
    }

    /// The bridge's EDGE controller, usable as a [`PinDriver`].
    pub struct Xr2280xEdge {
        edge: Rc<EdgeDevice>,
    }

    impl Xr2280xEdge {
        /// Opens the first EDGE interface with the default VID/PID.
        /// **Warning:** Ambiguous if multiple devices exist.
        pub fn open(hid_api: &HidApi) -> Result<Self> {
            Self::open_by_vid_pid(hid_api, EXAR_VID, XR2280X_EDGE_PID)
        }

        pub fn open_by_vid_pid(hid_api: &HidApi, vid: u16, pid: u16) -> Result<Self> {
            let device = hid_api.open(vid, pid).map_err(|e| {
                debug!("Failed to open EDGE interface {:04X}:{:04X}: {}", vid, pid, e);
                Error::DeviceNotFound
            })?;
            debug!("Opened XR2280x EDGE interface: VID={:04X}, PID={:04X}", vid, pid);
            Self::from_device(device)
        }

        /// Wraps an opened EDGE interface, detecting 8 vs 32 GPIO models.
        pub fn from_device(device: HidDevice) -> Result<Self> {
            let gpio_count = match read_hid_register(&device, edge::REG_FUNC_SEL_1) {
                Ok(_) => 32,
                Err(Error::FeatureReportError { .. }) => 8,
                Err(e) => {
                    warn!("Error during capability detection: {}", e);
                    return Err(e);
                }
            };
            debug!("Detected support for {} GPIOs", gpio_count);
            Ok(Self {
                edge: Rc::new(EdgeDevice {
                    device,
                    gpio_count,
                    pwm_in_use: Cell::new([false; 2]),
                }),
            })
        }

        pub fn gpio_count(&self) -> u8 {
            self.edge.gpio_count
        }

        /// Pin table matching the detected model.
        pub fn registry(&self) -> PinRegistry {
            edge_pin_registry(self.edge.gpio_count)
        }
    }

    impl PinDriver for Xr2280xEdge {
        type Digital = XrDigitalPin;
        type Pwm = XrPwmPin;

        fn open_digital(&mut self, pin: &PinDescriptor) -> Result<XrDigitalPin> {
            let n = self.edge.check_pin(pin)?;
            debug!("Assigning E{} to EDGE", n);
            self.edge.update_bit(edge::REG_FUNC_SEL_0, n, true)?;
            Ok(XrDigitalPin {
                edge: Rc::clone(&self.edge),
                pin: n,
            })
        }

        fn open_pwm(&mut self, pin: &PinDescriptor) -> Result<XrPwmPin> {
            let n = self.edge.check_pin(pin)?;
            let mut in_use = self.edge.pwm_in_use.get();
            let channel = in_use.iter().position(|busy| !busy).ok_or_else(|| {
                Error::UnsupportedFeature("both PWM channels are already in use".to_string())
            })?;

            let ctrl = if channel == 0 {
                edge::REG_PWM0_CTRL
            } else {
                edge::REG_PWM1_CTRL
            };
            self.edge.update_bit(edge::REG_FUNC_SEL_0, n, true)?;
            self.edge.update_bit(edge::REG_DIR_0, n, true)?;
            let current = read_hid_register(&self.edge.device, ctrl)?;
            write_hid_register(
                &self.edge.device,
                ctrl,
                (current & !edge::PWM_PIN_MASK) | u16::from(n),
            )?;
            debug!("Assigned PWM{} to E{}", channel, n);

            in_use[channel] = true;
            self.edge.pwm_in_use.set(in_use);
            Ok(XrPwmPin {
                edge: Rc::clone(&self.edge),
                pin: n,
                channel,
            })
        }
    }

    /// An EDGE pin in digital mode.
    #[derive(Debug)]
    pub struct XrDigitalPin {
        edge: Rc<EdgeDevice>,
        pin: u8,
    }

    impl PinIo for XrDigitalPin {
        fn number(&self) -> u32 {
            u32::from(self.pin)
        }

        fn close(&mut self) -> Result<()> {
            debug!("Returning E{} to input", self.pin);
            self.set_direction(GpioDirection::Input)
        }
    }

    impl DigitalPin for XrDigitalPin {
        fn set_direction(&mut self, direction: GpioDirection) -> Result<()> {
            trace!("Setting E{} direction: {:?}", self.pin, direction);
            self.edge.update_bit(
                edge::REG_DIR_0,
                self.pin,
                direction == GpioDirection::Output,
            )
        }

        fn write(&mut self, level: GpioLevel) -> Result<()> {
            let reg0 = match level {
                GpioLevel::High => edge::REG_SET_0,
                GpioLevel::Low => edge::REG_CLEAR_0,
            };
            let reg = EdgeDevice::group_reg(reg0, self.pin);
            trace!("Setting E{} {:?} (reg 0x{:04X})", self.pin, level, reg);
            write_hid_register(&self.edge.device, reg, EdgeDevice::mask(self.pin))
        }

        fn read(&mut self) -> Result<GpioLevel> {
            let reg = EdgeDevice::group_reg(edge::REG_STATE_0, self.pin);
            let value = read_hid_register(&self.edge.device, reg)?;
            Ok(if value & EdgeDevice::mask(self.pin) != 0 {
                GpioLevel::High
            } else {
                GpioLevel::Low
            })
        }
    }

    /// An EDGE pin driven by one of the two PWM channels.
    #[derive(Debug)]
    pub struct XrPwmPin {
        edge: Rc<EdgeDevice>,
        pin: u8,
        channel: usize,
    }

    impl XrPwmPin {
        /// Index (0 or 1) of the PWM channel driving this pin.
        pub fn channel(&self) -> usize {
            self.channel
        }

        fn regs(&self) -> (u16, u16, u16) {
            if self.channel == 0 {
                (edge::REG_PWM0_CTRL, edge::REG_PWM0_HIGH, edge::REG_PWM0_LOW)
            } else {
                (edge::REG_PWM1_CTRL, edge::REG_PWM1_HIGH, edge::REG_PWM1_LOW)
            }
        }
    }

    impl PinIo for XrPwmPin {
        fn number(&self) -> u32 {
            u32::from(self.pin)
        }

        fn close(&mut self) -> Result<()> {
            self.set_enabled(false)?;
            self.edge.update_bit(edge::REG_DIR_0, self.pin, false)?;
            let mut in_use = self.edge.pwm_in_use.get();
            in_use[self.channel] = false;
            self.edge.pwm_in_use.set(in_use);
            debug!("Released PWM{} from E{}", self.channel, self.pin);
            Ok(())
        }
    }

    impl PwmPin for XrPwmPin {
        fn set_periods_ns(&mut self, high_ns: u64, low_ns: u64) -> Result<()> {
            let high_units = ns_to_pwm_units(high_ns)?;
            let low_units = ns_to_pwm_units(low_ns)?;
            let (_, reg_high, reg_low) = self.regs();
            debug!(
                "Setting PWM{} periods: high={} units, low={} units",
                self.channel, high_units, low_units
            );
            write_hid_register(&self.edge.device, reg_high, high_units)?;
            write_hid_register(&self.edge.device, reg_low, low_units)
        }

        fn set_enabled(&mut self, enabled: bool) -> Result<()> {
            let (ctrl, _, _) = self.regs();
            let (enable_bits, command) = if enabled {
                (edge::PWM_ENABLE_MASK, edge::PWM_CMD_FREE_RUN)
            } else {
                (0, edge::PWM_CMD_IDLE)
            };
            let current = read_hid_register(&self.edge.device, ctrl)?;
            let new_value = (current & !(edge::PWM_ENABLE_MASK | edge::PWM_CMD_MASK))
                | enable_bits
                | (command << edge::PWM_CMD_SHIFT);
            debug!(
                "Setting PWM{}: enable={} (ctrl=0x{:04X})",
                self.channel, enabled, new_value
            );
            write_hid_register(&self.edge.device, ctrl, new_value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinKey;
    use approx::assert_relative_eq;

    #[test]
    fn test_edge_registry() {
        let small = edge_pin_registry(8);
        assert_eq!(small.len(), 8);
        assert!(small.lookup(&PinKey::from("E8")).is_none());

        let large = edge_pin_registry(32);
        let pin = large.lookup(&PinKey::from("GPIO17")).expect("GPIO17 present");
        assert_eq!(pin.number(), 17);
        assert!(pin.caps().contains(Capabilities::NORMAL | Capabilities::PWM));
        assert_eq!(large.lookup(&PinKey::from(31)).map(|p| p.aliases()[0].as_str()), Some("E31"));
    }

    #[test]
    fn test_pwm_unit_conversion() {
        assert_relative_eq!(pwm_units_to_ns(1) as f64, PWM_UNIT_TIME_NS, epsilon = 1.0);
        assert_eq!(ns_to_pwm_units(PWM_UNIT_TIME_NS.round() as u64).ok(), Some(1));

        assert!(ns_to_pwm_units(0).is_err());
        // Less than half a unit rounds to zero units
        assert!(ns_to_pwm_units((PWM_UNIT_TIME_NS * 0.4).round() as u64).is_err());
        assert_eq!(ns_to_pwm_units((PWM_UNIT_TIME_NS * 0.6).round() as u64).ok(), Some(1));

        let ns_at_max = pwm_units_to_ns(PWM_MAX_UNITS);
        assert_eq!(ns_to_pwm_units(ns_at_max).ok(), Some(PWM_MAX_UNITS));
        let ns_above_max = (ns_at_max as f64 + PWM_UNIT_TIME_NS * 0.6).round() as u64;
        assert!(ns_to_pwm_units(ns_above_max).is_err());

        // 1 ms is ~3750 units
        let units = ns_to_pwm_units(1_000_000).expect("1 ms in range");
        assert_eq!(units, 3750);
        assert_relative_eq!(
            pwm_units_to_ns(units) as f64,
            1_000_000.0,
            epsilon = PWM_UNIT_TIME_NS
        );
    }
}
