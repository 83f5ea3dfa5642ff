use hd44780_expander::xr2280x::Xr2280xI2c;
use hd44780_expander::{CharLcd, Mode, PinMap, Result, RowAddress};
use hidapi::HidApi;
use std::{thread, time::Duration};

// MCP23017 with A0-A2 tied low, as shipped on the Adafruit plate.
const LCD_ADDRESS: u8 = 0x20;

fn main() -> Result<()> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    println!("Opening first XR2280x I2C interface...");
    let bus = Xr2280xI2c::open(&hid_api)?;
    bus.set_speed_khz(400)?;

    let mut lcd = CharLcd::new_i2c(
        bus,
        LCD_ADDRESS,
        PinMap::ADAFRUIT_PLATE,
        RowAddress::COLS_16,
        &[Mode::CursorOn, Mode::BlinkOn],
    )?;
    lcd.backlight_on()?;
    lcd.clear()?;

    // Custom glyph in CGRAM slot 0
    lcd.create_char(0, [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00])?;
    lcd.set_cursor(0, 0)?;
    lcd.print("Hello, world ")?;
    lcd.write_char(0)?;
    lcd.set_cursor(0, 1)?;
    lcd.print("hd44780-expander")?;
    thread::sleep(Duration::from_secs(2));

    for _ in 0..4 {
        lcd.shift_left()?;
        thread::sleep(Duration::from_millis(300));
    }
    lcd.home()?;
    lcd.set_mode(&[Mode::CursorOff, Mode::BlinkOff])?;
    thread::sleep(Duration::from_secs(2));

    lcd.display_off()?;
    lcd.backlight_off()?;
    lcd.close()
}
