use hd44780_expander::xr2280x::Xr2280xEdge;
use hd44780_expander::{DigitalPin, GpioDirection, GpioLevel, PinArbiter, Result};
use hidapi::HidApi;
use std::{thread, time::Duration};

// Any alias from the EDGE pin table works: "E3", "GPIO3" or the number 3.
const BLINK_PIN: &str = "E3";

fn main() -> Result<()> {
    env_logger::init();
    let hid_api = HidApi::new()?;
    println!("Opening first XR2280x EDGE interface...");
    let edge = Xr2280xEdge::open(&hid_api)?;
    println!("Interface opened ({} GPIOs).", edge.gpio_count());

    let mut pins = PinArbiter::new(edge.registry(), edge);
    let pin = pins.acquire_digital(BLINK_PIN)?;
    pin.set_direction(GpioDirection::Output)?;

    println!("Blinking {} ten times", BLINK_PIN);
    for _ in 0..10 {
        pin.write(GpioLevel::High)?;
        thread::sleep(Duration::from_millis(250));
        pin.write(GpioLevel::Low)?;
        thread::sleep(Duration::from_millis(250));
    }

    pins.close_all()?;
    println!("Done.");
    Ok(())
}
