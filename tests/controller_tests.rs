//! Tests for the HD44780 command layer.
//!
//! Bus traffic is captured and decoded back into (register_select, byte)
//! pairs, so each test can talk in terms of instructions.

use hd44780_expander::timing::CLEAR_DELAY;
use hd44780_expander::{
    CharLcd, Connection, Error, I2cBus, I2cConnection, Mode, PinMap, Result, RowAddress,
};
use std::time::Instant;

const ADDR: u8 = 0x20;
const MAP: PinMap = PinMap::ADAFRUIT_PLATE;

#[derive(Debug, Default)]
struct RecordingBus {
    writes: Vec<(u8, u8, u8)>,
    fail: bool,
}

impl I2cBus for RecordingBus {
    fn write_byte_to_register(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        if self.fail {
            return Err(Error::Io(std::io::Error::other("bus unplugged")));
        }
        self.writes.push((address, register, value));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Connection that records bytes directly, skipping the nibble encoding.
#[derive(Debug, Default)]
struct ByteLog {
    bytes: Vec<(bool, u8)>,
    times: Vec<Instant>,
    backlight: Option<bool>,
}

impl Connection for ByteLog {
    fn write(&mut self, register_select: bool, data: u8) -> Result<()> {
        self.bytes.push((register_select, data));
        self.times.push(Instant::now());
        Ok(())
    }
    fn backlight_on(&mut self) -> Result<()> {
        self.backlight = Some(true);
        Ok(())
    }
    fn backlight_off(&mut self) -> Result<()> {
        self.backlight = Some(false);
        Ok(())
    }
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

fn nibble_from_frame(frame: u8) -> u8 {
    ((frame >> MAP.d4) & 1)
        | (((frame >> MAP.d5) & 1) << 1)
        | (((frame >> MAP.d6) & 1) << 2)
        | (((frame >> MAP.d7) & 1) << 3)
}

/// Reassembles bytes from the strobed GPIOB writes (6 per byte).
fn decode(writes: &[(u8, u8, u8)]) -> Vec<(bool, u8)> {
    writes
        .iter()
        .filter(|w| w.1 == 0x13)
        .collect::<Vec<_>>()
        .chunks(6)
        .map(|byte| {
            let high = byte[1].2;
            let low = byte[4].2;
            let rs = high & (1 << MAP.rs) != 0;
            (rs, (nibble_from_frame(high) << 4) | nibble_from_frame(low))
        })
        .collect()
}

fn instructions(bytes: &[(bool, u8)]) -> Vec<u8> {
    bytes.iter().filter(|b| !b.0).map(|b| b.1).collect()
}

fn new_lcd(modes: &[Mode]) -> CharLcd<ByteLog> {
    let mut lcd = CharLcd::new(ByteLog::default(), RowAddress::COLS_20, modes).unwrap();
    lcd.connection_mut().bytes.clear();
    lcd.connection_mut().times.clear();
    lcd
}

#[test]
fn test_init_sequence_over_i2c() {
    let lcd = CharLcd::new_i2c(
        RecordingBus::default(),
        ADDR,
        MAP,
        RowAddress::COLS_16,
        &[],
    )
    .unwrap();
    let bytes = decode(&lcd.connection().bus().writes);
    assert_eq!(
        bytes,
        vec![
            (false, 0x33),
            (false, 0x32),
            (false, 0x0C), // display on, cursor off, blink off
            (false, 0x28), // 4-bit, 2 lines, 5x8
            (false, 0x06), // increment, no shift
        ]
    );
}

#[test]
fn test_constructor_modes_override_defaults() {
    let lcd = CharLcd::new(
        ByteLog::default(),
        RowAddress::COLS_16,
        &[Mode::CursorOn, Mode::BlinkOn, Mode::OneLine],
    )
    .unwrap();
    let state = lcd.state();
    assert!(state.cursor_enabled());
    assert!(state.blink_enabled());
    assert!(!state.two_line_enabled());
    assert!(state.display_enabled());
    assert_eq!(
        instructions(&lcd.connection().bytes)[2..],
        [0x0F, 0x20, 0x06]
    );
}

#[test]
fn test_set_mode_resends_all_three_in_order() {
    let mut lcd = new_lcd(&[]);
    lcd.set_mode(&[Mode::EntryShiftOn, Mode::Dots5x10]).unwrap();
    assert_eq!(instructions(&lcd.connection().bytes), vec![0x0C, 0x2C, 0x07]);
    assert!(lcd.state().entry_shift_enabled());
    assert!(lcd.state().dots_5x10_enabled());

    lcd.connection_mut().bytes.clear();
    lcd.set_mode(&[]).unwrap();
    assert_eq!(instructions(&lcd.connection().bytes), vec![0x0C, 0x2C, 0x07]);
}

#[test]
fn test_set_mode_state_matches_setters() {
    let combos: &[&[Mode]] = &[
        &[Mode::DisplayOff, Mode::CursorOn],
        &[Mode::EntryDecrement, Mode::EntryShiftOn],
        &[Mode::EightBitMode, Mode::OneLine, Mode::Dots5x10],
        &[Mode::BlinkOn, Mode::BlinkOff, Mode::BlinkOn],
    ];
    for modes in combos {
        let mut lcd = new_lcd(&[]);
        lcd.set_mode(modes).unwrap();
        let mut reversed_lcd = new_lcd(&[]);
        let reversed: Vec<Mode> = modes.iter().rev().copied().collect();
        reversed_lcd.set_mode(&reversed).unwrap();

        let state = lcd.state();
        for mode in modes.iter() {
            match mode {
                Mode::DisplayOff => assert!(!state.display_enabled()),
                Mode::CursorOn => assert!(state.cursor_enabled()),
                Mode::EntryDecrement => assert!(!state.entry_increment_enabled()),
                Mode::EntryShiftOn => assert!(state.entry_shift_enabled()),
                Mode::EightBitMode => assert!(state.eight_bit_mode_enabled()),
                Mode::OneLine => assert!(!state.two_line_enabled()),
                Mode::Dots5x10 => assert!(state.dots_5x10_enabled()),
                _ => {}
            }
        }
        // Setters on distinct flags give the same state in any order
        assert_eq!(lcd.state(), reversed_lcd.state(), "modes {:?}", modes);
    }
}

#[test]
fn test_clear_restores_modes() {
    let mut lcd = new_lcd(&[Mode::CursorOn, Mode::EntryShiftOn]);
    let before = *lcd.state();
    lcd.clear().unwrap();
    assert_eq!(
        instructions(&lcd.connection().bytes),
        vec![
            0x01,
            before.display_instruction(),
            before.function_instruction(),
            before.entry_instruction()
        ]
    );
    assert_eq!(*lcd.state(), before);
}

#[test]
fn test_home() {
    let mut lcd = new_lcd(&[]);
    lcd.home().unwrap();
    assert_eq!(lcd.connection().bytes, vec![(false, 0x02)]);
}

#[test]
fn test_home_waits_for_execution() {
    let mut lcd = new_lcd(&[]);
    lcd.home().unwrap();
    let returned = Instant::now();
    let sent = lcd.connection().times[0];
    assert!(
        returned.duration_since(sent) >= CLEAR_DELAY,
        "home returned {:?} after the instruction",
        returned.duration_since(sent)
    );
}

#[test]
fn test_clear_waits_before_restoring_modes() {
    let mut lcd = new_lcd(&[]);
    lcd.clear().unwrap();
    let times = &lcd.connection().times;
    assert_eq!(times.len(), 4);
    let gap = times[1].duration_since(times[0]);
    assert!(gap >= CLEAR_DELAY, "modes re-sent {:?} after clear", gap);
}

#[test]
fn test_shift_does_not_touch_state() {
    let mut lcd = new_lcd(&[]);
    let before = *lcd.state();
    lcd.shift_left().unwrap();
    lcd.shift_right().unwrap();
    assert_eq!(instructions(&lcd.connection().bytes), vec![0x18, 0x1C]);
    assert_eq!(*lcd.state(), before);
}

#[test]
fn test_set_cursor_addresses() {
    let mut lcd = new_lcd(&[]);
    lcd.set_cursor(0, 0).unwrap();
    lcd.set_cursor(5, 1).unwrap();
    lcd.set_cursor(3, 2).unwrap();
    lcd.set_cursor(19, 3).unwrap();
    assert_eq!(
        instructions(&lcd.connection().bytes),
        vec![0x80, 0x80 | 0x45, 0x80 | 0x17, 0x80 | 0x67]
    );
}

#[test]
fn test_set_cursor_clamps_row() {
    let mut clamped = new_lcd(&[]);
    clamped.set_cursor(7, 4).unwrap();
    clamped.set_cursor(7, 100).unwrap();

    let mut last_row = new_lcd(&[]);
    last_row.set_cursor(7, 3).unwrap();
    last_row.set_cursor(7, 3).unwrap();

    assert_eq!(clamped.connection().bytes, last_row.connection().bytes);
}

#[test]
fn test_display_toggles_send_display_byte_only() {
    let mut lcd = new_lcd(&[]);
    lcd.cursor_on().unwrap();
    lcd.blink_on().unwrap();
    lcd.display_off().unwrap();
    lcd.display_on().unwrap();
    lcd.blink_off().unwrap();
    lcd.cursor_off().unwrap();
    assert_eq!(
        instructions(&lcd.connection().bytes),
        vec![0x0E, 0x0F, 0x0B, 0x0F, 0x0E, 0x0C]
    );
}

#[test]
fn test_write_char_and_print_use_data_mode() {
    let mut lcd = new_lcd(&[]);
    lcd.write_char(b'A').unwrap();
    lcd.print("hi").unwrap();
    lcd.write_instruction(0x01).unwrap();
    assert_eq!(
        lcd.connection().bytes,
        vec![(true, b'A'), (true, b'h'), (true, b'i'), (false, 0x01)]
    );
}

#[test]
fn test_create_char() {
    let mut lcd = new_lcd(&[]);
    let heart = [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0xFF];
    lcd.create_char(2, heart).unwrap();
    let bytes = &lcd.connection().bytes;
    assert_eq!(bytes[0], (false, 0x40 | (2 << 3)));
    let rows: Vec<u8> = bytes[1..].iter().map(|b| b.1).collect();
    assert_eq!(rows, vec![0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x1F]);
    assert!(bytes[1..].iter().all(|b| b.0));
}

#[test]
fn test_backlight_passthrough() {
    let mut lcd = new_lcd(&[]);
    lcd.backlight_on().unwrap();
    assert_eq!(lcd.connection().backlight, Some(true));
    lcd.backlight_off().unwrap();
    assert_eq!(lcd.connection().backlight, Some(false));
}

#[test]
fn test_failure_leaves_state_ahead_of_hardware() {
    let mut lcd = CharLcd::new_i2c(
        RecordingBus::default(),
        ADDR,
        MAP,
        RowAddress::COLS_16,
        &[],
    )
    .unwrap();
    lcd.connection_mut().bus_mut().fail = true;
    let result = lcd.set_mode(&[Mode::CursorOn]);
    assert!(matches!(result, Err(Error::Io(_))));
    // No rollback: the tracked state already has the cursor on
    assert!(lcd.state().cursor_enabled());
}

#[test]
fn test_i2c_connection_roundtrip_decode() {
    let mut lcd = CharLcd::new_i2c(
        RecordingBus::default(),
        ADDR,
        MAP,
        RowAddress::COLS_16,
        &[],
    )
    .unwrap();
    lcd.connection_mut().bus_mut().writes.clear();
    lcd.set_cursor(2, 1).unwrap();
    lcd.print("Ok").unwrap();
    let conn: &I2cConnection<RecordingBus> = lcd.connection();
    assert_eq!(
        decode(&conn.bus().writes),
        vec![(false, 0xC2), (true, b'O'), (true, b'k')]
    );
}
