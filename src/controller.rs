//! HD44780 command layer: mode bitfields and the public display API.
//!
//! The controller cannot be read back, so [`ControllerState`] mirrors the
//! entry, display and function registers. Every change is followed by
//! re-sending the whole affected register byte.

use crate::bus::I2cBus;
use crate::connection::{Connection, I2cConnection, PinMap};
use crate::consts::{self, display, entry, function, shift};
use crate::error::Result;
use log::debug;
use std::thread;

/// DDRAM address of the first column of each row (up to 4 rows).
///
/// Pick the table matching the column count of the panel; it cannot be
/// derived from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAddress(pub [u8; 4]);

impl RowAddress {
    /// 16-column panels.
    pub const COLS_16: RowAddress = RowAddress([0x00, 0x40, 0x10, 0x50]);
    /// 20-column panels.
    pub const COLS_20: RowAddress = RowAddress([0x00, 0x40, 0x14, 0x54]);

    /// Base address for `row`. Rows past the table clamp to the last one.
    #[inline]
    pub fn offset(&self, row: usize) -> u8 {
        self.0[row.min(self.0.len() - 1)]
    }
}

/// One setting of the entry, display or function register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    EntryIncrement,
    EntryDecrement,
    EntryShiftOn,
    EntryShiftOff,
    DisplayOn,
    DisplayOff,
    CursorOn,
    CursorOff,
    BlinkOn,
    BlinkOff,
    FourBitMode,
    EightBitMode,
    OneLine,
    TwoLine,
    Dots5x8,
    Dots5x10,
}

/// Modes applied by [`CharLcd::new`] before any caller-supplied ones.
pub const DEFAULT_MODES: [Mode; 8] = [
    Mode::FourBitMode,
    Mode::TwoLine,
    Mode::Dots5x8,
    Mode::EntryIncrement,
    Mode::EntryShiftOff,
    Mode::DisplayOn,
    Mode::CursorOff,
    Mode::BlinkOff,
];

impl Mode {
    /// Sets or clears this mode's flag in `state`.
    pub fn apply(self, state: &mut ControllerState) {
        fn set(field: &mut u8, flag: u8, on: bool) {
            if on {
                *field |= flag;
            } else {
                *field &= !flag;
            }
        }
        match self {
            Mode::EntryIncrement => set(&mut state.entry, entry::INCREMENT, true),
            Mode::EntryDecrement => set(&mut state.entry, entry::INCREMENT, false),
            Mode::EntryShiftOn => set(&mut state.entry, entry::SHIFT_ON, true),
            Mode::EntryShiftOff => set(&mut state.entry, entry::SHIFT_ON, false),
            Mode::DisplayOn => set(&mut state.display, display::DISPLAY_ON, true),
            Mode::DisplayOff => set(&mut state.display, display::DISPLAY_ON, false),
            Mode::CursorOn => set(&mut state.display, display::CURSOR_ON, true),
            Mode::CursorOff => set(&mut state.display, display::CURSOR_ON, false),
            Mode::BlinkOn => set(&mut state.display, display::BLINK_ON, true),
            Mode::BlinkOff => set(&mut state.display, display::BLINK_ON, false),
            Mode::FourBitMode => set(&mut state.function, function::EIGHT_BIT, false),
            Mode::EightBitMode => set(&mut state.function, function::EIGHT_BIT, true),
            Mode::OneLine => set(&mut state.function, function::TWO_LINE, false),
            Mode::TwoLine => set(&mut state.function, function::TWO_LINE, true),
            Mode::Dots5x8 => set(&mut state.function, function::DOTS_5X10, false),
            Mode::Dots5x10 => set(&mut state.function, function::DOTS_5X10, true),
        }
    }
}

/// Mirror of the controller's entry, display and function registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerState {
    entry: u8,
    display: u8,
    function: u8,
}

impl ControllerState {
    pub fn apply(&mut self, modes: &[Mode]) {
        for mode in modes {
            mode.apply(self);
        }
    }

    /// Entry mode set instruction for the current state.
    pub fn entry_instruction(&self) -> u8 {
        entry::SET | self.entry
    }

    /// Display control instruction for the current state.
    pub fn display_instruction(&self) -> u8 {
        display::SET | self.display
    }

    /// Function set instruction for the current state.
    pub fn function_instruction(&self) -> u8 {
        function::SET | self.function
    }

    pub fn entry_increment_enabled(&self) -> bool {
        self.entry & entry::INCREMENT != 0
    }
    pub fn entry_shift_enabled(&self) -> bool {
        self.entry & entry::SHIFT_ON != 0
    }
    pub fn display_enabled(&self) -> bool {
        self.display & display::DISPLAY_ON != 0
    }
    pub fn cursor_enabled(&self) -> bool {
        self.display & display::CURSOR_ON != 0
    }
    pub fn blink_enabled(&self) -> bool {
        self.display & display::BLINK_ON != 0
    }
    /// `false` means 4-bit bus mode.
    pub fn eight_bit_mode_enabled(&self) -> bool {
        self.function & function::EIGHT_BIT != 0
    }
    /// `false` means 1-line display mode.
    pub fn two_line_enabled(&self) -> bool {
        self.function & function::TWO_LINE != 0
    }
    pub fn dots_5x10_enabled(&self) -> bool {
        self.function & function::DOTS_5X10 != 0
    }
}

/// An HD44780-compatible character LCD.
///
/// **Note:** Not thread-safe in any useful sense: concurrent callers must
/// serialize access themselves. A failed write leaves the tracked state
/// ahead of the hardware; there is no rollback.
#[derive(Debug)]
pub struct CharLcd<C: Connection> {
    conn: C,
    state: ControllerState,
    row_addr: RowAddress,
}

impl<B: I2cBus> CharLcd<I2cConnection<B>> {
    /// Configures the expander at `address` and initializes the display on it.
    pub fn new_i2c(
        bus: B,
        address: u8,
        pin_map: PinMap,
        row_addr: RowAddress,
        modes: &[Mode],
    ) -> Result<Self> {
        Self::new(I2cConnection::new(bus, address, pin_map)?, row_addr, modes)
    }
}

impl<C: Connection> CharLcd<C> {
    /// Switches the controller to 4-bit mode and applies [`DEFAULT_MODES`]
    /// followed by `modes`.
    pub fn new(conn: C, row_addr: RowAddress, modes: &[Mode]) -> Result<Self> {
        let mut lcd = Self {
            conn,
            state: ControllerState::default(),
            row_addr,
        };
        debug!("Initializing display");
        lcd.write_instruction(consts::INIT)?;
        debug!("Initializing display in 4-bit mode");
        lcd.write_instruction(consts::INIT_4BIT)?;
        lcd.state.apply(&DEFAULT_MODES);
        lcd.set_mode(modes)?;
        Ok(lcd)
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn row_address(&self) -> RowAddress {
        self.row_addr
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_connection(self) -> C {
        self.conn
    }

    /// Applies `modes`, then re-sends display, function and entry bytes
    /// (in that order) whether or not they changed.
    pub fn set_mode(&mut self, modes: &[Mode]) -> Result<()> {
        self.state.apply(modes);
        self.write_instruction(self.state.display_instruction())?;
        self.write_instruction(self.state.function_instruction())?;
        self.write_instruction(self.state.entry_instruction())
    }

    fn set_display_mode(&mut self, mode: Mode) -> Result<()> {
        mode.apply(&mut self.state);
        self.write_instruction(self.state.display_instruction())
    }

    pub fn display_on(&mut self) -> Result<()> {
        self.set_display_mode(Mode::DisplayOn)
    }
    pub fn display_off(&mut self) -> Result<()> {
        self.set_display_mode(Mode::DisplayOff)
    }
    pub fn cursor_on(&mut self) -> Result<()> {
        self.set_display_mode(Mode::CursorOn)
    }
    pub fn cursor_off(&mut self) -> Result<()> {
        self.set_display_mode(Mode::CursorOff)
    }
    pub fn blink_on(&mut self) -> Result<()> {
        self.set_display_mode(Mode::BlinkOn)
    }
    pub fn blink_off(&mut self) -> Result<()> {
        self.set_display_mode(Mode::BlinkOff)
    }

    /// Shifts the cursor and all characters one position left.
    pub fn shift_left(&mut self) -> Result<()> {
        self.write_instruction(consts::CURSOR_SHIFT | shift::DISPLAY_MOVE | shift::MOVE_LEFT)
    }

    /// Shifts the cursor and all characters one position right.
    pub fn shift_right(&mut self) -> Result<()> {
        self.write_instruction(consts::CURSOR_SHIFT | shift::DISPLAY_MOVE | shift::MOVE_RIGHT)
    }

    /// Returns the cursor and any display shift to the home position.
    ///
    /// The 1.52 ms execution wait is skipped when the write fails.
    pub fn home(&mut self) -> Result<()> {
        self.write_instruction(consts::RETURN_HOME)?;
        thread::sleep(consts::CLEAR_DELAY);
        Ok(())
    }

    /// Clears the display and homes the cursor.
    ///
    /// The controller resets its entry mode on clear, so the tracked modes
    /// are re-sent afterwards.
    pub fn clear(&mut self) -> Result<()> {
        self.write_instruction(consts::CLEAR_DISPLAY)?;
        thread::sleep(consts::CLEAR_DELAY);
        self.set_mode(&[])
    }

    /// Moves the cursor to `col` on `row`. Rows past 3 clamp to row 3.
    pub fn set_cursor(&mut self, col: u8, row: usize) -> Result<()> {
        self.set_ddram_addr(col.wrapping_add(self.row_addr.offset(row)))
    }

    /// Moves the cursor to a raw DDRAM address.
    pub fn set_ddram_addr(&mut self, addr: u8) -> Result<()> {
        self.write_instruction(consts::SET_DDRAM_ADDR | addr)
    }

    /// Stores a 5x8 glyph in CGRAM slot `slot` (0-7); print it with
    /// `write_char(slot)`.
    ///
    /// Leaves the address counter in CGRAM: call [`set_cursor`](Self::set_cursor)
    /// before writing text again.
    pub fn create_char(&mut self, slot: u8, pattern: [u8; 8]) -> Result<()> {
        self.write_instruction(consts::SET_CGRAM_ADDR | ((slot & 0x07) << 3))?;
        for row in pattern {
            self.write_char(row & 0x1F)?;
        }
        Ok(())
    }

    /// Writes the bytes of `text` at the cursor.
    pub fn print(&mut self, text: &str) -> Result<()> {
        text.bytes().try_for_each(|b| self.write_char(b))
    }

    /// Writes a byte in data mode (register select high).
    pub fn write_char(&mut self, value: u8) -> Result<()> {
        self.conn.write(true, value)
    }

    /// Writes a byte in instruction mode (register select low).
    pub fn write_instruction(&mut self, value: u8) -> Result<()> {
        self.conn.write(false, value)
    }

    pub fn backlight_on(&mut self) -> Result<()> {
        self.conn.backlight_on()
    }

    pub fn backlight_off(&mut self) -> Result<()> {
        self.conn.backlight_off()
    }

    /// Closes the underlying connection.
    pub fn close(&mut self) -> Result<()> {
        self.conn.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_modes_bits() {
        let mut state = ControllerState::default();
        state.apply(&DEFAULT_MODES);
        assert_eq!(state.function_instruction(), 0x28);
        assert_eq!(state.display_instruction(), 0x0C);
        assert_eq!(state.entry_instruction(), 0x06);
    }

    #[test]
    fn test_mode_pairs_are_inverse() {
        let mut state = ControllerState::default();
        state.apply(&[Mode::Dots5x10, Mode::EightBitMode, Mode::BlinkOn]);
        assert!(state.dots_5x10_enabled());
        assert!(state.eight_bit_mode_enabled());
        assert!(state.blink_enabled());
        state.apply(&[Mode::Dots5x8, Mode::FourBitMode, Mode::BlinkOff]);
        assert_eq!(state, ControllerState::default());
    }

    #[test]
    fn test_last_setter_wins_within_field() {
        let mut state = ControllerState::default();
        state.apply(&[Mode::CursorOn, Mode::DisplayOn, Mode::CursorOff]);
        assert!(!state.cursor_enabled());
        assert!(state.display_enabled());
        // Setters touching different flags commute
        let mut other = ControllerState::default();
        other.apply(&[Mode::DisplayOn, Mode::CursorOff]);
        assert_eq!(state, other);
    }

    #[test]
    fn test_row_offset_clamps() {
        assert_eq!(RowAddress::COLS_20.offset(2), 0x14);
        assert_eq!(RowAddress::COLS_20.offset(3), 0x54);
        assert_eq!(RowAddress::COLS_20.offset(9), 0x54);
        assert_eq!(RowAddress::COLS_16.offset(usize::MAX), 0x50);
    }
}
