//! HD44780 instruction set, protocol timing and expander register addresses.

use std::time::Duration;

// --- Timing ---
/// Wait before each of the three strobe writes of a nibble.
pub const PULSE_DELAY: Duration = Duration::from_micros(1);
/// Settle time after both nibbles of a byte have been latched.
pub const WRITE_DELAY: Duration = Duration::from_micros(37);
/// Execution time of the clear-display and return-home instructions.
pub const CLEAR_DELAY: Duration = Duration::from_micros(1520);

// --- Initialization ---
pub const INIT: u8 = 0x33; // 0011_0011
pub const INIT_4BIT: u8 = 0x32; // 0011_0010

// --- Instructions ---
pub const CLEAR_DISPLAY: u8 = 0x01;
pub const RETURN_HOME: u8 = 0x02;
pub const CURSOR_SHIFT: u8 = 0x10;
pub const SET_CGRAM_ADDR: u8 = 0x40;
pub const SET_DDRAM_ADDR: u8 = 0x80;

// Cursor and display move flags
pub mod shift {
    #[allow(dead_code)] // Only the display-move variant is issued
    pub const CURSOR_MOVE: u8 = 0x00;
    pub const DISPLAY_MOVE: u8 = 0x08;
    pub const MOVE_LEFT: u8 = 0x00;
    pub const MOVE_RIGHT: u8 = 0x04;
}

// Entry mode: 0000_01 I/D S
pub mod entry {
    pub const SET: u8 = 0x04;
    pub const INCREMENT: u8 = 0x02;
    pub const SHIFT_ON: u8 = 0x01;
}

// Display control: 0000_1 D C B
pub mod display {
    pub const SET: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;
}

// Function set: 001 DL N F 00
pub mod function {
    pub const SET: u8 = 0x20;
    pub const EIGHT_BIT: u8 = 0x10;
    pub const TWO_LINE: u8 = 0x08;
    pub const DOTS_5X10: u8 = 0x04;
}

// --- MCP23017 registers ---
pub mod mcp23017 {
    /// IOCON as seen when the chip is still in BANK=1 layout.
    pub const IOCON_BANK1: u8 = 0x05;
    /// IOCON in the BANK=0 layout.
    pub const IOCON: u8 = 0x0A;
    /// BANK=0, sequential address increment disabled.
    pub const IOCON_SEQOP: u8 = 0x20;
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
}
