//! Configuration constants for the alarm clock firmware

use crate::drivers::ButtonDriver;
use crate::logger::Level;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Scheduler tick period in milliseconds (Timer0)
pub const TICK_MS: u32 = 1;

/// Auxiliary timer period in milliseconds (Timer1)
pub const AUX_TICK_MS: u32 = 5;

/// Timer0 compare value: 16MHz / 64 / 1000 - 1
pub const TIMER0_COMPARE: u8 = (CPU_FREQ_HZ / 64 / 1000 * TICK_MS - 1) as u8;

/// Timer1 compare value: 16MHz / 256 * 5ms
pub const TIMER1_COMPARE: u16 = (CPU_FREQ_HZ / 256 * AUX_TICK_MS / 1000) as u16;

/// Number of task slots in the scheduler registry
pub const MAX_TASKS: usize = 8;

/// Button sampling period in milliseconds
pub const BUTTON_DEBOUNCE_MS: u16 = 5;

/// Consecutive "pressed" samples before a press is reported
pub const DEBOUNCE_CHECKS: usize = 10;

/// Source of button presses on the board
pub const BUTTON_DRIVER: ButtonDriver = ButtonDriver::Task;

/// Period of the task driving the alarm clock state machine
pub const CLOCK_TASK_MS: u16 = 100;

/// Red LED blink period while the alarm sounds
pub const ALARM_BLINK_MS: u16 = 125;

/// Alarm silences itself after this long
pub const ALARM_TIMEOUT_MS: u16 = 5000;

/// Period of the filtered fan speed report
pub const FAN_REPORT_MS: u16 = 1000;

/// Default maximum log level
#[cfg(feature = "debug")]
pub const LOG_LEVEL: Level = Level::Debug;
#[cfg(not(feature = "debug"))]
pub const LOG_LEVEL: Level = Level::Info;
