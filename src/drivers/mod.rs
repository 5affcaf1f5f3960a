pub mod button_handler;
pub mod display;
pub mod fan;
pub mod fanspeed;
pub mod led;
#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use button_handler::{
    ButtonCallback, ButtonDriver, ButtonHandler, DebounceMode, Debouncer, SharedButtons,
};
pub use display::Display;
pub use fan::Fan;
pub use fanspeed::FanSpeed;
pub use led::Led;
#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
