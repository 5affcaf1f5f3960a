use core::cell::Cell;
use core::convert::Infallible;

use critical_section::Mutex;
use ufmt::{uWrite, uwrite};

use super::display::Display;
use crate::hal::Uart;
use crate::logger::{self, Level};

static LOG_UART: Mutex<Cell<Option<Uart>>> = Mutex::new(Cell::new(None));

/// Text terminal on USART0, used as display and log output
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new(uart: Uart) -> Self {
        Self { uart }
    }

    /// Route log lines to this console's USART
    pub fn install_log_sink(&self) {
        critical_section::with(|cs| LOG_UART.borrow(cs).set(Some(self.uart)));
        logger::set_sink(log_sink);
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        self.uart.read_byte()
    }
}

fn log_sink(level: Level, line: &str) {
    let Some(uart) = critical_section::with(|cs| LOG_UART.borrow(cs).get()) else {
        return;
    };
    let mut console = SerialConsole::new(uart);
    uwrite!(console, "[{}] {}\n", level.tag(), line).ok();
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    /// Newlines go out as CR LF
    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.uart.write_byte(b'\r');
            }
            self.uart.write_byte(byte);
        }
        Ok(())
    }
}

impl Display for SerialConsole {
    fn clear(&mut self) {
        self.write_str("\n").ok();
    }

    fn update(&mut self) {}
}
