//! Line-oriented logging through a board-supplied sink
//!
//! Messages are formatted with `ufmt` into a fixed line buffer and handed to
//! the sink installed at boot. Nothing is formatted while no sink is set or
//! when the level is filtered out. Never log from interrupt context.

use core::cell::Cell;
use core::convert::Infallible;

use critical_section::Mutex;
use ufmt::uWrite;

use crate::config::LOG_LEVEL;

/// Longest line handed to the sink; longer messages are truncated
pub const LINE_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERR",
            Level::Warn => "WRN",
            Level::Info => "INF",
            Level::Debug => "DBG",
        }
    }
}

/// Receives every formatted line that passes the level filter
pub type Sink = fn(Level, &str);

static SINK: Mutex<Cell<Option<Sink>>> = Mutex::new(Cell::new(None));
static MAX_LEVEL: Mutex<Cell<Level>> = Mutex::new(Cell::new(LOG_LEVEL));

pub fn set_sink(sink: Sink) {
    critical_section::with(|cs| SINK.borrow(cs).set(Some(sink)));
}

pub fn set_max_level(level: Level) {
    critical_section::with(|cs| MAX_LEVEL.borrow(cs).set(level));
}

pub fn max_level() -> Level {
    critical_section::with(|cs| MAX_LEVEL.borrow(cs).get())
}

pub fn enabled(level: Level) -> bool {
    level <= max_level()
}

/// Format a line with `format` and pass it to the sink.
pub fn log<F>(level: Level, format: F)
where
    F: FnOnce(&mut LineBuffer) -> Result<(), Infallible>,
{
    let sink = critical_section::with(|cs| SINK.borrow(cs).get());
    let Some(sink) = sink else {
        return;
    };
    if !enabled(level) {
        return;
    }

    let mut line = LineBuffer::new();
    format(&mut line).ok();
    sink(level, line.as_str());
}

/// Fixed-size text buffer that silently truncates at `LINE_CAPACITY`
pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: usize,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // Only whole characters are ever copied in
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl uWrite for LineBuffer {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for ch in s.chars() {
            let width = ch.len_utf8();
            if self.len + width > LINE_CAPACITY {
                break;
            }
            ch.encode_utf8(&mut self.buf[self.len..self.len + width]);
            self.len += width;
        }
        Ok(())
    }
}

macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Error, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Warn, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Info, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logger::log($crate::logger::Level::Debug, |w| ufmt::uwrite!(w, $($arg)*))
    };
}

pub(crate) use {log_debug, log_error, log_info, log_warn};
