//! Time-of-day clock advanced by the scheduler tick

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};
use ufmt::{uDisplay, uWrite, Formatter};

pub const HOURS_PER_DAY: u8 = 24;
pub const MINUTES_PER_HOUR: u8 = 60;
pub const SECONDS_PER_MINUTE: u8 = 60;

pub const MS_PER_SECOND: u32 = 1000;
pub const MS_PER_MINUTE: u32 = SECONDS_PER_MINUTE as u32 * MS_PER_SECOND;
pub const MS_PER_HOUR: u32 = MINUTES_PER_HOUR as u32 * MS_PER_MINUTE;

/// Milliseconds in one day; the system clock wraps to 0 here
pub const DAY_MS: u32 = HOURS_PER_DAY as u32 * MS_PER_HOUR;

/// Millisecond time of day shared between the tick interrupt and the main loop.
///
/// The counter is wider than an AVR atomic access, so every read and every
/// external write goes through a critical section.
pub struct SystemClock {
    millis: Mutex<Cell<u32>>,
}

impl SystemClock {
    pub const fn new() -> Self {
        Self {
            millis: Mutex::new(Cell::new(0)),
        }
    }

    /// Current time of day in milliseconds
    pub fn now(&self) -> u32 {
        critical_section::with(|cs| self.millis.borrow(cs).get())
    }

    /// Override the time of day. Values outside the day reset the clock to 0.
    pub fn set(&self, millis: u32) {
        let millis = if millis >= DAY_MS { 0 } else { millis };
        critical_section::with(|cs| self.millis.borrow(cs).set(millis));
    }

    pub fn time(&self) -> ClockTime {
        ClockTime::from_millis(self.now())
    }

    /// Advance by one millisecond, wrapping at the day boundary.
    pub(crate) fn advance(&self, cs: CriticalSection<'_>) {
        let millis = self.millis.borrow(cs);
        let next = millis.get() + 1;
        millis.set(if next >= DAY_MS { 0 } else { next });
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Human readable time of day
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub milli: u16,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime::hm(0, 0);

    /// Time with seconds and milliseconds at zero
    pub const fn hm(hour: u8, minute: u8) -> Self {
        Self {
            hour,
            minute,
            second: 0,
            milli: 0,
        }
    }

    /// Split a millisecond time of day. Values beyond one day are reduced
    /// modulo `DAY_MS` first.
    pub fn from_millis(millis: u32) -> Self {
        let mut rest = millis % DAY_MS;

        let hour = rest / MS_PER_HOUR;
        rest -= hour * MS_PER_HOUR;

        let minute = rest / MS_PER_MINUTE;
        rest -= minute * MS_PER_MINUTE;

        let second = rest / MS_PER_SECOND;
        rest -= second * MS_PER_SECOND;

        Self {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            milli: rest as u16,
        }
    }

    pub fn to_millis(&self) -> u32 {
        self.hour as u32 * MS_PER_HOUR
            + self.minute as u32 * MS_PER_MINUTE
            + self.second as u32 * MS_PER_SECOND
            + self.milli as u32
    }

    pub fn is_valid(&self) -> bool {
        self.hour < HOURS_PER_DAY
            && self.minute < MINUTES_PER_HOUR
            && self.second < SECONDS_PER_MINUTE
            && (self.milli as u32) < MS_PER_SECOND
    }

    /// Advance the hour field, wrapping at 24
    pub fn next_hour(&mut self) {
        self.hour = (self.hour + 1) % HOURS_PER_DAY;
    }

    /// Advance the minute field, wrapping at 60 without touching the hour
    pub fn next_minute(&mut self) {
        self.minute = (self.minute + 1) % MINUTES_PER_HOUR;
    }

    /// Same hour and minute
    pub fn same_minute(&self, other: &ClockTime) -> bool {
        self.hour == other.hour && self.minute == other.minute
    }

    /// `HH:MM` view of this time
    pub fn short(&self) -> ShortTime {
        ShortTime(*self)
    }
}

fn two_digits<W>(f: &mut Formatter<'_, W>, value: u8) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    if value < 10 {
        f.write_str("0")?;
    }
    uDisplay::fmt(&value, f)
}

/// Renders as `HH:MM:SS`
impl uDisplay for ClockTime {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        two_digits(f, self.hour)?;
        f.write_str(":")?;
        two_digits(f, self.minute)?;
        f.write_str(":")?;
        two_digits(f, self.second)
    }
}

/// Renders a `ClockTime` as `HH:MM`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShortTime(pub ClockTime);

impl uDisplay for ShortTime {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        two_digits(f, self.0.hour)?;
        f.write_str(":")?;
        two_digits(f, self.0.minute)
    }
}
