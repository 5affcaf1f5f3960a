use core::cell::Cell;

use critical_section::Mutex;

use super::Signal;

/// Signals understood by the alarm clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Entry,
    Exit,
    RotaryPress,
    PushPress,
    AlarmTime,
    TimerElapsed,
    NoEvent,
}

impl Signal for Event {
    const ENTRY: Self = Event::Entry;
    const EXIT: Self = Event::Exit;
}

/// Mailbox holding at most one not-yet-consumed event.
///
/// One producer (possibly in interrupt context) and one consumer per slot.
/// A new event overwrites an unconsumed one; there is no queue.
pub struct EventSlot {
    event: Mutex<Cell<Event>>,
}

impl EventSlot {
    pub const fn new() -> Self {
        Self {
            event: Mutex::new(Cell::new(Event::NoEvent)),
        }
    }

    pub fn post(&self, event: Event) {
        critical_section::with(|cs| self.event.borrow(cs).set(event));
    }

    /// Current content, left in place
    pub fn peek(&self) -> Event {
        critical_section::with(|cs| self.event.borrow(cs).get())
    }

    /// Remove and return the content in one step, leaving `NoEvent`
    pub fn take(&self) -> Event {
        critical_section::with(|cs| self.event.borrow(cs).replace(Event::NoEvent))
    }

    /// Mark the slot consumed
    pub fn clear(&self) {
        self.post(Event::NoEvent);
    }

    pub fn is_empty(&self) -> bool {
        self.peek() == Event::NoEvent
    }
}

impl Default for EventSlot {
    fn default() -> Self {
        Self::new()
    }
}
