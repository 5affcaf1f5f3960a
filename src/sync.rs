//! Single-handler slots shared between setup code and interrupt handlers

use core::cell::Cell;

use critical_section::Mutex;

/// Holds at most one handler for an interrupt source.
///
/// Written from main context during setup, read from interrupt context.
pub struct CallbackSlot {
    handler: Mutex<Cell<Option<fn()>>>,
}

impl CallbackSlot {
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
        }
    }

    /// Install `handler`. `None` keeps the current handler.
    pub fn set(&self, handler: Option<fn()>) {
        if let Some(handler) = handler {
            critical_section::with(|cs| self.handler.borrow(cs).set(Some(handler)));
        }
    }

    pub fn is_set(&self) -> bool {
        critical_section::with(|cs| self.handler.borrow(cs).get().is_some())
    }

    /// Run the installed handler, if any. Returns whether one ran.
    pub fn fire(&self) -> bool {
        let handler = critical_section::with(|cs| self.handler.borrow(cs).get());
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static FIRST: AtomicU32 = AtomicU32::new(0);
    static SECOND: AtomicU32 = AtomicU32::new(0);

    fn first() {
        FIRST.fetch_add(1, Ordering::Relaxed);
    }

    fn second() {
        SECOND.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn empty_slot_does_nothing() {
        let slot = CallbackSlot::new();
        assert!(!slot.is_set());
        assert!(!slot.fire());
    }

    #[test]
    fn none_keeps_previous_handler() {
        let slot = CallbackSlot::new();
        slot.set(Some(first));
        slot.set(None);
        assert!(slot.fire());
        assert_eq!(FIRST.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn later_handler_replaces_earlier() {
        let slot = CallbackSlot::new();
        slot.set(Some(first));
        slot.set(Some(second));
        slot.fire();
        slot.fire();
        assert_eq!(SECOND.load(Ordering::Relaxed), 2);
    }
}
