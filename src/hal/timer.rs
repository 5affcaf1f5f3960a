//! Periodic tick sources
//!
//! Timer0 fires every `TICK_MS` and drives the scheduler. Timer1 fires every
//! `AUX_TICK_MS` for auxiliary periodic work. The binary's compare-match
//! interrupt handlers fire the timer's `CallbackSlot`.
//!
//! Both counters run freely once started. Readers such as the tacho
//! measurement may sample `TCNT1` but never write it, so the period holds for
//! every Timer1 user.

use crate::sync::CallbackSlot;

pub static TIMER0_CALLBACK: CallbackSlot = CallbackSlot::new();
pub static TIMER1_CALLBACK: CallbackSlot = CallbackSlot::new();

/// Fixed-period interrupt source with one handler slot
pub trait TickSource {
    /// Enable the periodic interrupt, discarding a compare match that is
    /// already pending
    fn start(&mut self);

    fn stop(&mut self);

    /// Install the handler. `None` keeps the current one.
    fn set_callback(&mut self, callback: Option<fn()>);
}

#[cfg(target_arch = "avr")]
pub use self::avr::{timer1_sample, Timer0, Timer1};

#[cfg(target_arch = "avr")]
mod avr {
    use avr_device::atmega128rfa1::{TC0, TC1};

    use super::{TickSource, TIMER0_CALLBACK, TIMER1_CALLBACK};
    use crate::config::{TIMER0_COMPARE, TIMER1_COMPARE};

    const WGM01: u8 = 1 << 1;
    const CS0_DIV64: u8 = 0x03;
    const WGM12: u8 = 1 << 3;
    const CS1_DIV256: u8 = 1 << 2;
    const OCIEA: u8 = 1 << 1;
    const OCFA: u8 = 1 << 1;

    /// 1 ms tick: CTC mode, prescaler 64, compare 249
    pub struct Timer0 {
        tc0: TC0,
    }

    impl Timer0 {
        pub fn new(tc0: TC0) -> Self {
            unsafe {
                tc0.tccr0a.write(|w| w.bits(WGM01));
                tc0.tccr0b.write(|w| w.bits(CS0_DIV64));
                tc0.ocr0a.write(|w| w.bits(TIMER0_COMPARE));
            }
            Self { tc0 }
        }
    }

    impl TickSource for Timer0 {
        fn start(&mut self) {
            unsafe {
                self.tc0.tifr0.write(|w| w.bits(OCFA));
                self.tc0.timsk0.modify(|r, w| w.bits(r.bits() | OCIEA));
            }
        }

        fn stop(&mut self) {
            unsafe {
                self.tc0.timsk0.modify(|r, w| w.bits(r.bits() & !OCIEA));
            }
        }

        fn set_callback(&mut self, callback: Option<fn()>) {
            TIMER0_CALLBACK.set(callback);
        }
    }

    /// Timer1 count, then whether its compare match is still waiting for
    /// the handler. Read only; callable from any interrupt handler.
    pub fn timer1_sample() -> (u16, bool) {
        let tc1 = unsafe { &*TC1::ptr() };
        let counter = tc1.tcnt1.read().bits();
        let pending = tc1.tifr1.read().bits() & OCFA != 0;
        (counter, pending)
    }

    /// 5 ms tick: CTC mode, prescaler 256, compare 312
    pub struct Timer1 {
        tc1: TC1,
    }

    impl Timer1 {
        pub fn new(tc1: TC1) -> Self {
            unsafe {
                tc1.tccr1a.write(|w| w.bits(0));
                tc1.tccr1b.write(|w| w.bits(WGM12 | CS1_DIV256));
                tc1.ocr1a.write(|w| w.bits(TIMER1_COMPARE));
            }
            Self { tc1 }
        }
    }

    impl TickSource for Timer1 {
        fn start(&mut self) {
            unsafe {
                self.tc1.tifr1.write(|w| w.bits(OCFA));
                self.tc1.timsk1.modify(|r, w| w.bits(r.bits() | OCIEA));
            }
        }

        fn stop(&mut self) {
            unsafe {
                self.tc1.timsk1.modify(|r, w| w.bits(r.bits() & !OCIEA));
            }
        }

        fn set_callback(&mut self, callback: Option<fn()>) {
            TIMER1_CALLBACK.set(callback);
        }
    }
}
