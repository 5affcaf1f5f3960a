//! External and pin-change interrupts
//!
//! The buttons on PB4 and PB5 raise PCINT0 on every level change. The fan
//! tacho on PE6 raises INT6 on rising edges.

use avr_device::atmega128rfa1::EXINT;

const PCIE0: u8 = 1 << 0;
const PCIF0: u8 = 1 << 0;
const PCINT_PUSH: u8 = 1 << 4;
const PCINT_ROTARY: u8 = 1 << 5;

const ISC6_RISING: u8 = 0b11 << 4;
const INT6: u8 = 1 << 6;

/// Enable the pin-change interrupt of both buttons, dropping a change that is
/// already pending
pub fn enable_button_interrupts(exint: &EXINT) {
    unsafe {
        exint.pcicr.modify(|r, w| w.bits(r.bits() & !PCIE0));
        exint
            .pcmsk0
            .modify(|r, w| w.bits(r.bits() | PCINT_PUSH | PCINT_ROTARY));
        exint.pcifr.write(|w| w.bits(PCIF0));
        exint.pcicr.modify(|r, w| w.bits(r.bits() | PCIE0));
    }
}

/// Enable INT6 on rising edges of the tacho signal
pub fn enable_tacho_interrupt(exint: &EXINT) {
    unsafe {
        exint.eicrb.modify(|r, w| w.bits(r.bits() | ISC6_RISING));
        exint.eifr.write(|w| w.bits(INT6));
        exint.eimsk.modify(|r, w| w.bits(r.bits() | INT6));
    }
}
