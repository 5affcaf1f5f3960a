//! USART0, polled transmit, 8N1

use core::convert::Infallible;

use avr_device::atmega128rfa1::USART0;
use ufmt::uWrite;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

const RXEN0: u8 = 1 << 4;
const TXEN0: u8 = 1 << 3;
const UCSZ0_8BIT: u8 = 0x06;
const UDRE0: u8 = 1 << 5;
const RXC0: u8 = 1 << 7;

/// Handle to the initialized USART0.
///
/// Copies share the one transmitter; every byte goes out whole, so lines
/// from different copies may interleave but bytes never tear.
#[derive(Clone, Copy)]
pub struct Uart {
    _private: (),
}

impl Uart {
    pub fn new(usart: USART0) -> Self {
        unsafe {
            usart.ubrr0.write(|w| w.bits(UBRR));
            usart.ucsr0c.write(|w| w.bits(UCSZ0_8BIT));
            usart.ucsr0b.write(|w| w.bits(RXEN0 | TXEN0));
        }
        Self { _private: () }
    }

    fn regs(&self) -> &'static avr_device::atmega128rfa1::usart0::RegisterBlock {
        unsafe { &*USART0::ptr() }
    }

    pub fn write_byte(&mut self, byte: u8) {
        while self.regs().ucsr0a.read().bits() & UDRE0 == 0 {}
        unsafe {
            self.regs().udr0.write(|w| w.bits(byte));
        }
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        if self.regs().ucsr0a.read().bits() & RXC0 == 0 {
            return None;
        }
        Some(self.regs().udr0.read().bits())
    }
}

impl uWrite for Uart {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
