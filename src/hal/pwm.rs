//! Fan PWM on Timer3, output compare A (PE3)
//!
//! 8-bit fast PWM, prescaler 64: about 976 Hz at 16 MHz.

use avr_device::atmega128rfa1::TC3;
use embedded_hal::PwmPin;

use super::gpio::board::FanPwm;

const WGM30: u8 = 1 << 0;
const COM3A1: u8 = 1 << 7;
const WGM32: u8 = 1 << 3;
const CS3_DIV64: u8 = 0x03;

pub struct Timer3Pwm {
    tc3: TC3,
    _pin: FanPwm,
}

impl Timer3Pwm {
    pub fn new(tc3: TC3, pin: FanPwm) -> Self {
        unsafe {
            tc3.tccr3a.write(|w| w.bits(WGM30));
            tc3.tccr3b.write(|w| w.bits(WGM32 | CS3_DIV64));
            tc3.ocr3a.write(|w| w.bits(0));
        }
        Self { tc3, _pin: pin }
    }
}

impl PwmPin for Timer3Pwm {
    type Duty = u8;

    fn disable(&mut self) {
        unsafe {
            self.tc3.tccr3a.modify(|r, w| w.bits(r.bits() & !COM3A1));
        }
    }

    fn enable(&mut self) {
        unsafe {
            self.tc3.tccr3a.modify(|r, w| w.bits(r.bits() | COM3A1));
        }
    }

    fn get_duty(&self) -> u8 {
        self.tc3.ocr3a.read().bits() as u8
    }

    fn get_max_duty(&self) -> u8 {
        u8::MAX
    }

    fn set_duty(&mut self, duty: u8) {
        unsafe {
            self.tc3.ocr3a.write(|w| w.bits(duty as u16));
        }
    }
}
