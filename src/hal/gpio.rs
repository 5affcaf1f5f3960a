//! Digital pins of the ATmega128RFA1
//!
//! A pin is a zero-sized handle typed by its port, bit and direction. The
//! `board` module hands out the pins the SES board wires up.

use core::convert::Infallible;
use core::marker::PhantomData;

use avr_device::atmega128rfa1::{PORTB, PORTD, PORTE, PORTF};
use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin};

pub struct Input;
pub struct Output;

pub struct Pin<PORT, const P: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8, MODE> Pin<PORT, P, MODE> {
    const fn new() -> Self {
        Self {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $module:ident, $pin:ident, $ddr:ident, $port:ident) => {
        impl<const P: u8, MODE> Pin<$PORT, P, MODE> {
            fn regs() -> &'static avr_device::atmega128rfa1::$module::RegisterBlock {
                unsafe { &*$PORT::ptr() }
            }

            /// Input with the internal pull-up enabled
            pub fn into_pull_up_input(self) -> Pin<$PORT, P, Input> {
                critical_section::with(|_| unsafe {
                    Self::regs().$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    Self::regs().$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                });
                Pin::new()
            }

            /// Input without pull-up, as needed for analog channels
            pub fn into_floating_input(self) -> Pin<$PORT, P, Input> {
                critical_section::with(|_| unsafe {
                    Self::regs().$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    Self::regs().$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                });
                Pin::new()
            }

            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                critical_section::with(|_| unsafe {
                    Self::regs().$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                });
                Pin::new()
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            fn is_high(&self) -> Result<bool, Infallible> {
                Ok(Self::regs().$pin.read().bits() & (1 << P) != 0)
            }

            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            fn set_high(&mut self) -> Result<(), Infallible> {
                critical_section::with(|_| unsafe {
                    Self::regs().$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                });
                Ok(())
            }

            fn set_low(&mut self) -> Result<(), Infallible> {
                critical_section::with(|_| unsafe {
                    Self::regs().$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                });
                Ok(())
            }
        }

        impl<const P: u8> StatefulOutputPin for Pin<$PORT, P, Output> {
            fn is_set_high(&self) -> Result<bool, Infallible> {
                Ok(Self::regs().$port.read().bits() & (1 << P) != 0)
            }

            fn is_set_low(&self) -> Result<bool, Infallible> {
                self.is_set_high().map(|high| !high)
            }
        }
    };
}

impl_port!(PORTB, portb, pinb, ddrb, portb);
impl_port!(PORTD, portd, pind, ddrd, portd);
impl_port!(PORTE, porte, pine, ddre, porte);
impl_port!(PORTF, portf, pinf, ddrf, portf);

/// SES board wiring
pub mod board {
    use super::*;

    pub type PushButton = Pin<PORTB, 4, Input>;
    pub type RotaryButton = Pin<PORTB, 5, Input>;
    pub type LedRed = Pin<PORTF, 5, Output>;
    pub type LedYellow = Pin<PORTD, 3, Output>;
    pub type LedGreen = Pin<PORTD, 2, Output>;
    pub type FanPower = Pin<PORTD, 4, Output>;
    pub type FanPwm = Pin<PORTE, 3, Output>;

    pub struct Pins {
        pub push: PushButton,
        pub rotary: RotaryButton,
        pub led_red: LedRed,
        pub led_yellow: LedYellow,
        pub led_green: LedGreen,
        pub fan_power: FanPower,
        pub fan_pwm: FanPwm,
    }

    impl Pins {
        /// Configure every board pin. Taking the ports makes this a one-time
        /// operation.
        pub fn new(_portb: PORTB, _portd: PORTD, _porte: PORTE, portf: PORTF) -> Self {
            // Analog inputs: light, potentiometer, temperature
            Pin::<PORTF, 0, Input>::new().into_floating_input();
            Pin::<PORTF, 6, Input>::new().into_floating_input();
            Pin::<PORTF, 7, Input>::new().into_floating_input();
            drop(portf);

            Self {
                push: PushButton::new().into_pull_up_input(),
                rotary: RotaryButton::new().into_pull_up_input(),
                led_red: LedRed::new().into_output(),
                led_yellow: LedYellow::new().into_output(),
                led_green: LedGreen::new().into_output(),
                fan_power: FanPower::new().into_output(),
                fan_pwm: FanPwm::new().into_output(),
            }
        }
    }
}
