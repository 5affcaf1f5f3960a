pub mod adc;
pub mod timer;

#[cfg(target_arch = "avr")]
pub mod exint;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod pwm;
#[cfg(target_arch = "avr")]
pub mod uart;

pub use adc::{temperature_from_raw, AdcChannel, AdcError, ADC_INVALID_CHANNEL};
pub use timer::{TickSource, TIMER0_CALLBACK, TIMER1_CALLBACK};

#[cfg(target_arch = "avr")]
pub use adc::Adc;
#[cfg(target_arch = "avr")]
pub use exint::{enable_button_interrupts, enable_tacho_interrupt};
#[cfg(target_arch = "avr")]
pub use pwm::Timer3Pwm;
#[cfg(target_arch = "avr")]
pub use timer::{timer1_sample, Timer0, Timer1};
#[cfg(target_arch = "avr")]
pub use uart::Uart;
