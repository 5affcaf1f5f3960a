//! Analog inputs of the SES board
//!
//! Light sensor, potentiometer and temperature sensor on PF0, PF6 and PF7,
//! external reference, ADC clock 16 MHz / 128.

/// Returned by raw channel reads for a channel the board does not wire up
pub const ADC_INVALID_CHANNEL: u16 = 0xFFFF;

/// Raw reading at the low calibration point
const TEMP_RAW_LOW: i32 = 553;
/// Raw reading at the high calibration point
const TEMP_RAW_HIGH: i32 = 857;
const TEMP_LOW_C: i32 = 10;
const TEMP_HIGH_C: i32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcChannel {
    Light = 0,
    Potentiometer = 6,
    Temperature = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    InvalidChannel(u8),
}

impl TryFrom<u8> for AdcChannel {
    type Error = AdcError;

    fn try_from(channel: u8) -> Result<Self, AdcError> {
        match channel {
            0 => Ok(AdcChannel::Light),
            6 => Ok(AdcChannel::Potentiometer),
            7 => Ok(AdcChannel::Temperature),
            other => Err(AdcError::InvalidChannel(other)),
        }
    }
}

/// Degrees Celsius by linear interpolation through the two calibration points
pub fn temperature_from_raw(raw: u16) -> i16 {
    let offset = raw as i32 - TEMP_RAW_LOW;
    let celsius =
        offset * (TEMP_HIGH_C - TEMP_LOW_C) / (TEMP_RAW_HIGH - TEMP_RAW_LOW) + TEMP_LOW_C;
    celsius as i16
}

#[cfg(target_arch = "avr")]
pub use self::avr::Adc;

#[cfg(target_arch = "avr")]
mod avr {
    use core::convert::Infallible;

    use avr_device::atmega128rfa1::ADC;

    use super::{temperature_from_raw, AdcChannel, ADC_INVALID_CHANNEL};

    const ADEN: u8 = 1 << 7;
    const ADSC: u8 = 1 << 6;
    const ADPS_DIV128: u8 = 0x07;
    const MUX_MASK: u8 = 0x1F;

    pub struct Adc {
        adc: ADC,
        converting: Option<AdcChannel>,
    }

    impl Adc {
        /// Single conversions, right aligned, external reference
        pub fn new(adc: ADC) -> Self {
            unsafe {
                adc.admux.write(|w| w.bits(0));
                adc.adcsra.write(|w| w.bits(ADEN | ADPS_DIV128));
            }
            Self {
                adc,
                converting: None,
            }
        }

        fn busy(&self) -> bool {
            self.adc.adcsra.read().bits() & ADSC != 0
        }

        /// Start a conversion on `channel` or collect its result
        pub fn read(&mut self, channel: AdcChannel) -> nb::Result<u16, Infallible> {
            match self.converting {
                Some(current) if current == channel => {
                    if self.busy() {
                        return Err(nb::Error::WouldBlock);
                    }
                    self.converting = None;
                    Ok(self.adc.adc.read().bits())
                }
                Some(_) if self.busy() => Err(nb::Error::WouldBlock),
                _ => {
                    unsafe {
                        self.adc.admux.modify(|r, w| {
                            w.bits((r.bits() & !MUX_MASK) | (channel as u8 & MUX_MASK))
                        });
                        self.adc.adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
                    }
                    self.converting = Some(channel);
                    Err(nb::Error::WouldBlock)
                }
            }
        }

        /// Blocking read by channel number, `ADC_INVALID_CHANNEL` for
        /// channels the board does not wire up
        pub fn read_raw(&mut self, channel: u8) -> u16 {
            match AdcChannel::try_from(channel) {
                Ok(channel) => match nb::block!(self.read(channel)) {
                    Ok(raw) => raw,
                    Err(never) => match never {},
                },
                Err(_) => ADC_INVALID_CHANNEL,
            }
        }

        pub fn temperature(&mut self) -> i16 {
            temperature_from_raw(self.read_raw(AdcChannel::Temperature as u8))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wired_channels_convert() {
        assert_eq!(AdcChannel::try_from(6), Ok(AdcChannel::Potentiometer));
        assert_eq!(AdcChannel::try_from(3), Err(AdcError::InvalidChannel(3)));
    }

    #[test]
    fn temperature_hits_calibration_points() {
        assert_eq!(temperature_from_raw(553), 10);
        assert_eq!(temperature_from_raw(857), 30);
        assert_eq!(temperature_from_raw(705), 20);
        assert_eq!(temperature_from_raw(249), -10);
    }
}
