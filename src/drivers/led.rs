use embedded_hal::digital::v2::OutputPin;

/// LED wired between VCC and the pin: driving the pin low lights it
pub struct Led<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> Led<P> {
    /// Take the pin and switch the LED off
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_high()?;
        Ok(Self { pin, lit: false })
    }

    pub fn on(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        self.lit = true;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.lit = false;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), P::Error> {
        if self.lit {
            self.off()
        } else {
            self.on()
        }
    }

    pub fn set(&mut self, lit: bool) -> Result<(), P::Error> {
        if lit {
            self.on()
        } else {
            self.off()
        }
    }

    pub fn is_on(&self) -> bool {
        self.lit
    }

    pub fn release(self) -> P {
        self.pin
    }
}
