use embedded_hal::digital::v2::OutputPin;
use embedded_hal::PwmPin;

/// Fan behind a MOSFET switch, speed set by PWM duty
pub struct Fan<E, W> {
    power: E,
    pwm: W,
    running: bool,
}

impl<E, W> Fan<E, W>
where
    E: OutputPin,
    W: PwmPin<Duty = u8>,
{
    /// Take the power and PWM pins with the fan off
    pub fn new(mut power: E, mut pwm: W) -> Result<Self, E::Error> {
        power.set_low()?;
        pwm.set_duty(0);
        pwm.enable();
        Ok(Self {
            power,
            pwm,
            running: false,
        })
    }

    /// Switch the fan on with zero duty
    pub fn enable(&mut self) -> Result<(), E::Error> {
        self.power.set_high()?;
        self.pwm.set_duty(0);
        self.running = true;
        Ok(())
    }

    /// Switch the fan off and zero the duty
    pub fn disable(&mut self) -> Result<(), E::Error> {
        self.power.set_low()?;
        self.pwm.set_duty(0);
        self.running = false;
        Ok(())
    }

    pub fn set_duty_cycle(&mut self, duty: u8) {
        self.pwm.set_duty(duty);
    }

    pub fn duty_cycle(&self) -> u8 {
        self.pwm.get_duty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn release(self) -> (E, W) {
        (self.power, self.pwm)
    }
}
