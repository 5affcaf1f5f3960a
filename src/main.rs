#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use core::convert::Infallible;

    use avr_device::atmega128rfa1::{Peripherals, CPU};
    use panic_halt as _;
    use ufmt::uwrite;

    use alarm_clock_firmware::application::Buttons;
    use alarm_clock_firmware::config::BUTTON_DRIVER;
    use alarm_clock_firmware::drivers::{
        ButtonDriver, ButtonHandler, Fan, FanSpeed, Led, SerialConsole, SharedButtons,
    };
    use alarm_clock_firmware::hal::gpio::board::{self, Pins};
    use alarm_clock_firmware::hal::{
        enable_button_interrupts, enable_tacho_interrupt, timer1_sample, Adc, AdcChannel,
        TickSource, Timer0, Timer1, Timer3Pwm, Uart, TIMER0_CALLBACK, TIMER1_CALLBACK,
    };
    use alarm_clock_firmware::logger::{self, Level};
    use alarm_clock_firmware::{App, Board, Events, Scheduler};

    struct SesBoard;

    impl Board for SesBoard {
        type PushButton = board::PushButton;
        type RotaryButton = board::RotaryButton;
        type RedLed = board::LedRed;
        type YellowLed = board::LedYellow;
        type Display = SerialConsole;
    }

    static SCHEDULER: Scheduler<App<SesBoard>> = Scheduler::new();
    static BUTTONS: Buttons<SesBoard> = SharedButtons::new();
    static EVENTS: Events = Events::new();
    static FAN_SPEED: FanSpeed = FanSpeed::new();

    /// Sleep enable with idle mode (SM = 000)
    const SE: u8 = 1 << 0;

    fn on_tick() {
        SCHEDULER.tick();
    }

    fn on_aux_tick() {
        FAN_SPEED.on_aux_tick();
        if BUTTON_DRIVER == ButtonDriver::Timer {
            BUTTONS.check_state(&EVENTS);
        }
    }

    fn infallible<T>(result: Result<T, Infallible>) -> T {
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn enable_idle_sleep(cpu: &CPU) {
        unsafe { cpu.smcr.write(|w| w.bits(SE)) };
    }

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();

        let console = SerialConsole::new(Uart::new(dp.USART0));
        console.install_log_sink();
        logger::log(Level::Info, |w| uwrite!(w, "SES alarm clock v0.1.0"));

        let pins = Pins::new(dp.PORTB, dp.PORTD, dp.PORTE, dp.PORTF);
        BUTTONS.install(ButtonHandler::new(
            pins.push,
            pins.rotary,
            BUTTON_DRIVER.mode(),
        ));
        let red = infallible(Led::new(pins.led_red));
        let yellow = infallible(Led::new(pins.led_yellow));
        let _green = infallible(Led::new(pins.led_green));

        let mut adc = Adc::new(dp.ADC);
        let pwm = Timer3Pwm::new(dp.TC3, pins.fan_pwm);
        let mut fan = infallible(Fan::new(pins.fan_power, pwm));
        let duty = (adc.read_raw(AdcChannel::Potentiometer as u8) >> 2) as u8;
        infallible(fan.enable());
        fan.set_duty_cycle(duty);
        let celsius = adc.temperature();
        logger::log(Level::Info, |w| uwrite!(w, "{} C, fan duty {}", celsius, duty));

        let started = App::start(
            &SCHEDULER,
            &BUTTONS,
            &EVENTS,
            BUTTON_DRIVER,
            red,
            yellow,
            console,
        );
        // Registration failures are logged by the application
        let Ok(mut app) = started else {
            loop {
                avr_device::asm::sleep();
            }
        };
        if app.monitor_fan(&SCHEDULER, &FAN_SPEED).is_err() {
            logger::log(Level::Warn, |w| uwrite!(w, "fan report not scheduled"));
        }

        let mut timer0 = Timer0::new(dp.TC0);
        timer0.set_callback(Some(on_tick));
        timer0.start();

        let mut timer1 = Timer1::new(dp.TC1);
        timer1.set_callback(Some(on_aux_tick));
        timer1.start();

        enable_tacho_interrupt(&dp.EXINT);
        if BUTTON_DRIVER == ButtonDriver::PinChange {
            enable_button_interrupts(&dp.EXINT);
        }
        enable_idle_sleep(&dp.CPU);

        unsafe { avr_device::interrupt::enable() };

        SCHEDULER.run(&mut app)
    }

    #[avr_device::interrupt(atmega128rfa1)]
    fn TIMER0_COMPA() {
        TIMER0_CALLBACK.fire();
    }

    #[avr_device::interrupt(atmega128rfa1)]
    fn TIMER1_COMPA() {
        TIMER1_CALLBACK.fire();
    }

    #[avr_device::interrupt(atmega128rfa1)]
    fn PCINT0() {
        BUTTONS.on_pin_change(&EVENTS);
    }

    #[avr_device::interrupt(atmega128rfa1)]
    fn INT6() {
        let (counter, compare_pending) = timer1_sample();
        FAN_SPEED.on_pulse(counter, compare_pending);
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    println!("alarm_clock_firmware targets the ATmega128RFA1; run the test suite on the host");
}
