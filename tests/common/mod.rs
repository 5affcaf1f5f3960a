#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use alarm_clock_firmware::application::Buttons;
use alarm_clock_firmware::config::AUX_TICK_MS;
use alarm_clock_firmware::drivers::{ButtonDriver, ButtonHandler, Display, Led, SharedButtons};
use alarm_clock_firmware::{App, Board, Events, Scheduler};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use ufmt::uWrite;

/// Active-low button whose level the test controls
#[derive(Clone, Default)]
pub struct FakeButton {
    pressed: Rc<Cell<bool>>,
}

impl FakeButton {
    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

impl InputPin for FakeButton {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(!self.pressed.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(self.pressed.get())
    }
}

/// Output pin remembering its level
#[derive(Clone, Default)]
pub struct FakePin {
    high: Rc<Cell<bool>>,
}

impl FakePin {
    pub fn is_high(&self) -> bool {
        self.high.get()
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high.set(true);
        Ok(())
    }
}

/// Display keeping every frame shown
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    frame: String,
    shown: Rc<RefCell<Vec<String>>>,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<String> {
        self.shown.borrow().last().cloned()
    }

    pub fn frames(&self) -> Vec<String> {
        self.shown.borrow().clone()
    }
}

impl uWrite for RecordingDisplay {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.frame.push_str(s);
        Ok(())
    }
}

impl Display for RecordingDisplay {
    fn clear(&mut self) {
        self.frame.clear();
    }

    fn update(&mut self) {
        self.shown.borrow_mut().push(self.frame.clone());
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type PushButton = FakeButton;
    type RotaryButton = FakeButton;
    type RedLed = FakePin;
    type YellowLed = FakePin;
    type Display = RecordingDisplay;
}

/// Handles into a running appliance
pub struct Bench {
    pub scheduler: Scheduler<App<TestBoard>>,
    pub app: App<TestBoard>,
    pub buttons: &'static Buttons<TestBoard>,
    pub events: &'static Events,
    pub driver: ButtonDriver,
    /// Ticks since boot
    pub ticks: u32,
    pub push: FakeButton,
    pub rotary: FakeButton,
    pub red: FakePin,
    pub yellow: FakePin,
    pub display: RecordingDisplay,
}

impl Bench {
    /// Appliance with buttons sampled by the debounce task
    pub fn start() -> Self {
        Self::with_driver(ButtonDriver::Task)
    }

    pub fn with_driver(driver: ButtonDriver) -> Self {
        let push = FakeButton::default();
        let rotary = FakeButton::default();
        let red = FakePin::default();
        let yellow = FakePin::default();
        let display = RecordingDisplay::default();

        let scheduler = Scheduler::new();
        let buttons: &'static Buttons<TestBoard> = Box::leak(Box::new(SharedButtons::new()));
        let events: &'static Events = Box::leak(Box::new(Events::new()));
        buttons.install(ButtonHandler::new(
            push.clone(),
            rotary.clone(),
            driver.mode(),
        ));
        let app = App::start(
            &scheduler,
            buttons,
            events,
            driver,
            Led::new(red.clone()).unwrap(),
            Led::new(yellow.clone()).unwrap(),
            display.clone(),
        )
        .unwrap();

        Self {
            scheduler,
            app,
            buttons,
            events,
            driver,
            ticks: 0,
            push,
            rotary,
            red,
            yellow,
            display,
        }
    }

    /// Let `ms` milliseconds pass: one tick and one dispatch scan each. With
    /// the Timer1 driver the buttons are sampled every `AUX_TICK_MS` as the
    /// timer interrupt would.
    pub fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.scheduler.tick();
            self.ticks += 1;
            if self.driver == ButtonDriver::Timer && self.ticks % AUX_TICK_MS == 0 {
                self.buttons.check_state(self.events);
            }
            self.scheduler.dispatch(&mut self.app);
        }
    }

    /// Pin-change interrupt
    pub fn pin_change(&self) {
        self.buttons.on_pin_change(self.events);
    }

    /// Press and release a button long enough for the press to reach the
    /// state machine
    pub fn click(&mut self, button: Button) {
        let pin = match button {
            Button::Push => self.push.clone(),
            Button::Rotary => self.rotary.clone(),
        };
        pin.press();
        if self.driver == ButtonDriver::PinChange {
            self.pin_change();
        }
        self.run_ms(80);
        pin.release();
        if self.driver == ButtonDriver::PinChange {
            self.pin_change();
        }
        self.run_ms(120);
    }

    pub fn clicks(&mut self, button: Button, times: usize) {
        for _ in 0..times {
            self.click(button);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Button {
    Push,
    Rotary,
}
