//! Alarm clock appliance
//!
//! Button presses land in event slots, posted by the debounce task, the
//! Timer1 handler or the pin-change handler depending on the `ButtonDriver`.
//! The clock task feeds those events (or a refresh) into the state machine.
//! While the alarm sounds two more tasks are registered: a blinker for the
//! red LED and a one-shot timeout.
//!
//! The button handler and the event slots are statics shared with interrupt
//! context; the application only holds references to them.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::config::{
    ALARM_BLINK_MS, ALARM_TIMEOUT_MS, BUTTON_DEBOUNCE_MS, CLOCK_TASK_MS, FAN_REPORT_MS,
};
use crate::drivers::display::{self, Display};
use crate::drivers::{ButtonDriver, FanSpeed, Led, SharedButtons};
use crate::fsm::alarm_clock::{AlarmClock, ClockPort, ClockState, Screen};
use crate::fsm::{Event, EventSlot};
use crate::logger::{log_error, log_info, log_warn};
use crate::rtos::{ClockTime, ScheduleError, Scheduler, Task, TaskId};

pub const DEBOUNCE_TASK: TaskId = TaskId(0);
pub const CLOCK_TASK: TaskId = TaskId(1);
pub const ALARM_BLINK_TASK: TaskId = TaskId(2);
pub const ALARM_TIMEOUT_TASK: TaskId = TaskId(3);
pub const FAN_REPORT_TASK: TaskId = TaskId(4);

/// Hardware the appliance runs on
pub trait Board {
    type PushButton: InputPin + 'static;
    type RotaryButton: InputPin + 'static;
    type RedLed: OutputPin;
    type YellowLed: OutputPin;
    type Display: Display;
}

/// One slot per producer, drained by the clock task in this order
#[derive(Default)]
pub struct Events {
    pub rotary: EventSlot,
    pub push: EventSlot,
    pub alarm: EventSlot,
    pub timer: EventSlot,
}

impl Events {
    pub const fn new() -> Self {
        Self {
            rotary: EventSlot::new(),
            push: EventSlot::new(),
            alarm: EventSlot::new(),
            timer: EventSlot::new(),
        }
    }

    fn slots(&self) -> [&EventSlot; 4] {
        [&self.rotary, &self.push, &self.alarm, &self.timer]
    }
}

fn on_rotary_press(events: &Events) {
    events.rotary.post(Event::RotaryPress);
}

fn on_push_press(events: &Events) {
    events.push.post(Event::PushPress);
}

pub type Buttons<B> =
    SharedButtons<<B as Board>::PushButton, <B as Board>::RotaryButton, Events>;

pub struct App<B: Board> {
    buttons: &'static Buttons<B>,
    events: &'static Events,
    red: Led<B::RedLed>,
    yellow: Led<B::YellowLed>,
    display: B::Display,
    clock: AlarmClock,
    /// Set while the current minute already raised the alarm
    alarm_latched: bool,
    fan_speed: Option<&'static FanSpeed>,
    fan_rpm: Option<u16>,
}

/// Effects of the state machine, carried out on the board and the scheduler
struct AppPort<'a, B: Board> {
    scheduler: &'a Scheduler<App<B>>,
    red: &'a mut Led<B::RedLed>,
    yellow: &'a mut Led<B::YellowLed>,
    display: &'a mut B::Display,
}

impl<'a, B: Board> ClockPort for AppPort<'a, B> {
    fn system_time(&self) -> ClockTime {
        self.scheduler.time()
    }

    fn set_system_time(&mut self, millis: u32) {
        self.scheduler.set_time(millis);
        log_info!("time set to {}", ClockTime::from_millis(millis).short());
    }

    fn start_alarm(&mut self) {
        schedule(
            self.scheduler,
            Task::periodic(ALARM_BLINK_TASK, alarm_blink_task::<B>, ALARM_BLINK_MS),
        );
        schedule(
            self.scheduler,
            Task::once(ALARM_TIMEOUT_TASK, alarm_timeout_task::<B>, ALARM_TIMEOUT_MS),
        );
        self.red.on().ok();
        log_info!("alarm");
    }

    fn stop_alarm(&mut self) {
        self.scheduler.remove(ALARM_TIMEOUT_TASK);
        self.scheduler.remove(ALARM_BLINK_TASK);
        self.red.off().ok();
        log_info!("alarm stopped");
    }

    fn set_alarm_indicator(&mut self, armed: bool) {
        self.yellow.set(armed).ok();
    }

    fn render(&mut self, screen: &Screen) {
        display::render(self.display, screen).ok();
    }
}

fn schedule<C>(scheduler: &Scheduler<C>, task: Task<C>) {
    match scheduler.add(task) {
        Ok(()) => {}
        Err(ScheduleError::AlreadyScheduled) => {
            log_warn!("task {} already scheduled", task.id.0)
        }
        Err(ScheduleError::RegistryFull) => log_warn!("no slot for task {}", task.id.0),
    }
}

fn debounce_task<B: Board>(_: &Scheduler<App<B>>, app: &mut App<B>, _: usize) {
    app.buttons.check_state(app.events);
}

fn clock_task<B: Board>(scheduler: &Scheduler<App<B>>, app: &mut App<B>, _: usize) {
    app.step(scheduler);
}

fn alarm_blink_task<B: Board>(_: &Scheduler<App<B>>, app: &mut App<B>, _: usize) {
    // May still run once in the scan that stopped the alarm
    if app.clock.state() == ClockState::Alarm {
        app.red.toggle().ok();
    }
}

fn alarm_timeout_task<B: Board>(_: &Scheduler<App<B>>, app: &mut App<B>, _: usize) {
    app.events.timer.post(Event::TimerElapsed);
}

fn fan_report_task<B: Board>(_: &Scheduler<App<B>>, app: &mut App<B>, _: usize) {
    if let Some(speed) = app.fan_speed {
        let rpm = speed.filtered();
        app.fan_rpm = Some(rpm);
        log_info!("fan {} rpm", rpm);
    }
}

/// Register the tasks every appliance runs; the debounce task only when the
/// buttons are sampled by it
fn register_tasks<B: Board>(
    scheduler: &Scheduler<App<B>>,
    driver: ButtonDriver,
) -> Result<(), ScheduleError> {
    if driver == ButtonDriver::Task {
        scheduler.add(Task::periodic(
            DEBOUNCE_TASK,
            debounce_task::<B>,
            BUTTON_DEBOUNCE_MS,
        ))?;
    }
    scheduler.add(Task::periodic(CLOCK_TASK, clock_task::<B>, CLOCK_TASK_MS))
}

impl<B: Board> App<B> {
    /// Wire the installed button handler to the event slots, enter the state
    /// machine and register the clock task, plus the debounce task when
    /// `driver` is `ButtonDriver::Task`.
    pub fn start(
        scheduler: &Scheduler<Self>,
        buttons: &'static Buttons<B>,
        events: &'static Events,
        driver: ButtonDriver,
        mut red: Led<B::RedLed>,
        mut yellow: Led<B::YellowLed>,
        mut display: B::Display,
    ) -> Result<Self, ScheduleError> {
        let mode = buttons.with(|handler| {
            handler.set_rotary_callback(Some(on_rotary_press));
            handler.set_push_callback(Some(on_push_press));
            handler.mode()
        });
        match mode {
            None => log_warn!("no button handler installed"),
            Some(mode) if mode != driver.mode() => log_warn!("button mode does not fit driver"),
            Some(_) => {}
        }

        let clock = AlarmClock::start(&mut AppPort {
            scheduler,
            red: &mut red,
            yellow: &mut yellow,
            display: &mut display,
        });

        if let Err(err) = register_tasks(scheduler, driver) {
            log_error!("task registration failed");
            return Err(err);
        }

        log_info!("alarm clock started");
        Ok(Self {
            buttons,
            events,
            red,
            yellow,
            display,
            clock,
            alarm_latched: false,
            fan_speed: None,
            fan_rpm: None,
        })
    }

    /// Report the filtered speed of `speed` every `FAN_REPORT_MS`
    pub fn monitor_fan(
        &mut self,
        scheduler: &Scheduler<Self>,
        speed: &'static FanSpeed,
    ) -> Result<(), ScheduleError> {
        self.fan_speed = Some(speed);
        scheduler.add(Task::periodic(
            FAN_REPORT_TASK,
            fan_report_task::<B>,
            FAN_REPORT_MS,
        ))
    }

    /// One run of the clock task
    fn step(&mut self, scheduler: &Scheduler<Self>) {
        self.poll_alarm(&scheduler.time());

        let mut port = AppPort {
            scheduler,
            red: &mut self.red,
            yellow: &mut self.yellow,
            display: &mut self.display,
        };

        let mut dispatched = false;
        for slot in self.events.slots() {
            let event = slot.take();
            if event == Event::NoEvent {
                continue;
            }
            self.clock.dispatch(&mut port, event);
            dispatched = true;
        }

        if !dispatched {
            self.clock.dispatch(&mut port, Event::NoEvent);
        }
    }

    /// Raise `AlarmTime` once per matching minute
    fn poll_alarm(&mut self, now: &ClockTime) {
        if !self.clock.alarm_due(now) {
            self.alarm_latched = false;
        } else if !self.alarm_latched {
            self.alarm_latched = true;
            self.events.alarm.post(Event::AlarmTime);
        }
    }

    pub fn clock(&self) -> &AlarmClock {
        &self.clock
    }

    pub fn events(&self) -> &'static Events {
        self.events
    }

    pub fn buttons(&self) -> &'static Buttons<B> {
        self.buttons
    }

    /// Last filtered fan speed reported, if the fan is monitored
    pub fn fan_rpm(&self) -> Option<u16> {
        self.fan_rpm
    }

    pub fn red_led(&self) -> &Led<B::RedLed> {
        &self.red
    }

    pub fn yellow_led(&self) -> &Led<B::YellowLed> {
        &self.yellow
    }

    pub fn display(&self) -> &B::Display {
        &self.display
    }
}
