//! Alarm clock state machine
//!
//! ```text
//! SetSystemHour -> SetSystemMinute -> NormalAlarmDisabled <-> NormalAlarmEnabled
//!                                          |                    |        ^
//!                                          v                    v        |
//!                                     SetAlarmHour           Alarm ------+
//!                                          |
//!                                          v
//!                                     SetAlarmMinute -> back to the active Normal state
//! ```
//!
//! The rotary button edits the field of the setting states and toggles the
//! alarm in normal operation. The push button moves to the next state.
//! Hardware effects (clock, alarm tasks, LEDs, display) go through a
//! [`ClockPort`], so the machine runs unchanged on the host.

use super::{Event, Fsm, Response, State};
use crate::logger::log_debug;
use crate::rtos::ClockTime;

/// What the display shows for the current state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// A time being edited, rendered `HH:MM`
    Edit { title: &'static str, time: ClockTime },
    /// The running clock, rendered `HH:MM:SS`
    Live { title: &'static str, time: ClockTime },
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Edit { title, .. } | Screen::Live { title, .. } => title,
        }
    }

    pub fn time(&self) -> ClockTime {
        match self {
            Screen::Edit { time, .. } | Screen::Live { time, .. } => *time,
        }
    }
}

/// Everything the state machine does to the outside world
pub trait ClockPort {
    /// Current time of day
    fn system_time(&self) -> ClockTime;

    /// Override the time of day, in milliseconds since midnight
    fn set_system_time(&mut self, millis: u32);

    /// Start sounding the alarm (blink task, timeout task, red LED)
    fn start_alarm(&mut self);

    /// Undo everything `start_alarm` did
    fn stop_alarm(&mut self);

    /// Show whether the alarm is armed
    fn set_alarm_indicator(&mut self, armed: bool);

    fn render(&mut self, screen: &Screen);
}

/// Data owned by the machine across states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockData {
    pub alarm_enabled: bool,
    /// Scratch value for whichever time is being edited
    pub time_set: ClockTime,
    /// Armed alarm time
    pub alarm_time: ClockTime,
}

/// Borrowed view handed to the state handlers
pub struct ClockContext<'a, P> {
    pub data: &'a mut ClockData,
    pub port: &'a mut P,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    SetSystemHour,
    SetSystemMinute,
    NormalAlarmDisabled,
    NormalAlarmEnabled,
    Alarm,
    SetAlarmHour,
    SetAlarmMinute,
}

impl ClockState {
    pub fn title(&self) -> &'static str {
        match self {
            ClockState::SetSystemHour => "Set System Time: Hour",
            ClockState::SetSystemMinute => "Set System Time: Minute",
            ClockState::NormalAlarmDisabled => "Clock, alarm disabled",
            ClockState::NormalAlarmEnabled => "Clock, alarm enabled",
            ClockState::Alarm => "Alarm",
            ClockState::SetAlarmHour => "Set Alarm Time: Hour",
            ClockState::SetAlarmMinute => "Set Alarm Time: Minute",
        }
    }

    fn screen<P: ClockPort>(&self, ctx: &ClockContext<'_, P>) -> Screen {
        let title = self.title();
        match self {
            ClockState::SetSystemHour
            | ClockState::SetSystemMinute
            | ClockState::SetAlarmHour
            | ClockState::SetAlarmMinute => Screen::Edit {
                title,
                time: ctx.data.time_set,
            },
            ClockState::NormalAlarmDisabled
            | ClockState::NormalAlarmEnabled
            | ClockState::Alarm => Screen::Live {
                title,
                time: ctx.port.system_time(),
            },
        }
    }

    fn normal(alarm_enabled: bool) -> Self {
        if alarm_enabled {
            ClockState::NormalAlarmEnabled
        } else {
            ClockState::NormalAlarmDisabled
        }
    }

    fn react<P: ClockPort>(self, ctx: &mut ClockContext<'_, P>, event: Event) -> Response<Self> {
        use ClockState::*;

        match (self, event) {
            (SetSystemHour, Event::Entry) => {
                ctx.data.time_set = ClockTime::MIDNIGHT;
                Response::Handled
            }
            (SetSystemHour, Event::RotaryPress) | (SetAlarmHour, Event::RotaryPress) => {
                ctx.data.time_set.next_hour();
                Response::Handled
            }
            (SetSystemHour, Event::PushPress) => Response::Transition(SetSystemMinute),

            (SetSystemMinute, Event::RotaryPress) | (SetAlarmMinute, Event::RotaryPress) => {
                ctx.data.time_set.next_minute();
                Response::Handled
            }
            (SetSystemMinute, Event::PushPress) => Response::Transition(NormalAlarmDisabled),
            (SetSystemMinute, Event::Exit) => {
                ctx.port.set_system_time(ctx.data.time_set.to_millis());
                ctx.data.time_set = ClockTime::MIDNIGHT;
                Response::Handled
            }

            (NormalAlarmDisabled, Event::Entry) => {
                ctx.port.set_alarm_indicator(false);
                Response::Handled
            }
            (NormalAlarmDisabled, Event::RotaryPress) => Response::Transition(NormalAlarmEnabled),

            (NormalAlarmEnabled, Event::Entry) => {
                ctx.port.set_alarm_indicator(true);
                Response::Handled
            }
            (NormalAlarmEnabled, Event::RotaryPress) => Response::Transition(NormalAlarmDisabled),
            (NormalAlarmEnabled, Event::AlarmTime) => Response::Transition(Alarm),

            (NormalAlarmDisabled, Event::PushPress) | (NormalAlarmEnabled, Event::PushPress) => {
                Response::Transition(SetAlarmHour)
            }

            (Alarm, Event::Entry) => {
                ctx.port.start_alarm();
                Response::Handled
            }
            (Alarm, Event::RotaryPress | Event::PushPress | Event::TimerElapsed) => {
                Response::Transition(NormalAlarmEnabled)
            }
            (Alarm, Event::Exit) => {
                ctx.port.stop_alarm();
                Response::Handled
            }

            (SetAlarmHour, Event::Entry) => {
                ctx.data.time_set = ctx.data.alarm_time;
                Response::Handled
            }
            (SetAlarmHour, Event::PushPress) => Response::Transition(SetAlarmMinute),

            (SetAlarmMinute, Event::PushPress) => {
                Response::Transition(Self::normal(ctx.data.alarm_enabled))
            }
            (SetAlarmMinute, Event::Exit) => {
                let edited = ctx.data.time_set;
                ctx.data.alarm_time = ClockTime::hm(edited.hour, edited.minute);
                ctx.data.time_set = ClockTime::MIDNIGHT;
                Response::Handled
            }

            _ => Response::Ignored,
        }
    }
}

impl<'a, P: ClockPort> State<ClockContext<'a, P>> for ClockState {
    type Event = Event;

    fn handle(self, ctx: &mut ClockContext<'a, P>, event: Event) -> Response<Self> {
        match self {
            ClockState::NormalAlarmDisabled => ctx.data.alarm_enabled = false,
            ClockState::NormalAlarmEnabled => ctx.data.alarm_enabled = true,
            _ => {}
        }

        let response = self.react(ctx, event);

        if event != Event::Exit && !response.is_transition() {
            let screen = self.screen(ctx);
            ctx.port.render(&screen);
        }

        response
    }
}

/// The appliance's state machine together with its data
pub struct AlarmClock {
    fsm: Fsm<ClockState>,
    data: ClockData,
}

impl AlarmClock {
    /// Enter `SetSystemHour`; the time is always entered after power-up
    pub fn start<P: ClockPort>(port: &mut P) -> Self {
        Self::start_in(ClockState::SetSystemHour, ClockData::default(), port)
    }

    /// Enter `initial` with preset data
    pub fn start_in<P: ClockPort>(initial: ClockState, mut data: ClockData, port: &mut P) -> Self {
        let fsm = Fsm::init(
            initial,
            &mut ClockContext {
                data: &mut data,
                port,
            },
        );
        Self { fsm, data }
    }

    pub fn dispatch<P: ClockPort>(&mut self, port: &mut P, event: Event) -> Response<ClockState> {
        let mut ctx = ClockContext {
            data: &mut self.data,
            port,
        };
        let response = self.fsm.dispatch(&mut ctx, event);

        if let Response::Transition(next) = response {
            log_debug!("fsm: {}", next.title());
        }
        response
    }

    pub fn state(&self) -> ClockState {
        self.fsm.state()
    }

    pub fn data(&self) -> &ClockData {
        &self.data
    }

    /// Whether the armed alarm time matches `now` to the minute
    pub fn alarm_due(&self, now: &ClockTime) -> bool {
        self.data.alarm_enabled && self.data.alarm_time.same_minute(now)
    }
}
