use alarm_clock_firmware::fsm::alarm_clock::{
    AlarmClock, ClockData, ClockPort, ClockState, Screen,
};
use alarm_clock_firmware::fsm::{Event, Fsm, Response, State};
use alarm_clock_firmware::rtos::ClockTime;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    First,
    Second,
    Third,
}

type Trace = Vec<(Step, Event)>;

impl State<Trace> for Step {
    type Event = Event;

    fn handle(self, trace: &mut Trace, event: Event) -> Response<Self> {
        trace.push((self, event));
        match (self, event) {
            (Step::First, Event::PushPress) => Response::Transition(Step::Second),
            (Step::Second, Event::PushPress) => Response::Transition(Step::Third),
            (Step::Third, Event::PushPress) => Response::Transition(Step::Third),
            (_, Event::RotaryPress) => Response::Handled,
            _ => Response::Ignored,
        }
    }
}

#[test]
fn transition_is_bracketed_by_exit_then_entry() {
    let mut trace = Trace::new();
    let mut fsm = Fsm::init(Step::First, &mut trace);
    assert_eq!(trace, [(Step::First, Event::Entry)]);

    trace.clear();
    assert_eq!(
        fsm.dispatch(&mut trace, Event::PushPress),
        Response::Transition(Step::Second)
    );
    assert_eq!(
        trace,
        [
            (Step::First, Event::PushPress),
            (Step::First, Event::Exit),
            (Step::Second, Event::Entry),
        ]
    );
    assert_eq!(fsm.state(), Step::Second);
}

#[test]
fn self_transition_exits_and_reenters() {
    let mut trace = Trace::new();
    let mut fsm = Fsm::init(Step::Third, &mut trace);
    trace.clear();

    fsm.dispatch(&mut trace, Event::PushPress);
    assert_eq!(
        trace,
        [
            (Step::Third, Event::PushPress),
            (Step::Third, Event::Exit),
            (Step::Third, Event::Entry),
        ]
    );
}

#[test]
fn handled_and_ignored_events_stay_put() {
    let mut trace = Trace::new();
    let mut fsm = Fsm::init(Step::First, &mut trace);
    trace.clear();

    assert_eq!(fsm.dispatch(&mut trace, Event::RotaryPress), Response::Handled);
    assert_eq!(fsm.dispatch(&mut trace, Event::NoEvent), Response::Ignored);
    assert_eq!(fsm.state(), Step::First);
    assert_eq!(
        trace,
        [(Step::First, Event::RotaryPress), (Step::First, Event::NoEvent)]
    );
}

#[test]
fn injected_lifecycle_event_is_an_error() {
    let mut trace = Trace::new();
    let mut fsm = Fsm::init(Step::Second, &mut trace);
    trace.clear();

    assert_eq!(fsm.dispatch(&mut trace, Event::Exit), Response::Error);
    assert_eq!(fsm.state(), Step::Second);
    assert!(trace.is_empty());
}

/// Port with a clock that only moves when told to
#[derive(Default)]
struct Port {
    now: ClockTime,
    clock_writes: Vec<u32>,
    alarms_started: u32,
    alarms_stopped: u32,
    indicator: bool,
    screen: Option<Screen>,
}

impl ClockPort for Port {
    fn system_time(&self) -> ClockTime {
        self.now
    }

    fn set_system_time(&mut self, millis: u32) {
        self.clock_writes.push(millis);
        self.now = ClockTime::from_millis(millis);
    }

    fn start_alarm(&mut self) {
        self.alarms_started += 1;
    }

    fn stop_alarm(&mut self) {
        self.alarms_stopped += 1;
    }

    fn set_alarm_indicator(&mut self, armed: bool) {
        self.indicator = armed;
    }

    fn render(&mut self, screen: &Screen) {
        self.screen = Some(*screen);
    }
}

#[test]
fn leaving_alarm_minute_commits_alarm_not_system_time() {
    let mut port = Port {
        now: ClockTime::from_millis(12_345_678),
        ..Port::default()
    };
    let data = ClockData {
        alarm_enabled: true,
        time_set: ClockTime::hm(6, 44),
        alarm_time: ClockTime::hm(7, 0),
    };
    let mut clock = AlarmClock::start_in(ClockState::SetAlarmMinute, data, &mut port);

    clock.dispatch(&mut port, Event::RotaryPress);
    clock.dispatch(&mut port, Event::PushPress);

    assert_eq!(clock.state(), ClockState::NormalAlarmEnabled);
    assert_eq!(clock.data().alarm_time, ClockTime::hm(6, 45));
    assert!(port.clock_writes.is_empty());
    assert_eq!(port.now, ClockTime::from_millis(12_345_678));
    assert!(port.indicator);
}

#[test]
fn leaving_alarm_minute_returns_to_disarmed_clock() {
    let mut port = Port::default();
    let data = ClockData {
        alarm_enabled: false,
        ..ClockData::default()
    };
    let mut clock = AlarmClock::start_in(ClockState::SetAlarmMinute, data, &mut port);

    clock.dispatch(&mut port, Event::PushPress);
    assert_eq!(clock.state(), ClockState::NormalAlarmDisabled);
    assert!(!port.indicator);
}

#[test]
fn full_walk_through_the_states() {
    let mut port = Port::default();
    let mut clock = AlarmClock::start(&mut port);

    let walk = [
        (Event::PushPress, ClockState::SetSystemMinute),
        (Event::PushPress, ClockState::NormalAlarmDisabled),
        (Event::RotaryPress, ClockState::NormalAlarmEnabled),
        (Event::AlarmTime, ClockState::Alarm),
        (Event::TimerElapsed, ClockState::NormalAlarmEnabled),
        (Event::PushPress, ClockState::SetAlarmHour),
        (Event::PushPress, ClockState::SetAlarmMinute),
        (Event::PushPress, ClockState::NormalAlarmEnabled),
    ];
    for (event, expected) in walk {
        assert!(clock.dispatch(&mut port, event).is_transition());
        assert_eq!(clock.state(), expected);
    }

    assert_eq!(port.clock_writes, [0]);
    assert_eq!((port.alarms_started, port.alarms_stopped), (1, 1));
    assert_eq!(
        port.screen.map(|screen| screen.title()),
        Some("Clock, alarm enabled")
    );
}
