//! Event dispatch for state machines whose states form a closed enum
//!
//! A state handles an event and answers with a [`Response`]. When the answer
//! is a transition, [`Fsm::dispatch`] brackets it: the old state sees `EXIT`,
//! then the new state sees `ENTRY`, with nothing in between.

pub mod alarm_clock;
pub mod event;

pub use event::{Event, EventSlot};

/// Outcome of handling one event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response<S> {
    Handled,
    Ignored,
    Transition(S),
    /// Malformed input; the current state is kept
    Error,
}

impl<S> Response<S> {
    pub fn is_transition(&self) -> bool {
        matches!(self, Response::Transition(_))
    }
}

/// Event type carrying the two lifecycle signals the dispatcher synthesizes
pub trait Signal: Copy + PartialEq {
    const ENTRY: Self;
    const EXIT: Self;

    fn is_lifecycle(&self) -> bool {
        *self == Self::ENTRY || *self == Self::EXIT
    }
}

/// One variant of a closed set of states, handling events with context `C`
pub trait State<C>: Copy {
    type Event: Signal;

    fn handle(self, ctx: &mut C, event: Self::Event) -> Response<Self>;
}

pub struct Fsm<S> {
    state: S,
}

impl<S: Copy> Fsm<S> {
    /// Enter `initial`. Only the `ENTRY` half runs; there is no state to exit.
    pub fn init<C>(initial: S, ctx: &mut C) -> Self
    where
        S: State<C>,
    {
        let _ = initial.handle(ctx, <S::Event as Signal>::ENTRY);
        Self { state: initial }
    }

    pub fn state(&self) -> S {
        self.state
    }

    /// Deliver `event` to the current state.
    ///
    /// `ENTRY` and `EXIT` are reserved for the dispatcher; passing one in is
    /// answered with [`Response::Error`] and no state is called.
    pub fn dispatch<C>(&mut self, ctx: &mut C, event: S::Event) -> Response<S>
    where
        S: State<C>,
    {
        if event.is_lifecycle() {
            return Response::Error;
        }

        let previous = self.state;
        let response = previous.handle(ctx, event);

        if let Response::Transition(next) = response {
            self.state = next;
            let _ = previous.handle(ctx, <S::Event as Signal>::EXIT);
            let _ = next.handle(ctx, <S::Event as Signal>::ENTRY);
        }

        response
    }
}
