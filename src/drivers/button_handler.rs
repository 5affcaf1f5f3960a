//! Push and rotary buttons of the SES board
//!
//! Both buttons are active low. A press is reported through a callback, either
//! after the debounce window settled (`DebounceMode::Sampled`, driven by a
//! periodic task) or straight from the pin-change interrupt
//! (`DebounceMode::Immediate`).

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::v2::InputPin;

use crate::config::DEBOUNCE_CHECKS;

/// Bit of the push button in a sample
pub const PUSH_MASK: u8 = 0x01;
/// Bit of the rotary button in a sample
pub const ROTARY_MASK: u8 = 0x02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceMode {
    /// Majority window sampled by `check_state`
    Sampled,
    /// Callbacks fired from `on_pin_change`, no filtering
    Immediate,
}

/// What drives the button callbacks on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonDriver {
    /// Pin-change interrupt, no debouncing
    PinChange,
    /// Debounce window sampled from the Timer1 interrupt
    Timer,
    /// Debounce window sampled by a scheduler task
    Task,
}

impl ButtonDriver {
    pub fn mode(self) -> DebounceMode {
        match self {
            ButtonDriver::PinChange => DebounceMode::Immediate,
            ButtonDriver::Timer | ButtonDriver::Task => DebounceMode::Sampled,
        }
    }
}

/// Called with the application context on a press
pub type ButtonCallback<C> = fn(&C);

/// Window of the last `N` samples, one bit per input.
///
/// An input counts as pressed once all `N` samples have its bit set. An
/// empty window does not compile:
///
/// ```compile_fail
/// use alarm_clock_firmware::drivers::Debouncer;
///
/// let _ = Debouncer::<0>::new();
/// ```
pub struct Debouncer<const N: usize> {
    history: [u8; N],
    index: usize,
    debounced: u8,
}

impl<const N: usize> Debouncer<N> {
    const WINDOW_NOT_EMPTY: () = assert!(N > 0, "debounce window needs at least one sample");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WINDOW_NOT_EMPTY;
        Self {
            history: [0; N],
            index: 0,
            debounced: 0,
        }
    }

    /// Push one sample, overwriting the oldest. Returns the inputs that just
    /// became pressed.
    pub fn sample(&mut self, raw: u8) -> u8 {
        self.history[self.index] = raw;
        self.index = (self.index + 1) % N;

        let state = self.history.iter().fold(0xFF, |acc, sample| acc & sample);
        let rising = state & !self.debounced;
        self.debounced = state;
        rising
    }

    /// Inputs currently considered pressed
    pub fn state(&self) -> u8 {
        self.debounced
    }
}

impl<const N: usize> Default for Debouncer<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ButtonHandler<P, R, C, const N: usize = DEBOUNCE_CHECKS> {
    push: P,
    rotary: R,
    mode: DebounceMode,
    debouncer: Debouncer<N>,
    on_push: Option<ButtonCallback<C>>,
    on_rotary: Option<ButtonCallback<C>>,
}

impl<P, R, C, const N: usize> ButtonHandler<P, R, C, N>
where
    P: InputPin,
    R: InputPin,
{
    /// Take the button pins. They must already be inputs with pull-ups.
    pub fn new(push: P, rotary: R, mode: DebounceMode) -> Self {
        Self {
            push,
            rotary,
            mode,
            debouncer: Debouncer::new(),
            on_push: None,
            on_rotary: None,
        }
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    /// Install the push button callback. `None` keeps the current one.
    pub fn set_push_callback(&mut self, callback: Option<ButtonCallback<C>>) {
        if callback.is_some() {
            self.on_push = callback;
        }
    }

    /// Install the rotary button callback. `None` keeps the current one.
    pub fn set_rotary_callback(&mut self, callback: Option<ButtonCallback<C>>) {
        if callback.is_some() {
            self.on_rotary = callback;
        }
    }

    /// Raw level; a failed read counts as released
    pub fn is_push_pressed(&self) -> bool {
        self.push.is_low().unwrap_or(false)
    }

    /// Raw level; a failed read counts as released
    pub fn is_rotary_pressed(&self) -> bool {
        self.rotary.is_low().unwrap_or(false)
    }

    fn raw_state(&self) -> u8 {
        let mut state = 0;
        if self.is_push_pressed() {
            state |= PUSH_MASK;
        }
        if self.is_rotary_pressed() {
            state |= ROTARY_MASK;
        }
        state
    }

    /// Sampling step of the debounce window. Call every `BUTTON_DEBOUNCE_MS`.
    pub fn check_state(&mut self, ctx: &C) {
        if self.mode != DebounceMode::Sampled {
            return;
        }
        let rising = self.debouncer.sample(self.raw_state());
        self.fire(rising, ctx);
    }

    /// Pin-change handler: every button currently down fires once
    pub fn on_pin_change(&self, ctx: &C) {
        if self.mode != DebounceMode::Immediate {
            return;
        }
        self.fire(self.raw_state(), ctx);
    }

    fn fire(&self, pressed: u8, ctx: &C) {
        if pressed & ROTARY_MASK != 0 {
            if let Some(callback) = self.on_rotary {
                callback(ctx);
            }
        }
        if pressed & PUSH_MASK != 0 {
            if let Some(callback) = self.on_push {
                callback(ctx);
            }
        }
    }

    /// Give the pins back
    pub fn release(self) -> (P, R) {
        (self.push, self.rotary)
    }
}

/// Button handler reachable from interrupt context.
///
/// Installed once at boot; the debounce task, the Timer1 handler or the
/// pin-change handler then drive it, each inside a critical section.
pub struct SharedButtons<P, R, C, const N: usize = DEBOUNCE_CHECKS> {
    handler: Mutex<RefCell<Option<ButtonHandler<P, R, C, N>>>>,
}

impl<P, R, C, const N: usize> SharedButtons<P, R, C, N> {
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(RefCell::new(None)),
        }
    }

    pub fn install(&self, handler: ButtonHandler<P, R, C, N>) {
        critical_section::with(|cs| *self.handler.borrow_ref_mut(cs) = Some(handler));
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.handler.borrow_ref(cs).is_some())
    }

    /// Run `f` on the installed handler. `None` if nothing is installed.
    pub fn with<T>(&self, f: impl FnOnce(&mut ButtonHandler<P, R, C, N>) -> T) -> Option<T> {
        critical_section::with(|cs| self.handler.borrow_ref_mut(cs).as_mut().map(f))
    }

    pub fn take(&self) -> Option<ButtonHandler<P, R, C, N>> {
        critical_section::with(|cs| self.handler.borrow_ref_mut(cs).take())
    }
}

impl<P, R, C, const N: usize> SharedButtons<P, R, C, N>
where
    P: InputPin,
    R: InputPin,
{
    pub fn check_state(&self, ctx: &C) {
        self.with(|handler| handler.check_state(ctx));
    }

    pub fn on_pin_change(&self, ctx: &C) {
        self.with(|handler| handler.on_pin_change(ctx));
    }
}

impl<P, R, C, const N: usize> Default for SharedButtons<P, R, C, N> {
    fn default() -> Self {
        Self::new()
    }
}
