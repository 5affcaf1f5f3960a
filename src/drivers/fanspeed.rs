//! Fan speed from the tacho signal
//!
//! Each tacho pulse yields one RPM reading from the Timer1 counts since the
//! previous pulse. Timer1 runs freely in CTC mode: the interval is the whole
//! auxiliary ticks seen since the last pulse plus the difference of the
//! counter values at both pulses. The counter is only read, never reset.
//! With no pulse for a second the fan counts as stalled and a zero reading is
//! recorded. The last `SAMPLES` readings are kept; the filtered speed is their
//! median.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::config::{AUX_TICK_MS, TIMER1_COMPARE};

/// Readings kept for the median
pub const SAMPLES: usize = 7;

/// Timer1 clock during speed measurement: 16 MHz / 256
pub const TACHO_TIMER_HZ: u32 = 62_500;

/// Tacho pulses per revolution
pub const PULSES_PER_REV: u32 = 2;

/// Timer1 counts in one auxiliary tick (CTC wraps after the compare value)
pub const COUNTS_PER_AUX_TICK: u16 = TIMER1_COMPARE + 1;

/// Auxiliary ticks without a pulse before the fan counts as stalled
pub const STALL_AUX_TICKS: u16 = (1000 / AUX_TICK_MS) as u16;

/// RPM for `ticks` timer counts between two tacho pulses. Zero ticks reads as
/// a stalled fan.
pub fn rpm_from_ticks(ticks: u16) -> u16 {
    if ticks == 0 {
        return 0;
    }
    let rpm = 60 / PULSES_PER_REV * TACHO_TIMER_HZ / ticks as u32;
    rpm.min(u16::MAX as u32) as u16
}

/// `k`-th smallest element (0-based) by in-place quickselect with a Lomuto
/// partition around the last element. The slice is reordered.
pub fn quickselect(values: &mut [u16], k: usize) -> Option<u16> {
    if k >= values.len() {
        return None;
    }

    let mut left = 0;
    let mut right = values.len() - 1;
    loop {
        let pivot = partition(values, left, right);
        if pivot == k {
            return Some(values[pivot]);
        } else if pivot < k {
            left = pivot + 1;
        } else {
            right = pivot - 1;
        }
    }
}

fn partition(values: &mut [u16], left: usize, right: usize) -> usize {
    let pivot = values[right];
    let mut store = left;
    for j in left..right {
        if values[j] <= pivot {
            values.swap(store, j);
            store += 1;
        }
    }
    values.swap(store, right);
    store
}

struct Samples {
    ring: [u16; SAMPLES],
    index: usize,
    recent: u16,
    /// Auxiliary ticks since the last pulse or stall reading
    elapsed: u16,
    /// Timer1 count at the last pulse
    last_counter: u16,
    /// The next auxiliary tick was already counted by a pulse
    skip_tick: bool,
}

impl Samples {
    const fn new() -> Self {
        Self {
            ring: [0; SAMPLES],
            index: 0,
            recent: 0,
            elapsed: 0,
            last_counter: 0,
            skip_tick: false,
        }
    }

    fn record(&mut self, rpm: u16) {
        self.recent = rpm;
        self.ring[self.index] = rpm;
        self.index = (self.index + 1) % SAMPLES;
        self.elapsed = 0;
    }
}

/// Readings shared between the tacho interrupt and the application
pub struct FanSpeed {
    samples: Mutex<RefCell<Samples>>,
}

impl FanSpeed {
    pub const fn new() -> Self {
        Self {
            samples: Mutex::new(RefCell::new(Samples::new())),
        }
    }

    pub fn record(&self, rpm: u16) {
        critical_section::with(|cs| self.samples.borrow_ref_mut(cs).record(rpm));
    }

    /// Tacho pulse, with `counter` the Timer1 count at the pulse and
    /// `compare_pending` the state of its compare match flag.
    ///
    /// A pending compare match with a low counter means Timer1 wrapped before
    /// the pulse but its tick has not been handled yet; that tick is counted
    /// here and skipped when it arrives. With a high counter the wrap came
    /// after the counter was read and belongs to the next interval.
    pub fn on_pulse(&self, counter: u16, compare_pending: bool) {
        let wrapped = compare_pending && counter < COUNTS_PER_AUX_TICK / 2;
        critical_section::with(|cs| {
            let mut samples = self.samples.borrow_ref_mut(cs);
            let periods = samples.elapsed as u32 + wrapped as u32;
            let ticks = (periods * COUNTS_PER_AUX_TICK as u32 + counter as u32)
                .saturating_sub(samples.last_counter as u32);
            samples.last_counter = counter;
            samples.skip_tick = wrapped;
            samples.record(rpm_from_ticks(ticks.min(u16::MAX as u32) as u16));
        });
    }

    /// Auxiliary timer tick; records a stall after a second without pulses
    pub fn on_aux_tick(&self) {
        critical_section::with(|cs| {
            let mut samples = self.samples.borrow_ref_mut(cs);
            if samples.skip_tick {
                samples.skip_tick = false;
                return;
            }
            samples.elapsed += 1;
            if samples.elapsed >= STALL_AUX_TICKS {
                // Stall readings are taken right at a wrap
                samples.last_counter = 0;
                samples.record(0);
            }
        });
    }

    /// Last reading
    pub fn recent(&self) -> u16 {
        critical_section::with(|cs| self.samples.borrow_ref(cs).recent)
    }

    /// Median of the last `SAMPLES` readings
    pub fn filtered(&self) -> u16 {
        let mut ring = critical_section::with(|cs| self.samples.borrow_ref(cs).ring);
        quickselect(&mut ring, SAMPLES / 2).unwrap_or(0)
    }
}

impl Default for FanSpeed {
    fn default() -> Self {
        Self::new()
    }
}
