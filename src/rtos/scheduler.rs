//! Cooperative task scheduler driven by the 1 ms tick
//!
//! Tasks live in a fixed arena of `MAX_TASKS` slots. The tick interrupt only
//! counts down and marks tasks pending; the main loop runs pending tasks to
//! completion. Every registry access happens inside a critical section, and
//! no borrow of the registry is held while a task body runs, so tasks may add
//! and remove tasks (themselves included).

use core::cell::RefCell;

use critical_section::Mutex;

use super::clock::{ClockTime, SystemClock};
use super::task::{Task, TaskFunction, TaskId};
use crate::config::MAX_TASKS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// A task with the same id is already registered
    AlreadyScheduled,
    /// All slots are in use
    RegistryFull,
}

pub type Result<T> = core::result::Result<T, ScheduleError>;

/// Registered task plus the bookkeeping owned by the scheduler
struct Entry<C> {
    task: Task<C>,
    remaining: u16,
    pending: bool,
}

impl<C> Clone for Entry<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Entry<C> {}

/// Work item taken out of the registry for one dispatch scan
type Job<C> = (TaskFunction<C>, usize);

struct Registry<C> {
    slots: [Option<Entry<C>>; MAX_TASKS],
}

impl<C> Registry<C> {
    const fn new() -> Self {
        Self {
            slots: [None; MAX_TASKS],
        }
    }

    fn find(&self, id: TaskId) -> Option<&Entry<C>> {
        self.slots.iter().flatten().find(|entry| entry.task.id == id)
    }

    fn add(&mut self, task: Task<C>) -> Result<()> {
        if self.find(task.id).is_some() {
            return Err(ScheduleError::AlreadyScheduled);
        }

        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(ScheduleError::RegistryFull)?;

        *slot = Some(Entry {
            task,
            remaining: task.expire,
            pending: false,
        });
        Ok(())
    }

    fn remove(&mut self, id: TaskId) {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(entry) if entry.task.id == id) {
                *slot = None;
                return;
            }
        }
    }

    fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    fn tick(&mut self) {
        for entry in self.slots.iter_mut().flatten() {
            entry.remaining = entry.remaining.saturating_sub(1);
            if entry.remaining == 0 {
                entry.pending = true;
                entry.remaining = entry.task.period;
            }
        }
    }

    /// Clear every pending flag and collect the tasks to run. One-shot tasks
    /// leave the registry here.
    fn take_pending(&mut self) -> [Option<Job<C>>; MAX_TASKS] {
        let mut batch = [None; MAX_TASKS];

        for (slot, job) in self.slots.iter_mut().zip(batch.iter_mut()) {
            let Some(entry) = slot.as_mut() else {
                continue;
            };
            if !entry.pending {
                continue;
            }

            entry.pending = false;
            *job = Some((entry.task.function, entry.task.param));

            if entry.task.is_one_shot() {
                *slot = None;
            }
        }

        batch
    }
}

pub struct Scheduler<C> {
    registry: Mutex<RefCell<Registry<C>>>,
    clock: SystemClock,
}

impl<C> Scheduler<C> {
    pub const fn new() -> Self {
        Self {
            registry: Mutex::new(RefCell::new(Registry::new())),
            clock: SystemClock::new(),
        }
    }

    /// Register a task. It first becomes due after `task.expire` ticks.
    ///
    /// Fails without touching the registry if a task with the same id is
    /// already registered or no slot is free.
    pub fn add(&self, task: Task<C>) -> Result<()> {
        critical_section::with(|cs| self.registry.borrow_ref_mut(cs).add(task))
    }

    /// Deregister a task. Unknown ids are ignored.
    ///
    /// A task already collected by the running dispatch scan still runs once.
    pub fn remove(&self, id: TaskId) {
        critical_section::with(|cs| self.registry.borrow_ref_mut(cs).remove(id))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        critical_section::with(|cs| self.registry.borrow_ref(cs).find(id).is_some())
    }

    /// Whether the task is due and waiting for the dispatch loop
    pub fn is_pending(&self, id: TaskId) -> bool {
        critical_section::with(|cs| {
            self.registry
                .borrow_ref(cs)
                .find(id)
                .map_or(false, |entry| entry.pending)
        })
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.registry.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tick handler, called from the 1 ms timer interrupt.
    ///
    /// Counts every task down, marks expired ones pending and advances the
    /// system clock.
    pub fn tick(&self) {
        critical_section::with(|cs| {
            self.registry.borrow_ref_mut(cs).tick();
            self.clock.advance(cs);
        });
    }

    /// One scan over the registry: run every task that was pending when the
    /// scan started. Returns the number of tasks run.
    pub fn dispatch(&self, ctx: &mut C) -> usize {
        let batch = critical_section::with(|cs| self.registry.borrow_ref_mut(cs).take_pending());

        let mut executed = 0;
        for (function, param) in batch.into_iter().flatten() {
            function(self, ctx, param);
            executed += 1;
        }
        executed
    }

    /// One pass of the dispatch loop: a scan, then `idle` if nothing ran.
    /// Returns the number of tasks run.
    pub fn poll<F: FnOnce()>(&self, ctx: &mut C, idle: F) -> usize {
        let executed = self.dispatch(ctx);
        if executed == 0 {
            idle();
        }
        executed
    }

    /// Dispatch loop, idling the CPU between ticks. Never returns.
    pub fn run(&self, ctx: &mut C) -> ! {
        loop {
            self.poll(ctx, idle);
        }
    }

    /// Current time of day in milliseconds
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    pub fn time(&self) -> ClockTime {
        self.clock.time()
    }

    /// Override the time of day; values of a day or more reset it to 0
    pub fn set_time(&self, millis: u32) {
        self.clock.set(millis);
    }

    pub fn clock(&self) -> &SystemClock {
        &self.clock
    }
}

/// Sleep until the next interrupt. Sleep mode and enable bit are set at boot.
#[cfg(target_arch = "avr")]
fn idle() {
    avr_device::asm::sleep();
}

#[cfg(not(target_arch = "avr"))]
fn idle() {
    core::hint::spin_loop();
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    const A: TaskId = TaskId(1);
    const B: TaskId = TaskId(2);

    fn record(_: &Scheduler<Vec<usize>>, log: &mut Vec<usize>, param: usize) {
        log.push(param);
    }

    fn remove_b(scheduler: &Scheduler<Vec<usize>>, log: &mut Vec<usize>, param: usize) {
        scheduler.remove(B);
        log.push(param);
    }

    fn rearm(scheduler: &Scheduler<Vec<usize>>, log: &mut Vec<usize>, param: usize) {
        log.push(param);
        scheduler
            .add(Task::once(A, rearm, 2).with_param(param + 1))
            .unwrap();
    }

    fn ticks<C>(scheduler: &Scheduler<C>, n: usize) {
        for _ in 0..n {
            scheduler.tick();
        }
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        scheduler.add(Task::periodic(A, record, 3)).unwrap();
        assert_eq!(
            scheduler.add(Task::periodic(A, record, 7)),
            Err(ScheduleError::AlreadyScheduled)
        );
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn full_registry_is_rejected() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        for id in 0..MAX_TASKS as u8 {
            scheduler.add(Task::periodic(TaskId(id), record, 1)).unwrap();
        }
        assert_eq!(
            scheduler.add(Task::periodic(TaskId(200), record, 1)),
            Err(ScheduleError::RegistryFull)
        );
        assert_eq!(scheduler.len(), MAX_TASKS);
    }

    #[test]
    fn freed_slot_is_reused() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        for id in 0..MAX_TASKS as u8 {
            scheduler.add(Task::periodic(TaskId(id), record, 1)).unwrap();
        }
        scheduler.remove(TaskId(3));
        assert!(scheduler.add(Task::periodic(TaskId(200), record, 1)).is_ok());
    }

    #[test]
    fn zero_expire_is_due_on_next_tick() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        scheduler
            .add(Task::periodic(A, record, 4).with_expire(0))
            .unwrap();
        scheduler.tick();
        assert!(scheduler.is_pending(A));
    }

    #[test]
    fn task_removed_earlier_in_scan_still_runs_once() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        scheduler
            .add(Task::periodic(A, remove_b, 1).with_param(1))
            .unwrap();
        scheduler
            .add(Task::periodic(B, record, 1).with_param(2))
            .unwrap();

        let mut log = Vec::new();
        scheduler.tick();
        assert_eq!(scheduler.dispatch(&mut log), 2);
        assert_eq!(log, [1, 2]);
        assert!(!scheduler.contains(B));

        scheduler.tick();
        scheduler.dispatch(&mut log);
        assert_eq!(log, [1, 2, 1]);
    }

    #[test]
    fn one_shot_may_rearm_itself() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        scheduler.add(Task::once(A, rearm, 1)).unwrap();

        let mut log = Vec::new();
        scheduler.tick();
        scheduler.dispatch(&mut log);
        assert!(scheduler.contains(A));
        assert!(!scheduler.is_pending(A));

        ticks(&scheduler, 2);
        scheduler.dispatch(&mut log);
        assert_eq!(log, [0, 1]);
    }

    #[test]
    fn dispatch_without_pending_runs_nothing() {
        let scheduler = Scheduler::<Vec<usize>>::new();
        scheduler.add(Task::periodic(A, record, 5)).unwrap();
        let mut log = Vec::new();
        ticks(&scheduler, 4);
        assert_eq!(scheduler.dispatch(&mut log), 0);
        assert!(log.is_empty());
    }
}
