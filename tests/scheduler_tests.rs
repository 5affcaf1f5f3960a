//! Integration tests for the task scheduler and system clock

use alarm_clock_firmware::rtos::{ClockTime, Scheduler, Task, TaskId, DAY_MS};

type Log = Vec<(TaskId, u32)>;

fn record(scheduler: &Scheduler<Log>, log: &mut Log, param: usize) {
    log.push((TaskId(param as u8), scheduler.now()));
}

fn add_late_task(scheduler: &Scheduler<Log>, log: &mut Log, param: usize) {
    scheduler
        .add(Task::periodic(TaskId(9), record, 1).with_param(9))
        .unwrap();
    record(scheduler, log, param);
}

fn remove_self(scheduler: &Scheduler<Log>, log: &mut Log, param: usize) {
    scheduler.remove(TaskId(param as u8));
    record(scheduler, log, param);
}

/// Body long enough for two ticks to arrive while it runs
fn slow(scheduler: &Scheduler<Log>, log: &mut Log, param: usize) {
    record(scheduler, log, param);
    scheduler.tick();
    scheduler.tick();
}

fn task(id: u8, period: u16) -> Task<Log> {
    Task::periodic(TaskId(id), record, period).with_param(id as usize)
}

fn ids(log: &Log) -> Vec<u8> {
    log.iter().map(|(id, _)| id.0).collect()
}

#[test]
fn clock_advances_one_millisecond_per_tick_and_wraps() {
    for &(start, ticks) in &[(0, 1), (1_000, 5_000), (DAY_MS - 3, 5), (DAY_MS - 1, 1)] {
        let scheduler = Scheduler::<Log>::new();
        scheduler.set_time(start);
        for _ in 0..ticks {
            scheduler.tick();
        }
        assert_eq!(scheduler.now(), (start + ticks) % DAY_MS);
    }
}

#[test]
fn last_millisecond_rolls_over_to_midnight() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.set_time(
        ClockTime {
            hour: 23,
            minute: 59,
            second: 59,
            milli: 999,
        }
        .to_millis(),
    );
    scheduler.tick();
    assert_eq!(scheduler.time(), ClockTime::MIDNIGHT);
}

#[test]
fn out_of_range_time_resets_clock() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.set_time(5_000);
    scheduler.set_time(DAY_MS);
    assert_eq!(scheduler.now(), 0);
}

#[test]
fn periodic_task_runs_every_period_after_first_expiry() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.add(task(1, 4).with_expire(3)).unwrap();

    let mut log = Log::new();
    for _ in 0..23 {
        scheduler.tick();
        scheduler.dispatch(&mut log);
    }

    let runs: Vec<u32> = log.iter().map(|&(_, at)| at).collect();
    assert_eq!(runs, [3, 7, 11, 15, 19, 23]);
}

#[test]
fn one_shot_runs_once_and_leaves_registry() {
    let scheduler = Scheduler::<Log>::new();
    scheduler
        .add(Task::once(TaskId(2), record, 2).with_param(2))
        .unwrap();

    let mut log = Log::new();
    scheduler.tick();
    assert!(!scheduler.is_pending(TaskId(2)));
    scheduler.tick();
    assert!(scheduler.is_pending(TaskId(2)));

    assert_eq!(scheduler.dispatch(&mut log), 1);
    assert!(!scheduler.contains(TaskId(2)));

    for _ in 0..10 {
        scheduler.tick();
        scheduler.dispatch(&mut log);
    }
    assert_eq!(ids(&log), [2]);
}

#[test]
fn remove_is_idempotent() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.add(task(1, 2)).unwrap();
    scheduler.add(task(2, 2)).unwrap();
    scheduler.tick();
    scheduler.tick();

    scheduler.remove(TaskId(1));
    scheduler.remove(TaskId(1));
    scheduler.remove(TaskId(42));

    assert_eq!(scheduler.len(), 1);
    assert!(scheduler.is_pending(TaskId(2)));

    let mut log = Log::new();
    scheduler.dispatch(&mut log);
    assert_eq!(ids(&log), [2]);
}

#[test]
fn remove_on_empty_registry_is_harmless() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.remove(TaskId(0));
    assert!(scheduler.is_empty());
}

#[test]
fn registering_from_a_callback_keeps_other_pending_flags() {
    let scheduler = Scheduler::<Log>::new();
    scheduler
        .add(Task::periodic(TaskId(1), add_late_task, 1).with_param(1))
        .unwrap();
    scheduler.add(task(2, 1)).unwrap();

    let mut log = Log::new();
    scheduler.tick();
    assert_eq!(scheduler.dispatch(&mut log), 2);
    assert_eq!(ids(&log), [1, 2]);
    assert!(scheduler.contains(TaskId(9)));
    assert!(!scheduler.is_pending(TaskId(9)));
}

#[test]
fn three_tasks_after_ten_ticks() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.add(task(1, 10)).unwrap();
    scheduler
        .add(Task::once(TaskId(2), record, 10).with_param(2))
        .unwrap();
    scheduler.add(task(3, 5)).unwrap();

    for _ in 0..10 {
        scheduler.tick();
    }
    assert!(scheduler.is_pending(TaskId(1)));
    assert!(scheduler.is_pending(TaskId(2)));
    assert!(scheduler.is_pending(TaskId(3)));

    let mut log = Log::new();
    assert_eq!(scheduler.dispatch(&mut log), 3);
    assert_eq!(ids(&log), [1, 2, 3]);
    assert!(!scheduler.contains(TaskId(2)));
    assert_eq!(scheduler.len(), 2);
}

#[test]
fn periodic_task_can_remove_itself() {
    let scheduler = Scheduler::<Log>::new();
    scheduler
        .add(Task::periodic(TaskId(1), remove_self, 1).with_param(1))
        .unwrap();
    scheduler.add(task(2, 1)).unwrap();

    let mut log = Log::new();
    for _ in 0..5 {
        scheduler.tick();
        scheduler.dispatch(&mut log);
    }

    assert_eq!(ids(&log), [1, 2, 2, 2, 2, 2]);
    assert!(!scheduler.contains(TaskId(1)));
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn ticks_during_a_long_callback_are_kept() {
    let scheduler = Scheduler::<Log>::new();
    scheduler
        .add(Task::periodic(TaskId(1), slow, 1).with_param(1))
        .unwrap();
    scheduler.add(task(2, 2)).unwrap();

    let mut log = Log::new();
    scheduler.tick();
    assert_eq!(scheduler.dispatch(&mut log), 1);

    assert_eq!(scheduler.now(), 3);
    assert!(scheduler.is_pending(TaskId(1)));
    assert!(scheduler.is_pending(TaskId(2)));

    assert_eq!(scheduler.dispatch(&mut log), 2);
    assert_eq!(log, [(TaskId(1), 1), (TaskId(1), 3), (TaskId(2), 5)]);
}

#[test]
fn poll_idles_only_when_nothing_ran() {
    let scheduler = Scheduler::<Log>::new();
    scheduler.add(task(1, 2)).unwrap();

    let mut log = Log::new();
    let mut idled = 0;
    for _ in 0..4 {
        scheduler.tick();
        scheduler.poll(&mut log, || idled += 1);
    }

    assert_eq!(ids(&log), [1, 1]);
    assert_eq!(idled, 2);
}
