//! Alarm clock firmware for the SES board (ATmega128RFA1)
//!
//! A 1 ms timer tick drives a cooperative scheduler; periodic tasks debounce
//! the buttons and feed the alarm clock state machine. Everything except the
//! register-level HAL builds and runs on the host as well.

#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod config;
pub mod drivers;
pub mod fsm;
pub mod hal;
pub mod logger;
pub mod rtos;
pub mod sync;

pub use application::{App, Board, Events};
pub use rtos::{ClockTime, ScheduleError, Scheduler, Task, TaskId};
