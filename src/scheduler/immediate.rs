use super::{wall_clock, Duration, Scheduler, Task};
use crate::subscription::Subscription;

/// Runs every task inline, at the point it is scheduled.
///
/// A pipeline built on this scheduler is fully synchronous. Work that
/// reschedules itself through a [`SchedulerAction`](super::SchedulerAction)
/// is looped rather than recursed.
///
/// # Panics
///
/// The scheduler never waits, so scheduling with a positive delay is a
/// misuse and panics. Time-based work belongs on the
/// [`VirtualTimeScheduler`](super::VirtualTimeScheduler) or the
/// `AsyncScheduler`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_task(&self, task: Task, delay: Duration) -> Subscription {
    assert!(delay.is_zero(), "ImmediateScheduler cannot wait, got a delay of {delay:?}");
    task();
    Subscription::closed()
  }
}
