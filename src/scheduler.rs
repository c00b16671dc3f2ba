//! Execution contexts.
//!
//! A [`Scheduler`] decides *when* a unit of work runs; operators never touch
//! a clock or a timer directly. Four variants are provided:
//!
//! | Scheduler | Runs work |
//! |-----------|-----------|
//! | [`ImmediateScheduler`] | inline, at the call site |
//! | [`QueueScheduler`] | inline when idle, otherwise after the current unit, FIFO |
//! | [`AsyncScheduler`] | on the tokio `LocalSet` timer (feature `scheduler`) |
//! | [`VirtualTimeScheduler`] | when the test advances its virtual clock |
//!
//! Recurring work goes through [`SchedulerExt::schedule`], which hands the
//! work a [`SchedulerAction`] it can reschedule itself with.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use once_cell::sync::Lazy;
pub use std::time::{Duration, Instant};

use crate::subscription::{Subscription, Teardown};

mod immediate;
mod queue;
mod virtual_time;
pub use immediate::ImmediateScheduler;
pub use queue::QueueScheduler;
pub use virtual_time::VirtualTimeScheduler;

#[cfg(feature = "scheduler")]
mod async_scheduler;
#[cfg(feature = "scheduler")]
pub use async_scheduler::AsyncScheduler;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Time elapsed since the first clock read of this process.
pub(crate) fn wall_clock() -> Duration { EPOCH.elapsed() }

/// A one-shot unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Orders tasks and runs them.
pub trait Scheduler: 'static {
  /// The current time of this scheduler's clock.
  fn now(&self) -> Duration;

  /// Runs `task` once `delay` has elapsed. Unsubscribing the returned
  /// subscription before that prevents the run; it is closed once the task
  /// has run.
  fn schedule_task(&self, task: Task, delay: Duration) -> Subscription;
}

/// Stateful, self-rescheduling work on top of [`Scheduler::schedule_task`].
pub trait SchedulerExt: Scheduler + Clone {
  /// Schedules `work` to run with `state` after `delay`.
  ///
  /// The work receives the action that runs it and can call
  /// [`SchedulerAction::schedule`] to run again with a new state. The
  /// returned subscription cancels the whole chain of runs; it closes by
  /// itself once a run ends without rescheduling.
  fn schedule<St: 'static>(
    &self, work: impl FnMut(&SchedulerAction<St>, St) + 'static, delay: Duration, state: St,
  ) -> Subscription {
    let action = SchedulerAction::new(Rc::new(self.clone()), Box::new(work));
    action.schedule(state, delay);
    action.subscription().clone()
  }
}

impl<S: Scheduler + Clone> SchedulerExt for S {}

type Work<St> = Box<dyn FnMut(&SchedulerAction<St>, St)>;

struct ActionInner<St> {
  scheduler: Rc<dyn Scheduler>,
  work: RefCell<Option<Work<St>>>,
  subscription: Subscription,
  running: Cell<bool>,
  outstanding: Cell<usize>,
  pending: RefCell<VecDeque<St>>,
}

/// Handle a piece of scheduled work uses to run itself again.
pub struct SchedulerAction<St>(Rc<ActionInner<St>>);

impl<St> Clone for SchedulerAction<St> {
  fn clone(&self) -> Self { SchedulerAction(self.0.clone()) }
}

impl<St: 'static> SchedulerAction<St> {
  fn new(scheduler: Rc<dyn Scheduler>, work: Work<St>) -> Self {
    let inner = Rc::new(ActionInner {
      scheduler,
      work: RefCell::new(Some(work)),
      subscription: Subscription::new(),
      running: Cell::new(false),
      outstanding: Cell::new(0),
      pending: RefCell::new(VecDeque::new()),
    });
    let weak = Rc::downgrade(&inner);
    inner.subscription.add(Teardown::action(move || {
      if let Some(inner) = weak.upgrade() {
        inner.work.borrow_mut().take();
        inner.pending.borrow_mut().clear();
      }
    }));
    SchedulerAction(inner)
  }

  /// Runs the work again with `state` after `delay`.
  pub fn schedule(&self, state: St, delay: Duration) {
    if self.is_closed() {
      return;
    }
    self.0.outstanding.set(self.0.outstanding.get() + 1);
    let action = self.clone();
    let task = self
      .0
      .scheduler
      .schedule_task(Box::new(move || action.run(state)), delay);
    self.0.subscription.add(task);
  }

  pub fn now(&self) -> Duration { self.0.scheduler.now() }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.subscription.is_closed() }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.0.subscription }

  // A scheduler that runs tasks inline calls back into `run` while the work is
  // still executing. Those states are queued and looped over here, so
  // recursive rescheduling never grows the native stack.
  fn run(&self, state: St) {
    self.0.outstanding.set(self.0.outstanding.get().saturating_sub(1));
    if self.is_closed() {
      return;
    }
    if self.0.running.get() {
      self.0.pending.borrow_mut().push_back(state);
      return;
    }

    self.0.running.set(true);
    let mut next = Some(state);
    while let Some(state) = next {
      let work = self.0.work.borrow_mut().take();
      let Some(mut work) = work else { break };
      tracing::trace!("running scheduled action");
      work(self, state);
      if self.is_closed() {
        break;
      }
      *self.0.work.borrow_mut() = Some(work);
      next = self.0.pending.borrow_mut().pop_front();
    }
    self.0.running.set(false);

    if self.0.outstanding.get() == 0 && self.0.pending.borrow().is_empty() {
      self.0.subscription.release();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn action_closes_after_last_run() {
    let scheduler = VirtualTimeScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let subscription = scheduler.schedule(
      move |action, n: u32| {
        r.set(r.get() + 1);
        if n < 2 {
          action.schedule(n + 1, Duration::from_millis(10));
        }
      },
      Duration::from_millis(10),
      0,
    );

    scheduler.advance_by(Duration::from_millis(20));
    assert_eq!(runs.get(), 2);
    assert!(!subscription.is_closed());

    scheduler.flush();
    assert_eq!(runs.get(), 3);
    assert!(subscription.is_closed());
  }

  #[test]
  fn cancelling_the_chain_stops_rescheduling() {
    let scheduler = VirtualTimeScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let subscription = scheduler.schedule(
      move |action, ()| {
        r.set(r.get() + 1);
        action.schedule((), Duration::from_millis(1));
      },
      Duration::ZERO,
      (),
    );

    scheduler.advance_by(Duration::from_millis(4));
    subscription.unsubscribe().unwrap();
    scheduler.flush();
    assert_eq!(runs.get(), 5);
    assert!(scheduler.is_empty());
  }
}
