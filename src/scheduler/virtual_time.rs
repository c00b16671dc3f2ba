//! Virtual time for deterministic tests of time-based operators.
//!
//! Time only moves when the test says so. Tasks are kept in a priority queue
//! ordered by due time and, for equal due times, by scheduling order.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let observer = TestObserver::<i32>::new();
//! observable::of(42)
//!   .delay(Duration::from_millis(100), scheduler.clone())
//!   .subscribe_with(observer.clone());
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(observer.values().is_empty());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(observer.values(), vec![42]);
//! ```
//!
//! Unlike a thread-local clock, every `VirtualTimeScheduler` is its own
//! independent timeline; clones share it.

use std::{cell::RefCell, cmp::Ordering, collections::BinaryHeap, rc::Rc};

use super::{Duration, Scheduler, Task};
use crate::subscription::Subscription;

struct VirtualTask {
  due: Duration,
  seq: u64,
  task: Task,
  subscription: Subscription,
}

impl PartialEq for VirtualTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for VirtualTask {}

impl PartialOrd for VirtualTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for VirtualTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by seq
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct VirtualState {
  now: Duration,
  next_seq: u64,
  queue: BinaryHeap<VirtualTask>,
  max_frames: Option<Duration>,
}

/// A scheduler driven by a simulated clock.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler(Rc<RefCell<VirtualState>>);

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// A scheduler whose [`flush`](Self::flush) never runs work due after
  /// `max_frames`. Needed to flush never-ending sources such as `interval`.
  pub fn with_max_frames(max_frames: Duration) -> Self {
    let scheduler = Self::default();
    scheduler.0.borrow_mut().max_frames = Some(max_frames);
    scheduler
  }

  /// Number of tasks waiting, cancelled ones included.
  pub fn pending_count(&self) -> usize { self.0.borrow().queue.len() }

  pub fn is_empty(&self) -> bool { self.0.borrow().queue.is_empty() }

  /// Runs every pending task, moving the clock to each task's due time.
  ///
  /// Work scheduled by the tasks themselves runs too, up to the maximum
  /// frame if one was configured.
  pub fn flush(&self) {
    let limit = self.0.borrow().max_frames;
    self.run_until(limit);
  }

  /// Moves the clock forward by `duration`, running everything due on the way.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.0.borrow().now + duration;
    self.advance_to(target);
  }

  /// Moves the clock to `time`, running everything due until then. Moving
  /// backwards is ignored.
  pub fn advance_to(&self, time: Duration) {
    if time < self.0.borrow().now {
      return;
    }
    self.run_until(Some(time));
    self.0.borrow_mut().now = time;
  }

  fn run_until(&self, limit: Option<Duration>) {
    loop {
      let next = {
        let mut state = self.0.borrow_mut();
        let due = state
          .queue
          .peek()
          .is_some_and(|task| limit.is_none_or(|limit| task.due <= limit));
        if !due {
          break;
        }
        let Some(next) = state.queue.pop() else { break };
        state.now = next.due;
        next
      };
      let VirtualTask { task, subscription, due, .. } = next;
      if subscription.is_closed() {
        continue;
      }
      tracing::trace!(?due, "virtual time task");
      task();
      subscription.release();
    }
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { self.0.borrow().now }

  fn schedule_task(&self, task: Task, delay: Duration) -> Subscription {
    let subscription = Subscription::new();
    let mut state = self.0.borrow_mut();
    let due = state.now + delay;
    let seq = state.next_seq;
    state.next_seq += 1;
    state.queue.push(VirtualTask { due, seq, task, subscription: subscription.clone() });
    subscription
  }
}
