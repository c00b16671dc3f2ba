use std::{cell::RefCell, cmp::Ordering, collections::BinaryHeap};

use super::{wall_clock, Duration, Scheduler, Task};
use crate::subscription::Subscription;

/// Current-thread trampoline.
///
/// When no queued work is running the task runs inline. Work scheduled while
/// another task is running is deferred until that task returns and then runs
/// in FIFO order. A positive delay places the task behind everything due
/// earlier without waiting for it.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueueScheduler;

struct QueuedTask {
  due: Duration,
  seq: u64,
  task: Task,
  subscription: Subscription,
}

impl PartialEq for QueuedTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for QueuedTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earliest due first, then FIFO
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct QueueState {
  running: bool,
  clock: Duration,
  next_seq: u64,
  queue: BinaryHeap<QueuedTask>,
}

thread_local! {
  static QUEUE: RefCell<QueueState> = RefCell::new(QueueState::default());
}

// Leaves the queue idle even when a task panics, so the next test on this
// thread starts from a clean state.
struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) {
    QUEUE.with(|q| {
      let mut q = q.borrow_mut();
      q.running = false;
      q.clock = Duration::ZERO;
      q.queue.clear();
    });
  }
}

impl QueueScheduler {
  fn drain() {
    let _guard = DrainGuard;
    loop {
      let next = QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        let task = q.queue.pop()?;
        q.clock = task.due;
        Some(task)
      });
      let Some(QueuedTask { task, subscription, .. }) = next else { break };
      if subscription.is_closed() {
        continue;
      }
      tracing::trace!("queue scheduler running task");
      task();
      subscription.release();
    }
  }
}

impl Scheduler for QueueScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_task(&self, task: Task, delay: Duration) -> Subscription {
    let subscription = Subscription::new();
    let idle = QUEUE.with(|q| {
      let mut q = q.borrow_mut();
      let seq = q.next_seq;
      q.next_seq += 1;
      let due = q.clock + delay;
      q.queue.push(QueuedTask { due, seq, task, subscription: subscription.clone() });
      let idle = !q.running;
      q.running = true;
      idle
    });
    if idle {
      Self::drain();
    }
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  fn push(log: &Rc<RefCell<Vec<String>>>, msg: impl Into<String>) { log.borrow_mut().push(msg.into()); }

  #[test]
  fn idle_queue_runs_inline() {
    let log = Rc::new(RefCell::new(vec![]));
    let l = log.clone();
    let s = QueueScheduler.schedule_task(Box::new(move || push(&l, "task")), Duration::ZERO);
    push(&log, "after");
    assert_eq!(*log.borrow(), vec!["task", "after"]);
    assert!(s.is_closed());
  }

  #[test]
  fn nested_work_waits_for_current_unit() {
    let log = Rc::new(RefCell::new(vec![]));
    let l = log.clone();
    QueueScheduler.schedule_task(
      Box::new(move || {
        push(&l, "outer start");
        for i in 0..2 {
          let l2 = l.clone();
          QueueScheduler.schedule_task(Box::new(move || push(&l2, format!("inner {i}"))), Duration::ZERO);
        }
        push(&l, "outer end");
      }),
      Duration::ZERO,
    );
    assert_eq!(*log.borrow(), vec!["outer start", "outer end", "inner 0", "inner 1"]);
  }

  #[test]
  fn delay_orders_behind_earlier_work() {
    let log = Rc::new(RefCell::new(vec![]));
    let l = log.clone();
    QueueScheduler.schedule_task(
      Box::new(move || {
        let (a, b) = (l.clone(), l.clone());
        QueueScheduler.schedule_task(Box::new(move || push(&a, "late")), Duration::from_millis(5));
        QueueScheduler.schedule_task(Box::new(move || push(&b, "soon")), Duration::ZERO);
      }),
      Duration::ZERO,
    );
    assert_eq!(*log.borrow(), vec!["soon", "late"]);
  }

  #[test]
  fn cancelled_work_is_skipped() {
    let log = Rc::new(RefCell::new(vec![]));
    let l = log.clone();
    QueueScheduler.schedule_task(
      Box::new(move || {
        let a = l.clone();
        let s = QueueScheduler.schedule_task(Box::new(move || push(&a, "cancelled")), Duration::ZERO);
        s.unsubscribe().unwrap();
      }),
      Duration::ZERO,
    );
    assert!(log.borrow().is_empty());
  }
}
