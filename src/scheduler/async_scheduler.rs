use super::{wall_clock, Duration, Scheduler, Task};
use crate::subscription::{Subscription, Teardown};

/// Runs tasks on the tokio runtime of the current thread.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so scheduling must
/// happen inside a [`tokio::task::LocalSet`]. Delays use tokio's timer;
/// unsubscribing aborts the spawned task.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsyncScheduler;

impl Scheduler for AsyncScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_task(&self, task: Task, delay: Duration) -> Subscription {
    let subscription = Subscription::new();
    let done = subscription.clone();
    let handle = tokio::task::spawn_local(async move {
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      if !done.is_closed() {
        task();
        done.release();
      }
    });
    subscription.add(Teardown::action(move || handle.abort()));
    subscription
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use tokio::task::LocalSet;

  use super::*;
  use crate::scheduler::SchedulerExt;

  #[tokio::test]
  async fn runs_after_delay() {
    let local = LocalSet::new();
    local
      .run_until(async {
        let log = Rc::new(RefCell::new(vec![]));
        let l = log.clone();
        let s = AsyncScheduler.schedule_task(Box::new(move || l.borrow_mut().push(1)), Duration::from_millis(5));
        assert!(log.borrow().is_empty());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*log.borrow(), vec![1]);
        assert!(s.is_closed());
      })
      .await;
  }

  #[tokio::test]
  async fn cancel_before_run() {
    let local = LocalSet::new();
    local
      .run_until(async {
        let log = Rc::new(RefCell::new(vec![]));
        let l = log.clone();
        let s = AsyncScheduler.schedule_task(Box::new(move || l.borrow_mut().push(1)), Duration::from_millis(5));
        s.unsubscribe().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(log.borrow().is_empty());
      })
      .await;
  }

  #[tokio::test]
  async fn periodic_action() {
    let local = LocalSet::new();
    local
      .run_until(async {
        let ticks = Rc::new(RefCell::new(vec![]));
        let t = ticks.clone();
        let s = AsyncScheduler.schedule(
          move |action, n: u32| {
            t.borrow_mut().push(n);
            if n < 2 {
              action.schedule(n + 1, Duration::from_millis(2));
            }
          },
          Duration::from_millis(2),
          0,
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*ticks.borrow(), vec![0, 1, 2]);
        assert!(s.is_closed());
      })
      .await;
  }
}
