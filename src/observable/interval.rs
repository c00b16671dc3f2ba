use super::Observable;
use crate::scheduler::{Duration, Scheduler, SchedulerExt};

/// Emits `0, 1, 2, ...`, one value every `period`, starting one period after
/// subscribing. Never completes.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn interval<E, S>(period: Duration, scheduler: S) -> Observable<usize, E>
where
  E: 'static,
  S: Scheduler + Clone,
{
  assert!(!period.is_zero(), "interval: `period` must be greater than zero");
  Observable::new(move |subscriber: crate::subscriber::Subscriber<usize, E>| {
    scheduler.schedule(
      move |action, n: usize| {
        subscriber.next(n);
        action.schedule(n + 1, period);
      },
      period,
      0,
    )
  })
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn ticks_every_period() {
    let scheduler = VirtualTimeScheduler::new();
    let observer = TestObserver::<usize>::with_clock(scheduler.clone());
    let subscription =
      observable::interval(Duration::from_millis(10), scheduler.clone()).subscribe_with(observer.clone());

    scheduler.advance_by(Duration::from_millis(35));
    assert_eq!(observer.values(), vec![0, 1, 2]);
    assert_eq!(observer.records()[2].0, Duration::from_millis(30));

    subscription.unsubscribe().unwrap();
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(observer.values().len(), 3);
    assert!(!observer.is_completed());
  }

  #[test]
  #[should_panic(expected = "`period` must be greater than zero")]
  fn zero_period_is_rejected() { let _ = observable::interval::<(), _>(Duration::ZERO, ImmediateScheduler); }
}
