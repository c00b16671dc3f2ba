use super::Observable;
use crate::scheduler::{Duration, Scheduler, SchedulerExt};

/// Emits `value` once `delay` has elapsed on `scheduler`, then completes.
pub fn timer<T, E, S>(value: T, delay: Duration, scheduler: S) -> Observable<T, E>
where
  T: Clone + 'static,
  E: 'static,
  S: Scheduler + Clone,
{
  Observable::new(move |subscriber| {
    let value = value.clone();
    scheduler.schedule(
      move |_, subscriber: crate::subscriber::Subscriber<T, E>| {
        subscriber.next(value.clone());
        subscriber.complete();
      },
      delay,
      subscriber,
    )
  })
}
