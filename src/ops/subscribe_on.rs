use crate::{
  observable::Observable,
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Subscribes to the source from a task on `scheduler` instead of at the
  /// call site.
  pub fn subscribe_on<S>(self, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let source = source.clone();
      let d = downstream.clone();
      let task = scheduler.schedule_task(
        Box::new(move || {
          source.subscribe_within(d.subscription(), d.clone());
        }),
        Duration::ZERO,
      );
      downstream.add(task);
    })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn subscription_is_deferred() {
    let scheduler = VirtualTimeScheduler::new();
    let subscribed = Rc::new(Cell::new(false));
    let s = subscribed.clone();
    let source = Observable::<i32>::new(move |subscriber| {
      s.set(true);
      subscriber.next(1);
      subscriber.complete();
    });
    let observer = TestObserver::new();
    source.subscribe_on(scheduler.clone()).subscribe_with(observer.clone());
    assert!(!subscribed.get());

    scheduler.flush();
    assert!(subscribed.get());
    assert_eq!(observer.values(), vec![1]);
  }

  #[test]
  fn unsubscribe_before_run() {
    let scheduler = VirtualTimeScheduler::new();
    let subscribed = Rc::new(Cell::new(false));
    let s = subscribed.clone();
    let source = Observable::<i32>::new(move |_| s.set(true));
    let subscription = source.subscribe_on(scheduler.clone()).subscribe(|_| {});
    subscription.unsubscribe().unwrap();
    scheduler.flush();
    assert!(!subscribed.get());
  }
}
