use std::rc::Rc;

use crate::{
  notification::Notification,
  observable::{Observable, ObservableInput},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Shifts every value and the completion by `delay` on `scheduler`.
  ///
  /// Errors are not delayed: they are delivered at once and cancel the
  /// values still in flight.
  pub fn delay<S>(self, delay: Duration, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = DelayObserver { downstream: downstream.clone(), delay, scheduler: scheduler.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }

  /// Delays each value until the stream `selector` returns for it emits its
  /// first value or completes, whichever comes first.
  pub fn delay_when<N, I>(self, selector: impl Fn(&T) -> I + 'static) -> Observable<T, E>
  where
    T: Clone,
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let selector = Rc::new(selector);
    self.merge_map(
      move |value: T| {
        selector(&value)
          .into_observable()
          .take(1)
          .map(|_| ())
          .default_if_empty(())
          .map(move |_| value.clone())
      },
      usize::MAX,
    )
  }
}

struct DelayObserver<T, E, S> {
  downstream: Subscriber<T, E>,
  delay: Duration,
  scheduler: S,
}

impl<T: 'static, E: 'static, S: Scheduler> DelayObserver<T, E, S> {
  fn later(&self, notification: Notification<T, E>) {
    let downstream = self.downstream.clone();
    let task = self
      .scheduler
      .schedule_task(Box::new(move || notification.observe(&downstream)), self.delay);
    self.downstream.add(task);
  }
}

impl<T: 'static, E: 'static, S: Scheduler> Observer<T, E> for DelayObserver<T, E, S> {
  fn next(&mut self, value: T) { self.later(Notification::Next(value)) }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.later(Notification::Complete) }
}
