use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::Subscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Re-emits every notification from a task on `scheduler`.
  ///
  /// Order is preserved for schedulers that run equal-delay tasks in FIFO
  /// order, which all provided schedulers do.
  pub fn observe_on<S>(self, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = ObserveOnObserver { downstream: downstream.clone(), scheduler: scheduler.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct ObserveOnObserver<T, E, S> {
  downstream: Subscriber<T, E>,
  scheduler: S,
}

impl<T: 'static, E: 'static, S: Scheduler> ObserveOnObserver<T, E, S> {
  fn forward(&self, notification: Notification<T, E>) {
    let downstream = self.downstream.clone();
    let task = self
      .scheduler
      .schedule_task(Box::new(move || notification.observe(&downstream)), Duration::ZERO);
    self.downstream.add(task);
  }
}

impl<T: 'static, E: 'static, S: Scheduler> Observer<T, E> for ObserveOnObserver<T, E, S> {
  fn next(&mut self, value: T) { self.forward(Notification::Next(value)) }

  fn error(&mut self, err: E) { self.forward(Notification::Error(err)) }

  fn complete(&mut self) { self.forward(Notification::Complete) }
}
