use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Folds the values into one result, emitted when the source completes.
  /// An empty source emits `initial`.
  pub fn reduce<A>(self, initial: A, f: impl Fn(A, T) -> A + 'static) -> Observable<A, E>
  where
    A: Clone + 'static,
  {
    self.scan(initial.clone(), f).last_or(initial)
  }

  /// Emits only the last value, or `default` if the source completes empty.
  pub fn last_or(self, default: T) -> Observable<T, E>
  where
    T: Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = LastOrObserver { downstream: downstream.clone(), last: Some(default.clone()) };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

pub(crate) struct LastOrObserver<T, E> {
  pub(crate) downstream: Subscriber<T, E>,
  pub(crate) last: Option<T>,
}

impl<T: 'static, E: 'static> Observer<T, E> for LastOrObserver<T, E> {
  fn next(&mut self, value: T) { self.last = Some(value) }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) {
    if let Some(last) = self.last.take() {
      self.downstream.next(last);
    }
    self.downstream.complete();
  }
}
