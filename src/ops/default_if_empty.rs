use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits `default` if the source completes without emitting anything.
  pub fn default_if_empty(self, default: T) -> Observable<T, E>
  where
    T: Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = DefaultIfEmptyObserver { downstream: downstream.clone(), default: Some(default.clone()) };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct DefaultIfEmptyObserver<T, E> {
  downstream: Subscriber<T, E>,
  default: Option<T>,
}

impl<T: 'static, E: 'static> Observer<T, E> for DefaultIfEmptyObserver<T, E> {
  fn next(&mut self, value: T) {
    self.default = None;
    self.downstream.next(value);
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) {
    if let Some(default) = self.default.take() {
      self.downstream.next(default);
    }
    self.downstream.complete();
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn empty_source() {
    let observer = TestObserver::<i32>::new();
    observable::empty().default_if_empty(5).subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![Notification::Next(5), Notification::Complete]);
  }

  #[test]
  fn non_empty_source() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(1..3).default_if_empty(5).subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 2]);
  }

  #[test]
  fn error_is_not_replaced() {
    let observer = TestObserver::<i32, &str>::new();
    observable::throw_error("bad").default_if_empty(5).subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![Notification::Error("bad")]);
  }
}
