use crate::{
  notification::Notification, observable::Observable, observer::Observer, subscriber::Subscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Turns every notification, terminal ones included, into a value. The
  /// result completes right after the source's terminal notification and
  /// never errors.
  pub fn materialize(self) -> Observable<Notification<T, E>, E> {
    self.lift(|downstream: Subscriber<Notification<T, E>, E>, source: &Observable<T, E>| {
      let observer = MaterializeObserver { downstream: downstream.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

impl<T: 'static, E: 'static> Observable<Notification<T, E>, E> {
  /// Inverse of [`materialize`](Observable::materialize): replays each
  /// notification value as the notification itself.
  pub fn dematerialize(self) -> Observable<T, E> {
    self.lift(|downstream: Subscriber<T, E>, source: &Observable<Notification<T, E>, E>| {
      let d = downstream.clone();
      let observer = crate::observer::FnObserver::new(
        move |n: Notification<T, E>| n.observe(&d),
        {
          let d = downstream.clone();
          move |err| d.error(err)
        },
        {
          let d = downstream.clone();
          move || d.complete()
        },
      );
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct MaterializeObserver<T, E> {
  downstream: Subscriber<Notification<T, E>, E>,
}

impl<T: 'static, E: 'static> Observer<T, E> for MaterializeObserver<T, E> {
  fn next(&mut self, value: T) { self.downstream.next(Notification::Next(value)) }

  fn error(&mut self, err: E) {
    self.downstream.next(Notification::Error(err));
    self.downstream.complete();
  }

  fn complete(&mut self) {
    self.downstream.next(Notification::Complete);
    self.downstream.complete();
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn error_becomes_value() {
    let observer = TestObserver::<Notification<i32, &str>, &str>::new();
    observable::of(1)
      .concat(observable::throw_error("boom"))
      .materialize()
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![Notification::Next(1), Notification::Error("boom")]);
    assert!(observer.is_completed());
    assert!(observer.errors().is_empty());
  }

  #[test]
  fn dematerialize_restores_stream() {
    let observer = TestObserver::<i32, &str>::new();
    observable::from_iter(vec![Notification::Next(1), Notification::Error("x"), Notification::Next(2)])
      .dematerialize()
      .subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![Notification::Next(1), Notification::Error("x")]);
  }
}
