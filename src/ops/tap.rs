use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Calls `f` with every value before passing it on unchanged.
  pub fn tap(self, f: impl Fn(&T) + 'static) -> Observable<T, E> {
    self.tap_all(f, |_| {}, || {})
  }

  /// Observes all three channels without changing the stream.
  pub fn tap_all(
    self, next: impl Fn(&T) + 'static, error: impl Fn(&E) + 'static, complete: impl Fn() + 'static,
  ) -> Observable<T, E> {
    let callbacks = Rc::new(TapCallbacks { next, error, complete });
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = TapObserver { downstream: downstream.clone(), callbacks: callbacks.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct TapCallbacks<N, Er, C> {
  next: N,
  error: Er,
  complete: C,
}

struct TapObserver<T, E, N, Er, C> {
  downstream: Subscriber<T, E>,
  callbacks: Rc<TapCallbacks<N, Er, C>>,
}

impl<T, E, N, Er, C> Observer<T, E> for TapObserver<T, E, N, Er, C>
where
  T: 'static,
  E: 'static,
  N: Fn(&T),
  Er: Fn(&E),
  C: Fn(),
{
  fn next(&mut self, value: T) {
    (self.callbacks.next)(&value);
    self.downstream.next(value);
  }

  fn error(&mut self, err: E) {
    (self.callbacks.error)(&err);
    self.downstream.error(err);
  }

  fn complete(&mut self) {
    (self.callbacks.complete)();
    self.downstream.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn sees_every_channel() {
    let log = Rc::new(RefCell::new(vec![]));
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    let observer = TestObserver::<i32, &str>::new();
    Observable::<i32, &str>::new(|subscriber| {
      subscriber.next(1);
      subscriber.error("bad");
    })
    .tap_all(
      move |v| n.borrow_mut().push(format!("next {v}")),
      move |err| e.borrow_mut().push(format!("error {err}")),
      move || c.borrow_mut().push("complete".to_owned()),
    )
    .subscribe_with(observer.clone());

    assert_eq!(*log.borrow(), vec!["next 1", "error bad"]);
    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.errors(), vec!["bad"]);
  }

  #[test]
  fn values_pass_unchanged() {
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    let observer = TestObserver::<i32>::new();
    observable::from_iter(1..4)
      .tap(move |v| s.borrow_mut().push(*v))
      .subscribe_with(observer.clone());
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    assert_eq!(observer.values(), vec![1, 2, 3]);
  }
}
