use std::{cell::Cell, rc::Rc};

use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Ignores the source's values until `notifier` emits. The notifier is
  /// unsubscribed at its first value.
  pub fn skip_until<N: 'static>(self, notifier: impl ObservableInput<N, E>) -> Observable<T, E> {
    let notifier = notifier.into_observable();
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let gate = Rc::new(SkipUntil { downstream: downstream.clone(), open: Cell::new(false) });
      subscribe_to_result(&gate, downstream.subscription(), notifier.clone(), (), 0);
      source.subscribe_within(downstream.subscription(), SkipUntilObserver(gate));
    })
  }
}

struct SkipUntil<T, E> {
  downstream: Subscriber<T, E>,
  open: Cell<bool>,
}

impl<T: 'static, E: 'static, N> OuterObserver<(), N, E> for SkipUntil<T, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, inner: &InnerSubscription) {
    this.open.set(true);
    inner.unsubscribe();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(_: &Rc<Self>, inner: &InnerSubscription) { inner.detach() }
}

struct SkipUntilObserver<T, E>(Rc<SkipUntil<T, E>>);

impl<T: 'static, E: 'static> Observer<T, E> for SkipUntilObserver<T, E> {
  fn next(&mut self, value: T) {
    if self.0.open.get() {
      self.0.downstream.next(value);
    }
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) { self.0.downstream.complete() }
}
