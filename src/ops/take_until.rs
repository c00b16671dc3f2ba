use std::rc::Rc;

use crate::{
  observable::{Observable, ObservableInput},
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits the source's values until `notifier` emits, then completes.
  ///
  /// The notifier is subscribed first; if it emits synchronously the source
  /// is never subscribed. A notifier that completes without emitting has no
  /// effect.
  pub fn take_until<N: 'static>(self, notifier: impl ObservableInput<N, E>) -> Observable<T, E> {
    let notifier = notifier.into_observable();
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let outer = Rc::new(TakeUntil { downstream: downstream.clone() });
      subscribe_to_result(&outer, downstream.subscription(), notifier.clone(), (), 0);
      if !downstream.is_closed() {
        source.subscribe_within(downstream.subscription(), downstream.clone());
      }
    })
  }
}

struct TakeUntil<T, E> {
  downstream: Subscriber<T, E>,
}

impl<T: 'static, E: 'static, N> OuterObserver<(), N, E> for TakeUntil<T, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, _: &InnerSubscription) {
    tracing::debug!("take_until notifier fired");
    this.downstream.complete();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(_: &Rc<Self>, inner: &InnerSubscription) { inner.detach() }
}
