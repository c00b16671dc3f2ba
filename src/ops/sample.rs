use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::{interval, Observable, ObservableInput},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits the most recent source value whenever `notifier` emits, if a new
  /// value arrived since the last sample.
  ///
  /// The notifier completing changes nothing; the source completing completes
  /// the result without a final sample.
  pub fn sample<N: 'static>(self, notifier: impl ObservableInput<N, E> + Clone + 'static) -> Observable<T, E> {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Sample { downstream: downstream.clone(), latest: RefCell::new(None) });
      subscribe_to_result(&state, downstream.subscription(), notifier.clone(), (), 0);
      source.subscribe_within(downstream.subscription(), SampleObserver(state));
    })
  }

  /// Samples every `period` on `scheduler`.
  pub fn sample_time<S>(self, period: Duration, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.sample(interval::<E, S>(period, scheduler))
  }
}

struct Sample<T, E> {
  downstream: Subscriber<T, E>,
  latest: RefCell<Option<T>>,
}

impl<T: 'static, N, E: 'static> OuterObserver<(), N, E> for Sample<T, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, _: &InnerSubscription) {
    let latest = this.latest.borrow_mut().take();
    if let Some(value) = latest {
      this.downstream.next(value);
    }
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }
}

struct SampleObserver<T, E>(Rc<Sample<T, E>>);

impl<T: 'static, E: 'static> Observer<T, E> for SampleObserver<T, E> {
  fn next(&mut self, value: T) { *self.0.latest.borrow_mut() = Some(value); }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) { self.0.downstream.complete() }
}
