use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::{timer, Observable, ObservableInput},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::{InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits a value only once the stream returned by `duration_selector` for
  /// it emits before another value arrives. A newer value cancels the
  /// pending one. The pending value is flushed when the source completes.
  pub fn debounce<N, I>(self, duration_selector: impl Fn(&T) -> I + 'static) -> Observable<T, E>
  where
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let selector: Rc<dyn Fn(&T) -> Observable<N, E>> =
      Rc::new(move |value| duration_selector(value).into_observable());
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Debounce {
        downstream: downstream.clone(),
        selector: selector.clone(),
        pending: RefCell::new(None),
        duration: RefCell::new(None),
      });
      source.subscribe_within(downstream.subscription(), DebounceObserver(state));
    })
  }

  /// Emits a value only after `due` has passed on `scheduler` without
  /// another value arriving.
  pub fn debounce_time<S>(self, due: Duration, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.debounce(move |_| timer((), due, scheduler.clone()))
  }
}

struct Debounce<T, N, E> {
  downstream: Subscriber<T, E>,
  selector: Rc<dyn Fn(&T) -> Observable<N, E>>,
  pending: RefCell<Option<T>>,
  duration: RefCell<Option<InnerSubscription>>,
}

impl<T: 'static, N: 'static, E: 'static> Debounce<T, N, E> {
  fn cancel_duration(&self) {
    let duration = self.duration.borrow_mut().take();
    if let Some(duration) = duration {
      duration.unsubscribe();
    }
  }

  fn flush(&self) {
    self.cancel_duration();
    let pending = self.pending.borrow_mut().take();
    if let Some(value) = pending {
      self.downstream.next(value);
    }
  }
}

impl<T: 'static, N: 'static, E: 'static> OuterObserver<(), N, E> for Debounce<T, N, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, _: &InnerSubscription) { this.flush() }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(_: &Rc<Self>, inner: &InnerSubscription) { inner.detach() }
}

struct DebounceObserver<T, N, E>(Rc<Debounce<T, N, E>>);

impl<T: 'static, N: 'static, E: 'static> Observer<T, E> for DebounceObserver<T, N, E> {
  fn next(&mut self, value: T) {
    let state = &self.0;
    state.cancel_duration();
    let duration = (state.selector)(&value);
    *state.pending.borrow_mut() = Some(value);
    let inner = InnerSubscription::new(state.downstream.subscription());
    *state.duration.borrow_mut() = Some(inner.clone());
    inner.run(state, duration, (), 0);
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.flush();
    self.0.downstream.complete();
  }
}
