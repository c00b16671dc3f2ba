//! Rate limiting by silencing windows.
//!
//! A value that arrives while no window is open opens one; values arriving
//! inside the window are dropped, except that with `trailing` enabled the
//! latest of them is emitted when the window closes (which opens the next
//! window). [`ThrottleConfig`] picks which edges emit.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use crate::{
  observable::{timer, Observable, ObservableInput},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::{InnerSubscription, OuterObserver, Subscriber},
};

/// Which edges of a throttle window emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleConfig {
  pub leading: bool,
  pub trailing: bool,
}

impl ThrottleConfig {
  /// Emit the value that opens a window. The default.
  pub const fn leading() -> Self { ThrottleConfig { leading: true, trailing: false } }

  /// Emit the latest value seen during a window when it closes.
  pub const fn trailing() -> Self { ThrottleConfig { leading: false, trailing: true } }

  pub const fn all() -> Self { ThrottleConfig { leading: true, trailing: true } }
}

impl Default for ThrottleConfig {
  fn default() -> Self { Self::leading() }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Throttles with windows whose length is decided per value: a window
  /// lasts until the stream `duration_selector` returns for the value that
  /// opened it emits or completes.
  pub fn throttle<N, I>(self, duration_selector: impl Fn(&T) -> I + 'static, config: ThrottleConfig) -> Observable<T, E>
  where
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let selector: Rc<dyn Fn(&T) -> Observable<N, E>> =
      Rc::new(move |value| duration_selector(value).into_observable());
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Throttle {
        downstream: downstream.clone(),
        selector: selector.clone(),
        config,
        pending: RefCell::new(None),
        window: RefCell::new(None),
        source_done: Cell::new(false),
      });
      source.subscribe_within(downstream.subscription(), ThrottleObserver(state));
    })
  }

  /// Throttles with fixed windows of `duration` on `scheduler`.
  pub fn throttle_time<S>(self, duration: Duration, config: ThrottleConfig, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.throttle(move |_| timer((), duration, scheduler.clone()), config)
  }
}

struct Throttle<T, N, E> {
  downstream: Subscriber<T, E>,
  selector: Rc<dyn Fn(&T) -> Observable<N, E>>,
  config: ThrottleConfig,
  pending: RefCell<Option<T>>,
  window: RefCell<Option<InnerSubscription>>,
  source_done: Cell<bool>,
}

impl<T: 'static, N: 'static, E: 'static> Throttle<T, N, E> {
  fn is_throttled(&self) -> bool { self.window.borrow().as_ref().is_some_and(|w| !w.is_closed()) }

  fn open_window(this: &Rc<Self>, duration: Observable<N, E>) {
    let inner = InnerSubscription::new(this.downstream.subscription());
    *this.window.borrow_mut() = Some(inner.clone());
    inner.run(this, duration, (), 0);
  }

  // Emits the pending value, if any, and opens a window for it.
  fn send(this: &Rc<Self>) {
    let pending = this.pending.borrow_mut().take();
    if let Some(value) = pending {
      let duration = (!this.source_done.get()).then(|| (this.selector)(&value));
      this.downstream.next(value);
      if let Some(duration) = duration {
        Self::open_window(this, duration);
      }
    }
  }

  fn end_window(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.unsubscribe();
    let is_current = this.window.borrow().as_ref().is_some_and(|w| w.ptr_eq(inner));
    if is_current {
      this.window.borrow_mut().take();
    }
    if this.config.trailing {
      Self::send(this);
    }
    if this.source_done.get() {
      this.downstream.complete();
    }
  }
}

impl<T: 'static, N: 'static, E: 'static> OuterObserver<(), N, E> for Throttle<T, N, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, inner: &InnerSubscription) {
    Self::end_window(this, inner)
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) { Self::end_window(this, inner) }
}

struct ThrottleObserver<T, N, E>(Rc<Throttle<T, N, E>>);

impl<T: 'static, N: 'static, E: 'static> Observer<T, E> for ThrottleObserver<T, N, E> {
  fn next(&mut self, value: T) {
    let state = &self.0;
    if state.is_throttled() {
      if state.config.trailing {
        *state.pending.borrow_mut() = Some(value);
      }
      return;
    }
    if state.config.leading {
      *state.pending.borrow_mut() = Some(value);
      Throttle::send(state);
    } else {
      let duration = (state.selector)(&value);
      *state.pending.borrow_mut() = Some(value);
      Throttle::open_window(state, duration);
    }
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    let state = &self.0;
    state.source_done.set(true);
    let waiting = state.config.trailing && state.pending.borrow().is_some() && state.is_throttled();
    if !waiting {
      state.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::ThrottleConfig;
  use crate::{prelude::*, testing::*};

  fn run(config: ThrottleConfig) -> Vec<(Duration, Notification<char, RxError>)> {
    let scheduler = VirtualTimeScheduler::new();
    let values = [('a', 'a'), ('b', 'b'), ('c', 'c'), ('d', 'd'), ('e', 'e')];
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<char, RxError>("abc----d-e-----|", &values, &scheduler)
      .throttle_time(Duration::from_millis(3), config, scheduler.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();
    observer.records()
  }

  fn marbles(diagram: &str) -> Vec<(Duration, Notification<char, RxError>)> {
    expected(diagram, &[('a', 'a'), ('b', 'b'), ('c', 'c'), ('d', 'd'), ('e', 'e')])
  }

  #[test]
  fn leading_edge() {
    assert_eq!(run(ThrottleConfig::leading()), marbles("a------d-------|"));
  }

  #[test]
  fn trailing_edge() {
    assert_eq!(run(ThrottleConfig::trailing()), marbles("---c------e----|"));
  }

  #[test]
  fn both_edges() {
    assert_eq!(run(ThrottleConfig::all()), marbles("a--c---d--e----|"));
  }

  #[test]
  fn trailing_value_delays_completion() {
    let scheduler = VirtualTimeScheduler::new();
    let observer = TestObserver::<i32>::with_clock(scheduler.clone());
    observable::from_iter(1..4)
      .throttle_time(Duration::from_millis(5), ThrottleConfig::all(), scheduler.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(
      observer.records(),
      vec![
        (Duration::ZERO, Notification::Next(1)),
        (Duration::from_millis(5), Notification::Next(3)),
        (Duration::from_millis(5), Notification::Complete),
      ]
    );
  }

  #[test]
  fn duration_selector() {
    let scheduler = VirtualTimeScheduler::new();
    let s = scheduler.clone();
    let values = [('a', 4u64), ('b', 1), ('c', 1)];
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<u64, RxError>("ab---c-|", &values, &scheduler)
      .throttle(
        move |ms| observable::timer((), Duration::from_millis(*ms), s.clone()),
        ThrottleConfig::leading(),
      )
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.records(), expected("a----c-|", &values));
  }
}
