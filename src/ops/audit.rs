//! Emits the latest value once a silencing window closes.
//!
//! The first value seen while no window is open starts one; when the window
//! ends the most recent value is emitted. Unlike `throttle` the emission
//! happens at the end of the window, and unlike `debounce` new values do not
//! extend it.

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

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Audits with windows decided by the value that opens them.
  pub fn audit<N, I>(self, duration_selector: impl Fn(&T) -> I + 'static) -> Observable<T, E>
  where
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let selector: Rc<dyn Fn(&T) -> Observable<N, E>> =
      Rc::new(move |value| duration_selector(value).into_observable());
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Audit {
        downstream: downstream.clone(),
        selector: selector.clone(),
        last: RefCell::new(None),
        window: RefCell::new(None),
        source_done: Cell::new(false),
      });
      source.subscribe_within(downstream.subscription(), AuditObserver(state));
    })
  }

  pub fn audit_time<S>(self, duration: Duration, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.audit(move |_| timer((), duration, scheduler.clone()))
  }
}

struct Audit<T, N, E> {
  downstream: Subscriber<T, E>,
  selector: Rc<dyn Fn(&T) -> Observable<N, E>>,
  last: RefCell<Option<T>>,
  window: RefCell<Option<InnerSubscription>>,
  source_done: Cell<bool>,
}

impl<T: 'static, N: 'static, E: 'static> Audit<T, N, E> {
  fn end_window(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.unsubscribe();
    this.window.borrow_mut().take();
    let last = this.last.borrow_mut().take();
    if let Some(value) = last {
      this.downstream.next(value);
    }
    if this.source_done.get() {
      this.downstream.complete();
    }
  }
}

impl<T: 'static, N: 'static, E: 'static> OuterObserver<(), N, E> for Audit<T, N, E> {
  fn notify_next(this: &Rc<Self>, _: (), _: N, _: usize, _: usize, inner: &InnerSubscription) {
    Self::end_window(this, inner)
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) { Self::end_window(this, inner) }
}

struct AuditObserver<T, N, E>(Rc<Audit<T, N, E>>);

impl<T: 'static, N: 'static, E: 'static> Observer<T, E> for AuditObserver<T, N, E> {
  fn next(&mut self, value: T) {
    let state = &self.0;
    let open = state.window.borrow().is_some();
    if open {
      *state.last.borrow_mut() = Some(value);
      return;
    }
    let duration = (state.selector)(&value);
    *state.last.borrow_mut() = Some(value);
    let inner = InnerSubscription::new(state.downstream.subscription());
    *state.window.borrow_mut() = Some(inner.clone());
    inner.run(state, duration, (), 0);
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    let state = &self.0;
    state.source_done.set(true);
    let waiting = state.last.borrow().is_some() && state.window.borrow().is_some();
    if !waiting {
      state.downstream.complete();
    }
  }
}
