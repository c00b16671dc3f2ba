//! Failing or switching over when a source goes quiet.

use std::{
  cell::RefCell,
  rc::{Rc, Weak},
};

use super::Forward;
use crate::{
  error::RxError,
  observable::{Observable, ObservableInput},
  observer::Observer,
  scheduler::{Duration, Scheduler},
  subscriber::{subscribe_to_result, Subscriber},
  subscription::Subscription,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Errors with [`RxError::Timeout`] when `due` passes without a value.
  ///
  /// The window starts at subscription and restarts with every value.
  pub fn timeout<S>(self, due: Duration, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
    E: From<RxError>,
  {
    self.timeout_then(due, OnTimeout::Fail(|due| E::from(RxError::Timeout { due })), scheduler)
  }

  /// Like [`timeout`](Self::timeout), but unsubscribes the source and
  /// continues with `fallback` instead of failing.
  pub fn timeout_with<S>(self, due: Duration, fallback: impl ObservableInput<T, E>, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.timeout_then(due, OnTimeout::Switch(fallback.into_observable()), scheduler)
  }

  fn timeout_then<S>(self, due: Duration, on_timeout: OnTimeout<T, E>, scheduler: S) -> Observable<T, E>
  where
    S: Scheduler + Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Timeout {
        downstream: downstream.clone(),
        scheduler: scheduler.clone(),
        due,
        on_timeout: on_timeout.clone(),
        source: RefCell::new(None),
        timer: RefCell::new(None),
      });
      Timeout::arm(&state);
      let subscription = source.subscribe_within(downstream.subscription(), TimeoutObserver(state.clone()));
      *state.source.borrow_mut() = Some(subscription);
    })
  }
}

enum OnTimeout<T, E> {
  Fail(fn(Duration) -> E),
  Switch(Observable<T, E>),
}

impl<T, E> Clone for OnTimeout<T, E> {
  fn clone(&self) -> Self {
    match self {
      OnTimeout::Fail(f) => OnTimeout::Fail(*f),
      OnTimeout::Switch(o) => OnTimeout::Switch(o.clone()),
    }
  }
}

struct Timeout<T, E, S> {
  downstream: Subscriber<T, E>,
  scheduler: S,
  due: Duration,
  on_timeout: OnTimeout<T, E>,
  source: RefCell<Option<Subscription>>,
  timer: RefCell<Option<Subscription>>,
}

impl<T: 'static, E: 'static, S: Scheduler> Timeout<T, E, S> {
  fn disarm(&self) {
    if let Some(timer) = self.timer.borrow_mut().take() {
      timer.release();
    }
  }

  fn arm(this: &Rc<Self>) {
    this.disarm();
    let weak: Weak<Self> = Rc::downgrade(this);
    let timer = this.scheduler.schedule_task(
      Box::new(move || {
        if let Some(state) = weak.upgrade() {
          state.fire();
        }
      }),
      this.due,
    );
    this.downstream.add(&timer);
    *this.timer.borrow_mut() = Some(timer);
  }

  fn fire(&self) {
    tracing::debug!(due = ?self.due, "timeout elapsed");
    match &self.on_timeout {
      OnTimeout::Fail(make) => self.downstream.error(make(self.due)),
      OnTimeout::Switch(fallback) => {
        if let Some(source) = self.source.borrow_mut().take() {
          source.release();
        }
        let forward = Rc::new(Forward(self.downstream.clone()));
        subscribe_to_result(&forward, self.downstream.subscription(), fallback.clone(), (), 0);
      }
    }
  }
}

struct TimeoutObserver<T, E, S>(Rc<Timeout<T, E, S>>);

impl<T: 'static, E: 'static, S: Scheduler> Observer<T, E> for TimeoutObserver<T, E, S> {
  fn next(&mut self, value: T) {
    self.0.downstream.next(value);
    if !self.0.downstream.is_closed() {
      Timeout::arm(&self.0);
    }
  }

  fn error(&mut self, err: E) {
    self.0.disarm();
    self.0.downstream.error(err)
  }

  fn complete(&mut self) {
    self.0.disarm();
    self.0.downstream.complete()
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::*};

  #[test]
  fn errors_when_gap_is_too_long() {
    let scheduler = VirtualTimeScheduler::new();
    let values = [('a', 1), ('b', 2), ('c', 3)];
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<i32, RxError>("a-b-----c|", &values, &scheduler)
      .timeout(Duration::from_millis(4), scheduler.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();

    let mut want = expected::<i32, RxError>("a-b", &values);
    want.push((Duration::from_millis(6), Notification::Error(RxError::Timeout { due: Duration::from_millis(4) })));
    assert_eq!(observer.records(), want);
  }

  #[test]
  fn values_in_time_pass() {
    let scheduler = VirtualTimeScheduler::new();
    let values = [('a', 1), ('b', 2)];
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<i32, RxError>("-a--b--|", &values, &scheduler)
      .timeout(Duration::from_millis(4), scheduler.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.records(), expected("-a--b--|", &values));
    assert!(scheduler.is_empty());
  }

  #[test]
  fn switches_to_fallback() {
    let scheduler = VirtualTimeScheduler::new();
    let values = [('a', 1), ('x', 10), ('y', 20)];
    let fallback = cold::<i32, RxError>("x-y|", &values, &scheduler);
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<i32, RxError>("a------b|", &[('a', 1), ('b', 2)], &scheduler)
      .timeout_with(Duration::from_millis(3), fallback, scheduler.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.records(), expected("a--x-y|", &values));
  }
}
