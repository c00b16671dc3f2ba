use std::rc::Rc;

use super::Forward;
use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Continues with `next` once the source terminates, whether it completed
  /// or failed. The source's error is dropped.
  pub fn on_error_resume_next(self, next: impl ObservableInput<T, E>) -> Observable<T, E> {
    let next = next.into_observable();
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = ResumeObserver { downstream: downstream.clone(), next: next.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }

  /// Turns an error into a final value produced by `f`, then completes.
  pub fn on_error_return(self, f: impl Fn(E) -> T + 'static) -> Observable<T, E> {
    let f = Rc::new(f);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = ReturnObserver { downstream: downstream.clone(), f: f.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct ResumeObserver<T, E> {
  downstream: Subscriber<T, E>,
  next: Observable<T, E>,
}

impl<T: 'static, E: 'static> ResumeObserver<T, E> {
  fn resume(&self) {
    let forward = Rc::new(Forward(self.downstream.clone()));
    subscribe_to_result(&forward, self.downstream.subscription(), self.next.clone(), (), 0);
  }
}

impl<T: 'static, E: 'static> Observer<T, E> for ResumeObserver<T, E> {
  fn next(&mut self, value: T) { self.downstream.next(value) }

  fn error(&mut self, _: E) {
    tracing::debug!("on_error_resume_next dropped a source error");
    self.resume();
  }

  fn complete(&mut self) { self.resume() }
}

struct ReturnObserver<T, E, F> {
  downstream: Subscriber<T, E>,
  f: Rc<F>,
}

impl<T: 'static, E: 'static, F: Fn(E) -> T> Observer<T, E> for ReturnObserver<T, E, F> {
  fn next(&mut self, value: T) { self.downstream.next(value) }

  fn error(&mut self, err: E) {
    self.downstream.next((self.f)(err));
    self.downstream.complete();
  }

  fn complete(&mut self) { self.downstream.complete() }
}
