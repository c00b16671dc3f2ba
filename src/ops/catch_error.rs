use std::rc::Rc;

use super::Forward;
use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Replaces an erroring source with the stream `selector` returns.
  ///
  /// The selector receives the error and the source itself, so returning the
  /// second argument resubscribes. The replacement may use another error
  /// type.
  pub fn catch_error<E2, I>(self, selector: impl Fn(E, Observable<T, E>) -> I + 'static) -> Observable<T, E2>
  where
    E2: 'static,
    I: ObservableInput<T, E2>,
  {
    let selector = Rc::new(selector);
    self.lift(move |downstream: Subscriber<T, E2>, source: &Observable<T, E>| {
      let observer = CatchObserver {
        downstream: downstream.clone(),
        selector: selector.clone(),
        caught: source.clone(),
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct CatchObserver<T, E, E2, F> {
  downstream: Subscriber<T, E2>,
  selector: Rc<F>,
  caught: Observable<T, E>,
}

impl<T, E, E2, F, I> Observer<T, E> for CatchObserver<T, E, E2, F>
where
  T: 'static,
  E: 'static,
  E2: 'static,
  F: Fn(E, Observable<T, E>) -> I,
  I: ObservableInput<T, E2>,
{
  fn next(&mut self, value: T) { self.downstream.next(value) }

  fn error(&mut self, err: E) {
    tracing::debug!("catch_error switching to the replacement stream");
    let replacement = (self.selector)(err, self.caught.clone());
    let forward = Rc::new(Forward(self.downstream.clone()));
    subscribe_to_result(&forward, self.downstream.subscription(), replacement, (), 0);
  }

  fn complete(&mut self) { self.downstream.complete() }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn switches_to_replacement() {
    let observer = TestObserver::<i32, String>::new();
    Observable::<i32, &str>::new(|subscriber| {
      subscriber.next(1);
      subscriber.error("bad");
    })
    .catch_error(|_, _| observable::from_iter(vec![8, 9]))
    .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 8, 9]);
    assert!(observer.is_completed());
  }

  #[test]
  fn replacement_error_reaches_downstream() {
    let observer = TestObserver::<i32, String>::new();
    observable::throw_error::<i32, _>(404)
      .catch_error(|code, _| observable::throw_error(format!("status {code}")))
      .subscribe_with(observer.clone());
    assert_eq!(observer.errors(), vec!["status 404".to_owned()]);
  }

  #[test]
  fn caught_source_resubscribes() {
    let attempts = Rc::new(Cell::new(0));
    let a = attempts.clone();
    let source = Observable::<i32, &str>::new(move |subscriber| {
      a.set(a.get() + 1);
      if a.get() < 2 {
        subscriber.error("flaky");
      } else {
        subscriber.next(a.get());
        subscriber.complete();
      }
    });
    let observer = TestObserver::<i32, &str>::new();
    source.catch_error(|_, caught| caught).subscribe_with(observer.clone());
    assert_eq!(attempts.get(), 2);
    assert_eq!(observer.values(), vec![2]);
    assert!(observer.is_completed());
  }
}
