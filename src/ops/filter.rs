use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits only the values for which `predicate` returns `true`.
  pub fn filter(self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T, E> {
    self.try_filter(move |v| Ok(predicate(v)))
  }

  /// Like [`filter`](Self::filter), with a predicate that can fail.
  pub fn try_filter(self, predicate: impl Fn(&T) -> Result<bool, E> + 'static) -> Observable<T, E> {
    let predicate = Rc::new(predicate);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = FilterObserver { downstream: downstream.clone(), predicate: predicate.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct FilterObserver<T, E, F> {
  downstream: Subscriber<T, E>,
  predicate: Rc<F>,
}

impl<T, E, F> Observer<T, E> for FilterObserver<T, E, F>
where
  T: 'static,
  E: 'static,
  F: Fn(&T) -> Result<bool, E>,
{
  fn next(&mut self, value: T) {
    match (self.predicate)(&value) {
      Ok(true) => self.downstream.next(value),
      Ok(false) => {}
      Err(err) => self.downstream.error(err),
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn keeps_matching_values() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(0..10)
      .filter(|v| v % 2 == 0)
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![0, 2, 4, 6, 8]);
    assert!(observer.is_completed());
  }

  #[test]
  fn failing_predicate_terminates() {
    let observer = TestObserver::<i32, String>::new();
    observable::from_iter(0..10)
      .try_filter(|v| if *v < 3 { Ok(true) } else { Err(format!("{v} rejected")) })
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![0, 1, 2]);
    assert_eq!(observer.errors(), vec!["3 rejected".to_owned()]);
  }
}
