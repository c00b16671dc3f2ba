use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: Clone + 'static, E: 'static> Observable<T, E> {
  /// Drops values equal to the one emitted right before them.
  pub fn distinct_until_changed(self) -> Observable<T, E>
  where
    T: PartialEq,
  {
    self.distinct_until_changed_by(|a, b| Ok(a == b))
  }

  /// Like [`distinct_until_changed`](Self::distinct_until_changed) with a
  /// custom equality that can fail.
  pub fn distinct_until_changed_by(
    self, eq: impl Fn(&T, &T) -> Result<bool, E> + 'static,
  ) -> Observable<T, E> {
    let eq = Rc::new(eq);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = DistinctObserver { downstream: downstream.clone(), eq: eq.clone(), last: None };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct DistinctObserver<T, E, F> {
  downstream: Subscriber<T, E>,
  eq: Rc<F>,
  last: Option<T>,
}

impl<T, E, F> Observer<T, E> for DistinctObserver<T, E, F>
where
  T: Clone + 'static,
  E: 'static,
  F: Fn(&T, &T) -> Result<bool, E>,
{
  fn next(&mut self, value: T) {
    let same = match &self.last {
      Some(last) => (self.eq)(last, &value),
      None => Ok(false),
    };
    match same {
      Ok(true) => {}
      Ok(false) => {
        self.last = Some(value.clone());
        self.downstream.next(value);
      }
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
  fn drops_consecutive_duplicates() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(vec![1, 1, 2, 2, 1, 3, 3])
      .distinct_until_changed()
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 2, 1, 3]);
  }

  #[test]
  fn custom_comparison() {
    let observer = TestObserver::<&str, ()>::new();
    observable::from_iter(vec!["a", "A", "b", "B", "a"])
      .distinct_until_changed_by(|a, b| Ok(a.eq_ignore_ascii_case(b)))
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec!["a", "b", "a"]);
  }

  #[test]
  fn failing_comparison() {
    let observer = TestObserver::<i32, &str>::new();
    observable::from_iter(vec![1, 2])
      .distinct_until_changed_by(|_, _| Err("cannot compare"))
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.errors(), vec!["cannot compare"]);
  }
}
