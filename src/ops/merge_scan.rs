use std::{cell::RefCell, rc::Rc};

use super::merge_map::{subscribe_merged, Project, Select};
use crate::{
  observable::{Observable, ObservableInput},
  subscriber::Subscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Like `scan`, with an accumulator that returns a stream. Every value of
  /// those streams is emitted and becomes the new accumulated value.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_scan<A, I>(
    self, accumulator: impl Fn(A, T) -> I + 'static, seed: A, concurrent: usize,
  ) -> Observable<A, E>
  where
    A: Clone + 'static,
    I: ObservableInput<A, E>,
  {
    assert!(concurrent > 0, "`concurrent` must be greater than zero");
    let accumulator = Rc::new(accumulator);
    self.lift(move |downstream: Subscriber<A, E>, source: &Observable<T, E>| {
      let acc = Rc::new(RefCell::new(seed.clone()));
      let (current, f) = (acc.clone(), accumulator.clone());
      let project: Project<T, (), A, E> = Rc::new(move |value| {
        let seed = current.borrow().clone();
        ((), f(seed, value).into_observable())
      });
      let select: Select<(), A, A, E> = Rc::new(move |_, value: A, _, _| {
        *acc.borrow_mut() = value.clone();
        Ok(value)
      });
      subscribe_merged(downstream, source, project, select, concurrent);
    })
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn accumulates_through_inner_streams() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(vec![1, 2, 3])
      .merge_scan(|acc, v| observable::of(acc + v), 0, 1)
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 3, 6]);
    assert!(observer.is_completed());
  }

  #[test]
  fn every_inner_value_is_the_new_seed() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(vec![10, 100])
      .merge_scan(|acc, v| vec![acc + 1, acc + v], 0, usize::MAX)
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 10, 11, 110]);
  }

  #[test]
  fn seed_is_fresh_per_subscription() {
    let source = observable::from_iter(vec![1, 1]).merge_scan(|acc, v| observable::of(acc + v), 5, 1);
    for _ in 0..2 {
      let observer = TestObserver::<i32>::new();
      source.subscribe_with(observer.clone());
      assert_eq!(observer.values(), vec![6, 7]);
    }
  }
}
