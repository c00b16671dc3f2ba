use crate::observable::{concat, Observable, ObservableInput};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Maps each value to an inner stream and subscribes to the inner streams
  /// one at a time, in order. Same as `merge_map(project, 1)`.
  pub fn concat_map<R, I>(self, project: impl Fn(T) -> I + 'static) -> Observable<R, E>
  where
    R: 'static,
    I: ObservableInput<R, E>,
  {
    self.merge_map(project, 1)
  }

  pub fn concat_map_with<R, I, Out>(
    self, project: impl Fn(T) -> I + 'static,
    selector: impl Fn(T, R, usize, usize) -> Result<Out, E> + 'static,
  ) -> Observable<Out, E>
  where
    T: Clone,
    R: 'static,
    Out: 'static,
    I: ObservableInput<R, E>,
  {
    self.merge_map_with(project, selector, 1)
  }

  pub fn concat_map_to<R: 'static>(self, inner: impl ObservableInput<R, E>) -> Observable<R, E> {
    self.merge_map_to(inner, 1)
  }

  /// Emits the values of `other` once this stream has completed.
  pub fn concat(self, other: impl ObservableInput<T, E>) -> Observable<T, E> {
    concat([self, other.into_observable()])
  }
}

impl<R: 'static, E: 'static> Observable<Observable<R, E>, E> {
  /// Subscribes to the emitted streams one after the other.
  pub fn concat_all(self) -> Observable<R, E> { self.merge_all(1) }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::*};

  #[test]
  fn inner_streams_do_not_overlap() {
    let scheduler = VirtualTimeScheduler::new();
    let values = [('a', 'a'), ('b', 'b')];
    let inner = cold::<char, RxError>("-a-b|", &values, &scheduler);
    let observer = TestObserver::with_clock(scheduler.clone());
    cold::<i32, RxError>("x-y|", &[('x', 1), ('y', 2)], &scheduler)
      .concat_map(move |_| inner.clone())
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.records(), expected("-a-b-a-b|", &values));
  }

  #[test]
  fn selector_and_map_to() {
    let observer = TestObserver::<(char, i32)>::new();
    observable::from_iter(vec!['a', 'b'])
      .concat_map_with(|_| vec![1, 2], |o, i, _, _| Ok((o, i)))
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![('a', 1), ('a', 2), ('b', 1), ('b', 2)]);

    let observer = TestObserver::<&str>::new();
    observable::from_iter(0..3).concat_map_to(vec!["x"]).subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec!["x", "x", "x"]);
  }

  #[test]
  fn concat_all_and_instance_concat() {
    let scheduler = VirtualTimeScheduler::new();
    let slow = observable::timer(1, Duration::from_millis(10), scheduler.clone());
    let observer = TestObserver::<i32>::new();
    observable::from_iter(vec![slow.clone(), observable::of(2)])
      .concat_all()
      .concat(vec![3])
      .subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.values(), vec![1, 2, 3]);
    assert!(observer.is_completed());
  }
}
