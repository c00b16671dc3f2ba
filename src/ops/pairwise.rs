use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: Clone + 'static, E: 'static> Observable<T, E> {
  /// Emits `(previous, current)` for every value after the first.
  pub fn pairwise(self) -> Observable<(T, T), E> {
    self.lift(|downstream: Subscriber<(T, T), E>, source: &Observable<T, E>| {
      let observer = PairwiseObserver { downstream: downstream.clone(), prev: None };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct PairwiseObserver<T, E> {
  downstream: Subscriber<(T, T), E>,
  prev: Option<T>,
}

impl<T: Clone + 'static, E: 'static> Observer<T, E> for PairwiseObserver<T, E> {
  fn next(&mut self, value: T) {
    if let Some(prev) = self.prev.replace(value.clone()) {
      self.downstream.next((prev, value));
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
