use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Ignores the first `count` values.
  pub fn skip(self, count: usize) -> Observable<T, E> {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = SkipObserver { downstream: downstream.clone(), remaining: count };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct SkipObserver<T, E> {
  downstream: Subscriber<T, E>,
  remaining: usize,
}

impl<T: 'static, E: 'static> Observer<T, E> for SkipObserver<T, E> {
  fn next(&mut self, value: T) {
    if self.remaining == 0 {
      self.downstream.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
