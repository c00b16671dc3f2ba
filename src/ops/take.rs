use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits only the first `count` values, then completes and unsubscribes
  /// from the source.
  pub fn take(self, count: usize) -> Observable<T, E> {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      if count == 0 {
        downstream.complete();
        return;
      }
      let observer = TakeObserver { downstream: downstream.clone(), remaining: count };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct TakeObserver<T, E> {
  downstream: Subscriber<T, E>,
  remaining: usize,
}

impl<T: 'static, E: 'static> Observer<T, E> for TakeObserver<T, E> {
  fn next(&mut self, value: T) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.downstream.next(value);
    if self.remaining == 0 {
      self.downstream.complete();
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
