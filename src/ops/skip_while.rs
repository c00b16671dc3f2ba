use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Ignores values while `predicate` holds; everything from the first
  /// failing value on is emitted.
  pub fn skip_while(self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T, E> {
    let predicate = Rc::new(predicate);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = SkipWhileObserver {
        downstream: downstream.clone(),
        predicate: predicate.clone(),
        skipping: true,
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct SkipWhileObserver<T, E, P> {
  downstream: Subscriber<T, E>,
  predicate: Rc<P>,
  skipping: bool,
}

impl<T, E, P> Observer<T, E> for SkipWhileObserver<T, E, P>
where
  T: 'static,
  E: 'static,
  P: Fn(&T) -> bool,
{
  fn next(&mut self, value: T) {
    if self.skipping && (self.predicate)(&value) {
      return;
    }
    self.skipping = false;
    self.downstream.next(value);
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
