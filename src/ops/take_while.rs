use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits values while `predicate` holds and completes at the first value
  /// that fails it. With `inclusive` that value is emitted before completing.
  pub fn take_while(self, predicate: impl Fn(&T) -> bool + 'static, inclusive: bool) -> Observable<T, E> {
    let predicate = Rc::new(predicate);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = TakeWhileObserver {
        downstream: downstream.clone(),
        predicate: predicate.clone(),
        inclusive,
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct TakeWhileObserver<T, E, P> {
  downstream: Subscriber<T, E>,
  predicate: Rc<P>,
  inclusive: bool,
}

impl<T, E, P> Observer<T, E> for TakeWhileObserver<T, E, P>
where
  T: 'static,
  E: 'static,
  P: Fn(&T) -> bool,
{
  fn next(&mut self, value: T) {
    if (self.predicate)(&value) {
      self.downstream.next(value);
    } else {
      if self.inclusive {
        self.downstream.next(value);
      }
      self.downstream.complete();
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
