use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Applies an accumulator over the values and emits every intermediate
  /// result. Each subscription starts again from `initial`.
  pub fn scan<A>(self, initial: A, f: impl Fn(A, T) -> A + 'static) -> Observable<A, E>
  where
    A: Clone + 'static,
  {
    self.try_scan(initial, move |acc, v| Ok(f(acc, v)))
  }

  /// Like [`scan`](Self::scan), with an accumulator that can fail.
  pub fn try_scan<A>(
    self, initial: A, f: impl Fn(A, T) -> Result<A, E> + 'static,
  ) -> Observable<A, E>
  where
    A: Clone + 'static,
  {
    let f = Rc::new(f);
    self.lift(move |downstream: Subscriber<A, E>, source: &Observable<T, E>| {
      let observer = ScanObserver {
        downstream: downstream.clone(),
        f: f.clone(),
        acc: Some(initial.clone()),
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct ScanObserver<A, E, F> {
  downstream: Subscriber<A, E>,
  f: Rc<F>,
  acc: Option<A>,
}

impl<T, A, E, F> Observer<T, E> for ScanObserver<A, E, F>
where
  A: Clone + 'static,
  E: 'static,
  F: Fn(A, T) -> Result<A, E>,
{
  fn next(&mut self, value: T) {
    let Some(acc) = self.acc.take() else { return };
    match (self.f)(acc, value) {
      Ok(acc) => {
        self.acc = Some(acc.clone());
        self.downstream.next(acc);
      }
      Err(err) => self.downstream.error(err),
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
