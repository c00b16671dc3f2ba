use std::rc::Rc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  pub fn map<R: 'static>(self, f: impl Fn(T) -> R + 'static) -> Observable<R, E> {
    let f = Rc::new(f);
    self.lift(move |downstream: Subscriber<R, E>, source: &Observable<T, E>| {
      let observer = MapObserver { downstream: downstream.clone(), f: f.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }

  /// Like [`map`](Self::map), with a projection that can fail. The first
  /// `Err` terminates the stream with that error.
  pub fn try_map<R: 'static>(self, f: impl Fn(T) -> Result<R, E> + 'static) -> Observable<R, E> {
    let f = Rc::new(f);
    self.lift(move |downstream: Subscriber<R, E>, source: &Observable<T, E>| {
      let observer = TryMapObserver { downstream: downstream.clone(), f: f.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }

  /// Maps every value to a clone of `value`.
  pub fn map_to<R: Clone + 'static>(self, value: R) -> Observable<R, E> { self.map(move |_| value.clone()) }
}

struct MapObserver<R, E, F> {
  downstream: Subscriber<R, E>,
  f: Rc<F>,
}

impl<T, R, E, F> Observer<T, E> for MapObserver<R, E, F>
where
  R: 'static,
  E: 'static,
  F: Fn(T) -> R,
{
  fn next(&mut self, value: T) { self.downstream.next((self.f)(value)) }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}

struct TryMapObserver<R, E, F> {
  downstream: Subscriber<R, E>,
  f: Rc<F>,
}

impl<T, R, E, F> Observer<T, E> for TryMapObserver<R, E, F>
where
  R: 'static,
  E: 'static,
  F: Fn(T) -> Result<R, E>,
{
  fn next(&mut self, value: T) {
    match (self.f)(value) {
      Ok(v) => self.downstream.next(v),
      Err(err) => self.downstream.error(err),
    }
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.complete() }
}
