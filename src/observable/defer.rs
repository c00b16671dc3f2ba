use super::{Observable, ObservableInput};

/// Creates an observable that calls `factory` on every subscription and
/// subscribes to whatever it returns.
///
/// ```rust
/// use std::{cell::Cell, rc::Rc};
/// use rxcore::prelude::*;
///
/// let calls = Rc::new(Cell::new(0));
/// let c = calls.clone();
/// let source = observable::defer(move || {
///   c.set(c.get() + 1);
///   observable::of::<_, ()>(c.get())
/// });
/// assert_eq!(calls.get(), 0);
/// source.subscribe(|_| {});
/// source.subscribe(|_| {});
/// assert_eq!(calls.get(), 2);
/// ```
pub fn defer<T, E, I, F>(factory: F) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
  I: ObservableInput<T, E>,
  F: Fn() -> I + 'static,
{
  Observable::new(move |subscriber| {
    factory()
      .into_observable()
      .subscribe_subscriber(subscriber);
  })
}
