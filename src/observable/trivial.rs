use super::Observable;

/// Creates an observable that completes right away without emitting.
pub fn empty<T: 'static, E: 'static>() -> Observable<T, E> {
  Observable::new(|subscriber| subscriber.complete())
}

/// Creates an observable that never emits and never terminates.
pub fn never<T: 'static, E: 'static>() -> Observable<T, E> { Observable::new(|_| {}) }

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_error<T, E>(err: E) -> Observable<T, E>
where
  T: 'static,
  E: Clone + 'static,
{
  Observable::new(move |subscriber| subscriber.error(err.clone()))
}
