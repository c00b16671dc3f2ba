use super::Observable;
use crate::{subscriber::Subscriber, subscription::Teardown};

/// Creates an observable from a producer function.
///
/// Same as [`Observable::new`]. The producer receives the subscriber of every
/// new subscription and may return a teardown to run when it ends.
///
/// ```
/// use rxcore::prelude::*;
///
/// let source = observable::create(|subscriber: Subscriber<&str, ()>| {
///   subscriber.next("hello");
///   subscriber.complete();
/// });
/// let observer = TestObserver::new();
/// source.subscribe_with(observer.clone());
/// assert_eq!(observer.values(), vec!["hello"]);
/// ```
pub fn create<T, E, F, R>(producer: F) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
  F: Fn(Subscriber<T, E>) -> R + 'static,
  R: Into<Teardown>,
{
  Observable::new(producer)
}
