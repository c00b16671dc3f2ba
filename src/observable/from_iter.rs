use std::ops::Range;

use super::Observable;

/// Creates an observable that produces values from an iterator.
///
/// The iterable is cloned for every subscription and drained synchronously;
/// the observable completes after the last element. Draining stops as soon as
/// the subscription is cancelled, so endless iterators are fine as long as
/// something downstream ends the subscription.
///
/// ```
/// use rxcore::prelude::*;
///
/// let observer = TestObserver::<u32>::new();
/// observable::from_iter(1..)
///   .take(3)
///   .subscribe_with(observer.clone());
/// assert_eq!(observer.values(), vec![1, 2, 3]);
/// ```
pub fn from_iter<I, E>(iter: I) -> Observable<I::Item, E>
where
  I: IntoIterator + Clone + 'static,
  I::Item: 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    let mut iter = iter.clone().into_iter();
    while !subscriber.is_closed() {
      match iter.next() {
        Some(value) => subscriber.next(value),
        None => subscriber.complete(),
      }
    }
  })
}

/// Emits `count` consecutive integers starting at `start`.
pub fn range<E: 'static>(start: i64, count: usize) -> Observable<i64, E> {
  let end = start.saturating_add(count as i64);
  from_iter::<Range<i64>, E>(start..end)
}
