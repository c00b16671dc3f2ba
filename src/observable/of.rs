use super::Observable;

/// Creates an observable producing a single value, then completing.
///
/// ```
/// use rxcore::prelude::*;
///
/// let observer = TestObserver::<i32>::new();
/// observable::of(123).subscribe_with(observer.clone());
/// assert_eq!(observer.values(), vec![123]);
/// assert!(observer.is_completed());
/// ```
pub fn of<T, E>(value: T) -> Observable<T, E>
where
  T: Clone + 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    subscriber.next(value.clone());
    subscriber.complete();
  })
}

/// Creates an observable that emits the `Ok` value and completes, or
/// terminates with the `Err` value.
pub fn of_result<T, E>(result: Result<T, E>) -> Observable<T, E>
where
  T: Clone + 'static,
  E: Clone + 'static,
{
  Observable::new(move |subscriber| match result.clone() {
    Ok(value) => {
      subscriber.next(value);
      subscriber.complete();
    }
    Err(err) => subscriber.error(err),
  })
}

/// Creates an observable that emits the value if there is one, then
/// completes.
pub fn of_option<T, E>(option: Option<T>) -> Observable<T, E>
where
  T: Clone + 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    if let Some(value) = option.clone() {
      subscriber.next(value);
    }
    subscriber.complete();
  })
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn of_emits_once() {
    let observer = TestObserver::<&str>::new();
    observable::of("x").subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec!["x"]);
    assert_eq!(observer.complete_count(), 1);
  }

  #[test]
  fn of_result_err() {
    let observer = TestObserver::<i32, &str>::new();
    observable::of_result(Err("bad")).subscribe_with(observer.clone());
    assert!(observer.values().is_empty());
    assert_eq!(observer.errors(), vec!["bad"]);
  }

  #[test]
  fn of_option_none_only_completes() {
    let observer = TestObserver::<i32>::new();
    observable::of_option(None).subscribe_with(observer.clone());
    assert!(observer.values().is_empty());
    assert!(observer.is_completed());
  }
}
