use super::first::Fallback;
use crate::{error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits the last value when the source completes. A source that completes
  /// empty terminates with [`RxError::Empty`].
  pub fn last(self) -> Observable<T, E>
  where
    E: From<RxError>,
  {
    self.lift(|downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = LastObserver { downstream: downstream.clone(), last: None };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct LastObserver<T, E> {
  downstream: Subscriber<T, E>,
  last: Option<T>,
}

impl<T: 'static, E: From<RxError> + 'static> Observer<T, E> for LastObserver<T, E> {
  fn next(&mut self, value: T) { self.last = Some(value) }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) {
    match self.last.take() {
      Some(last) => Fallback::Value(last),
      None => Fallback::Error(|| RxError::Empty.into()),
    }
    .emit(&self.downstream)
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn last_value() {
    let observer = TestObserver::<i32, RxError>::new();
    observable::from_iter(0..4).last().subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![3]);
    assert!(observer.is_completed());
  }

  #[test]
  fn empty_source() {
    let observer = TestObserver::<i32, RxError>::new();
    observable::empty().last().subscribe_with(observer.clone());
    assert_eq!(observer.errors(), vec![RxError::Empty]);
  }
}
