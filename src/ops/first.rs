use crate::{error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits the first value and completes. A source that completes empty
  /// terminates with [`RxError::Empty`].
  pub fn first(self) -> Observable<T, E>
  where
    E: From<RxError>,
  {
    self.lift(|downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = FirstObserver {
        downstream: downstream.clone(),
        fallback: Some(Fallback::Error(|| RxError::Empty.into())),
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }

  /// Emits the first value and completes, or emits `default` if the source
  /// completes empty.
  pub fn first_or(self, default: T) -> Observable<T, E>
  where
    T: Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = FirstObserver {
        downstream: downstream.clone(),
        fallback: Some(Fallback::Value(default.clone())),
      };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

/// What an operator emits when the source completes without the value it
/// was waiting for.
pub(crate) enum Fallback<T, E> {
  Value(T),
  Error(fn() -> E),
}

impl<T: 'static, E: 'static> Fallback<T, E> {
  pub(crate) fn emit(self, downstream: &Subscriber<T, E>) {
    match self {
      Fallback::Value(v) => {
        downstream.next(v);
        downstream.complete();
      }
      Fallback::Error(err) => downstream.error(err()),
    }
  }
}

struct FirstObserver<T, E> {
  downstream: Subscriber<T, E>,
  fallback: Option<Fallback<T, E>>,
}

impl<T: 'static, E: 'static> Observer<T, E> for FirstObserver<T, E> {
  fn next(&mut self, value: T) {
    self.fallback = None;
    self.downstream.next(value);
    self.downstream.complete();
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) {
    match self.fallback.take() {
      Some(fallback) => fallback.emit(&self.downstream),
      None => self.downstream.complete(),
    }
  }
}
