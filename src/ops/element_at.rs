use crate::{error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits the value at `index` (zero based) and completes. A source that
  /// completes earlier terminates with [`RxError::ArgumentOutOfRange`].
  pub fn element_at(self, index: usize) -> Observable<T, E>
  where
    E: From<RxError>,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let observer = ElementAtObserver { downstream: downstream.clone(), index, seen: 0 };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct ElementAtObserver<T, E> {
  downstream: Subscriber<T, E>,
  index: usize,
  seen: usize,
}

impl<T: 'static, E: From<RxError> + 'static> Observer<T, E> for ElementAtObserver<T, E> {
  fn next(&mut self, value: T) {
    if self.seen == self.index {
      self.downstream.next(value);
      self.downstream.complete();
    }
    self.seen += 1;
  }

  fn error(&mut self, err: E) { self.downstream.error(err) }

  fn complete(&mut self) { self.downstream.error(RxError::ArgumentOutOfRange { index: self.index }.into()) }
}
