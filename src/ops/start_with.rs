use crate::observable::{concat, from_iter, Observable};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits `values` before the source's own values.
  pub fn start_with(self, values: impl IntoIterator<Item = T>) -> Observable<T, E>
  where
    T: Clone,
  {
    let values: Vec<T> = values.into_iter().collect();
    concat([from_iter(values), self])
  }
}
