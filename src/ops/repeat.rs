use crate::observable::{empty, Observable};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Subscribes to the source `count` times in a row, each time after the
  /// previous subscription completed. `repeat(0)` completes at once.
  ///
  /// Like `retry`, resubscription is trampolined, so a synchronous source
  /// can be repeated any number of times.
  pub fn repeat(self, count: usize) -> Observable<T, E> {
    match count {
      0 => empty(),
      1 => self,
      _ => self.repeat_when(move |completions| completions.take(count - 1)),
    }
  }
}
