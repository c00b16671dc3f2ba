use crate::subscriber::Subscriber;

/// One event of the three-channel protocol, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T, E> {
  Next(T),
  Error(E),
  Complete,
}

impl<T, E> Notification<T, E> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  /// Replays this notification on `subscriber`.
  pub fn observe(self, subscriber: &Subscriber<T, E>)
  where
    T: 'static,
    E: 'static,
  {
    match self {
      Notification::Next(v) => subscriber.next(v),
      Notification::Error(e) => subscriber.error(e),
      Notification::Complete => subscriber.complete(),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Notification<U, E> {
    match self {
      Notification::Next(v) => Notification::Next(f(v)),
      Notification::Error(e) => Notification::Error(e),
      Notification::Complete => Notification::Complete,
    }
  }
}
