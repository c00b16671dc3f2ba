//! Error types shared by the whole crate.
//!
//! Stream errors are generic: every `Observable<T, E>` chooses its own `E`.
//! Operators that need to raise an error of their own (`timeout`, `first`,
//! `element_at`, ...) require `E: From<RxError>` so the library error can be
//! folded into the user's error type.
//!
//! Teardown failures are not stream errors. They are collected by
//! [`Subscription::unsubscribe`](crate::subscription::Subscription::unsubscribe)
//! into one [`UnsubscriptionError`].

use crate::scheduler::Duration;

/// Error produced by a fallible teardown action.
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Errors raised by operators themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
  /// No value arrived within the allowed window.
  #[error("timeout has occurred after {due:?}")]
  Timeout {
    /// The window that elapsed without a value.
    due: Duration,
  },

  /// The source completed without emitting the value an operator required.
  #[error("no elements in sequence")]
  Empty,

  /// The source completed before reaching the requested index.
  #[error("argument out of range: index {index}")]
  ArgumentOutOfRange { index: usize },

  /// Free-form error, mostly useful in tests and examples.
  #[error("{0}")]
  Custom(String),
}

impl RxError {
  pub fn custom(message: impl Into<String>) -> Self { Self::Custom(message.into()) }
}

/// One or more teardown actions failed while a subscription was being
/// unsubscribed.
///
/// Every teardown still ran; this error only reports the failures. Failures
/// of nested subscriptions are flattened into their parent's error.
#[derive(Debug, thiserror::Error)]
#[error("{}", render(.errors))]
pub struct UnsubscriptionError {
  pub errors: Vec<BoxError>,
}

impl UnsubscriptionError {
  pub(crate) fn new(errors: Vec<BoxError>) -> Self { Self { errors } }

  /// Number of teardown actions that failed.
  pub fn len(&self) -> usize { self.errors.len() }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }
}

fn render(errors: &[BoxError]) -> String {
  let mut message = format!("{} error(s) occurred during unsubscription", errors.len());
  for (idx, err) in errors.iter().enumerate() {
    message.push_str(&format!("\n  {}) {}", idx + 1, err));
  }
  message
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unsubscription_error_lists_every_failure() {
    let err = UnsubscriptionError::new(vec!["first".into(), "second".into()]);
    assert_eq!(err.len(), 2);
    assert_eq!(
      err.to_string(),
      "2 error(s) occurred during unsubscription\n  1) first\n  2) second"
    );
  }

  #[test]
  fn rx_error_messages() {
    assert_eq!(RxError::Empty.to_string(), "no elements in sequence");
    assert_eq!(
      RxError::ArgumentOutOfRange { index: 3 }.to_string(),
      "argument out of range: index 3"
    );
    assert_eq!(RxError::custom("boom"), RxError::Custom("boom".to_owned()));
  }
}
