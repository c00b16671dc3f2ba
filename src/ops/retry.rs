//! Resubscribing to a failed source.
//!
//! How often and how soon `retry` tries again is decided by a
//! [`RetryPolicy`]. A plain `usize` is a policy (retry that many times
//! without delay); [`RetryConfig`] adds a delay (waited out by
//! [`retry_on`](crate::observable::Observable::retry_on)) and resetting the
//! count on success. Custom policies can look at the error:
//!
//! ```rust
//! use rxcore::{ops::retry::RetryPolicy, prelude::*};
//!
//! #[derive(Clone)]
//! struct ServerErrors;
//!
//! impl RetryPolicy<u16> for ServerErrors {
//!   fn should_retry(&self, status: &u16, attempt: usize) -> Option<Duration> {
//!     match status {
//!       500..=599 if attempt < 3 => Some(Duration::ZERO),
//!       _ => None,
//!     }
//!   }
//! }
//!
//! let observer = TestObserver::<i32, u16>::new();
//! observable::throw_error(404u16)
//!   .retry(ServerErrors)
//!   .subscribe_with(observer.clone());
//! assert_eq!(observer.errors(), vec![404]);
//! ```

use std::{cell::Cell, rc::Rc};

use crate::{
  observable::Observable,
  scheduler::{Duration, QueueScheduler, Scheduler},
  subscriber::{InnerSubscription, OuterObserver, Subscriber},
};

/// Decides whether a failed source is subscribed again.
pub trait RetryPolicy<Err>: Clone {
  /// Returns the delay before the next attempt, or `None` to give up and
  /// forward `err`.
  ///
  /// `attempt` is the number of retries already made: 0 when the source
  /// fails for the first time.
  fn should_retry(&self, err: &Err, attempt: usize) -> Option<Duration>;

  /// Whether a value from the source resets the attempt counter.
  fn reset_on_success(&self) -> bool { false }

  /// Whether [`should_retry`](Self::should_retry) may ask for a positive
  /// delay. Such a policy needs a scheduler that waits, so
  /// [`Observable::retry`] refuses it.
  fn waits(&self) -> bool { false }
}

impl<Err> RetryPolicy<Err> for usize {
  fn should_retry(&self, _err: &Err, attempt: usize) -> Option<Duration> {
    if attempt < *self { Some(Duration::ZERO) } else { None }
  }
}

/// Builder for a count/delay retry policy.
///
/// ```rust
/// use rxcore::{ops::retry::RetryConfig, scheduler::Duration};
///
/// let config = RetryConfig::new()
///   .count(5)
///   .delay(Duration::from_secs(1))
///   .reset_on_success();
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  delay: Option<Duration>,
  reset_on_success: bool,
}

impl RetryConfig {
  /// Retries forever, without delay.
  pub fn new() -> Self { Self::default() }

  /// Maximum number of retries. `count(3)` means at most four subscriptions.
  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  /// Starts counting from zero again whenever the source emits a value.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }
}

impl<Err> RetryPolicy<Err> for RetryConfig {
  fn should_retry(&self, _err: &Err, attempt: usize) -> Option<Duration> {
    match self.count {
      Some(count) if attempt >= count => None,
      _ => Some(self.delay.unwrap_or(Duration::ZERO)),
    }
  }

  fn reset_on_success(&self) -> bool { self.reset_on_success }

  fn waits(&self) -> bool { self.delay.is_some_and(|delay| !delay.is_zero()) }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Resubscribes to the source when it errors, as long as `policy` allows.
  ///
  /// Resubscription goes through the [`QueueScheduler`], so a source that
  /// fails synchronously does not grow the stack. The queue never waits:
  /// policies with a delay go through [`retry_on`](Self::retry_on).
  ///
  /// # Panics
  ///
  /// Panics if the policy [`waits`](RetryPolicy::waits).
  pub fn retry<P: RetryPolicy<E> + 'static>(self, policy: P) -> Observable<T, E> {
    assert!(
      !policy.waits(),
      "a retry policy with a delay needs a waiting scheduler, use `retry_on`"
    );
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      Retry::start(downstream, source.clone(), policy.clone(), QueueScheduler, false);
    })
  }

  /// Like [`retry`](Self::retry), waiting out the policy's delays on
  /// `scheduler`.
  pub fn retry_on<P, S>(self, policy: P, scheduler: S) -> Observable<T, E>
  where
    P: RetryPolicy<E> + 'static,
    S: Scheduler + Clone,
  {
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      Retry::start(downstream, source.clone(), policy.clone(), scheduler.clone(), true);
    })
  }
}

struct Retry<T, E, P, S> {
  downstream: Subscriber<T, E>,
  source: Observable<T, E>,
  policy: P,
  scheduler: S,
  can_wait: bool,
  attempts: Cell<usize>,
}

impl<T: 'static, E: 'static, P: RetryPolicy<E> + 'static, S: Scheduler> Retry<T, E, P, S> {
  fn start(downstream: Subscriber<T, E>, source: Observable<T, E>, policy: P, scheduler: S, can_wait: bool) {
    let retry = Rc::new(Retry { downstream, source, policy, scheduler, can_wait, attempts: Cell::new(0) });
    Retry::subscribe(&retry);
  }

  fn subscribe(this: &Rc<Self>) {
    if this.downstream.is_closed() {
      return;
    }
    let inner = InnerSubscription::new(this.downstream.subscription());
    inner.run(this, this.source.clone(), (), this.attempts.get());
  }
}

impl<T, E, P, S> OuterObserver<(), T, E> for Retry<T, E, P, S>
where
  T: 'static,
  E: 'static,
  P: RetryPolicy<E> + 'static,
  S: Scheduler,
{
  fn notify_next(this: &Rc<Self>, _: (), value: T, _: usize, _: usize, _: &InnerSubscription) {
    if this.policy.reset_on_success() {
      this.attempts.set(0);
    }
    this.downstream.next(value);
  }

  fn notify_error(this: &Rc<Self>, err: E, inner: &InnerSubscription) {
    inner.detach();
    let attempt = this.attempts.get();
    match this.policy.should_retry(&err, attempt) {
      Some(delay) => {
        this.attempts.set(attempt + 1);
        tracing::debug!(attempt = attempt + 1, ?delay, "retrying failed source");
        if !this.can_wait && !delay.is_zero() {
          tracing::warn!(?delay, "retry policy asked for a delay the queue cannot wait for");
        }
        let again = this.clone();
        let task = this
          .scheduler
          .schedule_task(Box::new(move || Retry::subscribe(&again)), delay);
        this.downstream.add(task);
      }
      None => this.downstream.error(err),
    }
  }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.downstream.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;
  use crate::{prelude::*, testing::TestObserver};

  fn failing_until(success_at: u32, attempts: Rc<Cell<u32>>) -> Observable<u32, &'static str> {
    Observable::new(move |subscriber| {
      attempts.set(attempts.get() + 1);
      if attempts.get() < success_at {
        subscriber.error("not yet");
      } else {
        subscriber.next(attempts.get());
        subscriber.complete();
      }
    })
  }

  #[test]
  fn count_policy_succeeds_in_time() {
    let attempts = Rc::new(Cell::new(0));
    let observer = TestObserver::new();
    failing_until(3, attempts.clone()).retry(5).subscribe_with(observer.clone());
    assert_eq!(attempts.get(), 3);
    assert_eq!(observer.values(), vec![3]);
    assert!(observer.is_completed());
  }

  #[test]
  fn count_policy_gives_up() {
    let attempts = Rc::new(Cell::new(0));
    let observer = TestObserver::new();
    failing_until(100, attempts.clone()).retry(2).subscribe_with(observer.clone());
    assert_eq!(attempts.get(), 3);
    assert_eq!(observer.errors(), vec!["not yet"]);
  }

  #[test]
  fn synchronous_failures_do_not_recurse() {
    let attempts = Rc::new(Cell::new(0));
    let observer = TestObserver::new();
    failing_until(50_000, attempts.clone())
      .retry(RetryConfig::new())
      .subscribe_with(observer.clone());
    assert_eq!(attempts.get(), 50_000);
    assert_eq!(observer.values(), vec![50_000]);
  }

  #[test]
  fn delay_waits_on_scheduler() {
    let scheduler = VirtualTimeScheduler::new();
    let attempts = Rc::new(Cell::new(0));
    let observer = TestObserver::with_clock(scheduler.clone());
    failing_until(3, attempts.clone())
      .retry_on(RetryConfig::new().count(5).delay(Duration::from_millis(10)), scheduler.clone())
      .subscribe_with(observer.clone());
    assert_eq!(attempts.get(), 1);
    scheduler.flush();
    assert_eq!(attempts.get(), 3);
    assert_eq!(observer.records()[0], (Duration::from_millis(20), Notification::Next(3)));
  }

  #[test]
  #[should_panic(expected = "use `retry_on`")]
  fn delay_without_waiting_scheduler_is_rejected() {
    let _ = observable::throw_error::<i32, _>("bad")
      .retry(RetryConfig::new().count(2).delay(Duration::from_secs(1)));
  }

  #[test]
  fn zero_delay_runs_on_queue() {
    let attempts = Rc::new(Cell::new(0));
    let observer = TestObserver::new();
    failing_until(2, attempts.clone())
      .retry(RetryConfig::new().count(1).delay(Duration::ZERO))
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![2]);
  }

  #[test]
  fn reset_on_success() {
    // Fails every other subscription after emitting once.
    let attempts = Rc::new(Cell::new(0u32));
    let a = attempts.clone();
    let source = Observable::<u32, &str>::new(move |subscriber| {
      a.set(a.get() + 1);
      subscriber.next(a.get());
      if a.get() < 6 {
        subscriber.error("drop");
      } else {
        subscriber.complete();
      }
    });
    let observer = TestObserver::new();
    source
      .retry(RetryConfig::new().count(1).reset_on_success())
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1, 2, 3, 4, 5, 6]);
    assert!(observer.is_completed());
  }

  #[test]
  fn unsubscribe_cancels_pending_retry() {
    let scheduler = VirtualTimeScheduler::new();
    let attempts = Rc::new(Cell::new(0));
    let subscription = failing_until(3, attempts.clone())
      .retry_on(RetryConfig::new().delay(Duration::from_millis(10)), scheduler.clone())
      .subscribe_err(|_| {}, |_| {});
    subscription.unsubscribe().unwrap();
    scheduler.flush();
    assert_eq!(attempts.get(), 1);
  }
}
