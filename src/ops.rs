//! Operators.
//!
//! Every operator is an inherent method on
//! [`Observable`](crate::observable::Observable) built with
//! [`lift`](crate::observable::Observable::lift): it receives the downstream [`Subscriber`] and the
//! source, and subscribes to the source with an observer of its own. State
//! lives in that observer, so each subscription gets a fresh copy.
//!
//! Operators that subscribe to more streams than their source (flattening,
//! notifier-driven and duration-driven ones) keep their state in an `Rc` and
//! implement [`OuterObserver`] for the inner events.

use std::rc::Rc;

use crate::subscriber::{InnerSubscription, OuterObserver, Subscriber};

pub mod audit;
pub mod catch_error;
pub mod combine_latest;
pub mod concat_map;
pub mod debounce;
pub mod default_if_empty;
pub mod delay;
pub mod distinct_until_changed;
pub mod element_at;
pub mod exhaust_map;
pub mod expand;
pub mod filter;
pub mod finalize;
pub mod first;
pub mod ignore_elements;
pub mod last;
pub mod map;
pub mod materialize;
pub mod merge_map;
pub mod merge_scan;
pub mod observe_on;
pub mod on_error;
pub mod pairwise;
pub mod reduce;
pub mod repeat;
pub mod retry;
pub mod retry_when;
pub mod sample;
pub mod scan;
pub mod skip;
pub mod skip_until;
pub mod skip_while;
pub mod start_with;
pub mod subscribe_on;
pub mod switch_map;
pub mod take;
pub mod take_until;
pub mod take_while;
pub mod tap;
pub mod throttle;
pub mod timeout;
pub mod with_latest_from;
pub mod zip;

pub use retry::{RetryConfig, RetryPolicy};
pub use throttle::ThrottleConfig;

/// Passes every event of an inner stream straight to a subscriber. Used by
/// the operators that hand the downstream over to a replacement stream.
pub(crate) struct Forward<T, E>(pub(crate) Subscriber<T, E>);

impl<O, T: 'static, E: 'static> OuterObserver<O, T, E> for Forward<T, E> {
  fn notify_next(this: &Rc<Self>, _: O, value: T, _: usize, _: usize, _: &InnerSubscription) { this.0.next(value) }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.0.error(err) }

  fn notify_complete(this: &Rc<Self>, _: &InnerSubscription) { this.0.complete() }
}
