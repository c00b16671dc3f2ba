//! The outer/inner subscriber pair.
//!
//! Every operator that subscribes to additional streams while it stays
//! subscribed to its source (flattening, notifier-driven and duration-driven
//! operators) goes through this adapter. The operator state implements
//! [`OuterObserver`]; each additional stream is subscribed with
//! [`subscribe_to_result`], whose events come back tagged with the outer
//! value, the outer index and the inner index.
//!
//! Each inner subscription is a teardown entry of the outer subscription, and
//! holds only a weak reference back to it.

use std::rc::Rc;

use crate::{
  observable::ObservableInput,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, TeardownHandle, WeakSubscription},
};

/// Hooks an operator implements to receive the events of its inner streams.
///
/// The hooks receive the shared operator state itself, so a hook can start
/// further inner streams. Every hook defaults to doing nothing.
pub trait OuterObserver<O, R, E>: 'static {
  fn notify_next(
    _this: &Rc<Self>, _outer_value: O, _inner_value: R, _outer_index: usize, _inner_index: usize,
    _inner: &InnerSubscription,
  ) {
  }

  fn notify_error(_this: &Rc<Self>, _err: E, _inner: &InnerSubscription) {}

  fn notify_complete(_this: &Rc<Self>, _inner: &InnerSubscription) {}
}

/// Handle to one inner subscription owned by an outer subscriber.
#[derive(Clone)]
pub struct InnerSubscription {
  subscription: Subscription,
  parent: WeakSubscription,
  handle: TeardownHandle,
}

impl InnerSubscription {
  /// Reserves an inner subscription on `parent` without starting anything.
  ///
  /// Operators that must know the handle before the inner stream can emit
  /// (an inner stream may emit synchronously while being subscribed) store
  /// it first and then call [`InnerSubscription::run`].
  pub fn new(parent: &Subscription) -> Self {
    let subscription = Subscription::new();
    let handle = parent.add(&subscription);
    InnerSubscription { subscription, parent: parent.downgrade(), handle }
  }

  /// Subscribes `input` and routes its events to `outer`.
  pub fn run<O, R, E, Outer>(
    &self, outer: &Rc<Outer>, input: impl ObservableInput<R, E>, outer_value: O, outer_index: usize,
  ) where
    Outer: OuterObserver<O, R, E>,
    O: Clone + 'static,
    R: 'static,
    E: 'static,
  {
    if self.is_closed() {
      return;
    }
    tracing::trace!(outer_index, "subscribing inner stream");
    let observer = InnerObserver {
      outer: outer.clone(),
      outer_value,
      outer_index,
      inner_index: 0,
      inner: self.clone(),
    };
    let subscriber = Subscriber::with_subscription(observer, self.subscription.clone());
    input.into_observable().subscribe_subscriber(subscriber);
  }

  /// Removes this inner subscription from the outer bookkeeping without
  /// unsubscribing it.
  pub fn detach(&self) {
    if let Some(parent) = self.parent.upgrade() {
      parent.remove(self.handle);
    }
  }

  /// Detaches and unsubscribes in one step.
  pub fn unsubscribe(&self) {
    tracing::trace!("unsubscribing inner stream");
    self.detach();
    self.subscription.release();
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.subscription.is_closed() }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  #[inline]
  pub fn ptr_eq(&self, other: &InnerSubscription) -> bool { self.subscription.ptr_eq(&other.subscription) }
}

/// Subscribes to a derived stream on behalf of an outer subscriber.
///
/// `input` may be an [`Observable`](crate::observable::Observable), any
/// clonable iterable (drained synchronously, then completed) or a future
/// lifted with `from_future`. The returned handle is already registered on
/// `parent`.
pub fn subscribe_to_result<O, R, E, Outer>(
  outer: &Rc<Outer>, parent: &Subscription, input: impl ObservableInput<R, E>, outer_value: O,
  outer_index: usize,
) -> InnerSubscription
where
  Outer: OuterObserver<O, R, E>,
  O: Clone + 'static,
  R: 'static,
  E: 'static,
{
  let inner = InnerSubscription::new(parent);
  inner.run(outer, input, outer_value, outer_index);
  inner
}

struct InnerObserver<Outer, O> {
  outer: Rc<Outer>,
  outer_value: O,
  outer_index: usize,
  inner_index: usize,
  inner: InnerSubscription,
}

impl<Outer, O, R, E> Observer<R, E> for InnerObserver<Outer, O>
where
  Outer: OuterObserver<O, R, E>,
  O: Clone,
{
  fn next(&mut self, value: R) {
    let inner_index = self.inner_index;
    self.inner_index += 1;
    Outer::notify_next(
      &self.outer,
      self.outer_value.clone(),
      value,
      self.outer_index,
      inner_index,
      &self.inner,
    );
  }

  fn error(&mut self, err: E) { Outer::notify_error(&self.outer, err, &self.inner) }

  fn complete(&mut self) { Outer::notify_complete(&self.outer, &self.inner) }
}
