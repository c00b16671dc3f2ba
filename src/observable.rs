//! The lazy stream.
//!
//! An [`Observable`] is a reusable recipe: a producer function that is run
//! once per subscription against a fresh [`Subscriber`]. Nothing is shared
//! between two subscriptions unless the producer shares it itself.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let numbers = Observable::<i32>::new(|subscriber| {
//!   subscriber.next(1);
//!   subscriber.next(2);
//!   subscriber.complete();
//! });
//!
//! let observer = TestObserver::new();
//! numbers.map(|v| v * 10).subscribe_with(observer.clone());
//! assert_eq!(observer.values(), vec![10, 20]);
//! assert!(observer.is_completed());
//! ```
//!
//! Factories live in this module ([`of`], [`from_iter`], [`timer`], ...);
//! operators are methods on [`Observable`] defined under [`ops`](crate::ops).

use std::{convert::Infallible, fmt::Debug, rc::Rc};

use crate::{
  observer::{ignore_complete, unhandled_error, FnObserver, Observer},
  subscriber::Subscriber,
  subscription::{Subscription, Teardown},
};

mod combination;
mod create;
mod defer;
#[cfg(feature = "scheduler")]
mod from_future;
mod from_iter;
mod interval;
mod of;
mod race;
mod timer;
mod trivial;

pub use combination::*;
pub use create::*;
pub use defer::*;
#[cfg(feature = "scheduler")]
pub use from_future::*;
pub use from_iter::*;
pub use interval::*;
pub use of::*;
pub use race::*;
pub use timer::*;
pub use trivial::*;

type Producer<T, E> = dyn Fn(Subscriber<T, E>) -> Teardown;

/// A representation of any set of values over any amount of time.
///
/// Cloning is cheap and yields the same recipe.
pub struct Observable<T, E = Infallible> {
  producer: Rc<Producer<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
  #[inline]
  fn clone(&self) -> Self { Observable { producer: self.producer.clone() } }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Builds an observable from a producer.
  ///
  /// The producer runs synchronously on every subscription. It may emit right
  /// away, hand the subscriber to something that emits later, or both. What it
  /// returns (nothing, a [`Subscription`] or a [`Teardown`]) is released when
  /// the subscription ends.
  pub fn new<F, R>(producer: F) -> Self
  where
    F: Fn(Subscriber<T, E>) -> R + 'static,
    R: Into<Teardown>,
  {
    Observable { producer: Rc::new(move |subscriber| producer(subscriber).into()) }
  }

  /// Runs the producer against `subscriber` and returns its subscription.
  pub fn subscribe_subscriber(&self, subscriber: Subscriber<T, E>) -> Subscription {
    let teardown = (self.producer)(subscriber.clone());
    subscriber.add(teardown);
    subscriber.subscription().clone()
  }

  pub fn subscribe_with(&self, observer: impl Observer<T, E> + 'static) -> Subscription {
    self.subscribe_subscriber(Subscriber::new(observer))
  }

  /// Subscribes with a `next` callback only. An error reaching this
  /// subscription is raised as a panic.
  pub fn subscribe(&self, next: impl FnMut(T) + 'static) -> Subscription
  where
    E: Debug,
  {
    self.subscribe_with(FnObserver::new(next, unhandled_error::<E>, ignore_complete))
  }

  pub fn subscribe_err(
    &self, next: impl FnMut(T) + 'static, error: impl FnMut(E) + 'static,
  ) -> Subscription {
    self.subscribe_with(FnObserver::new(next, error, ignore_complete))
  }

  pub fn subscribe_all(
    &self, next: impl FnMut(T) + 'static, error: impl FnMut(E) + 'static,
    complete: impl FnMut() + 'static,
  ) -> Subscription {
    self.subscribe_with(FnObserver::new(next, error, complete))
  }

  /// Subscribes with a subscription that is registered on `parent` before the
  /// producer runs.
  ///
  /// Operators subscribe to their source this way, so a downstream that
  /// terminates in the middle of a synchronous emission loop cancels the
  /// source right there.
  pub fn subscribe_within(
    &self, parent: &Subscription, observer: impl Observer<T, E> + 'static,
  ) -> Subscription {
    let subscription = Subscription::new();
    parent.add(&subscription);
    self.subscribe_subscriber(Subscriber::with_subscription(observer, subscription))
  }

  /// Composes this observable with `operator`.
  ///
  /// Every subscription to the returned observable calls the operator with the
  /// downstream subscriber and this observable as the source.
  pub fn lift<R, F>(self, operator: impl Operator<T, E, R, F> + 'static) -> Observable<R, F>
  where
    R: 'static,
    F: 'static,
  {
    Observable::new(move |downstream| operator.call(downstream, &self))
  }
}

/// A transformation from a downstream subscriber to an upstream subscription.
///
/// Closures of shape `Fn(Subscriber<R, F>, &Observable<T, E>) -> impl
/// Into<Teardown>` are operators.
pub trait Operator<T, E, R, F> {
  fn call(&self, downstream: Subscriber<R, F>, source: &Observable<T, E>) -> Teardown;
}

impl<T, E, R, F, Func, Td> Operator<T, E, R, F> for Func
where
  Func: Fn(Subscriber<R, F>, &Observable<T, E>) -> Td,
  Td: Into<Teardown>,
{
  #[inline]
  fn call(&self, downstream: Subscriber<R, F>, source: &Observable<T, E>) -> Teardown {
    self(downstream, source).into()
  }
}

/// Anything an operator can subscribe to as an inner stream.
///
/// Implemented for [`Observable`] and for every clonable iterable, which is
/// drained synchronously and then completed. Futures become inputs through
/// [`from_future`](crate::observable::from_future).
pub trait ObservableInput<T, E> {
  fn into_observable(self) -> Observable<T, E>;
}

impl<T, E> ObservableInput<T, E> for Observable<T, E> {
  #[inline]
  fn into_observable(self) -> Observable<T, E> { self }
}

impl<T, E, I> ObservableInput<T, E> for I
where
  I: IntoIterator<Item = T> + Clone + 'static,
  T: 'static,
  E: 'static,
{
  #[inline]
  fn into_observable(self) -> Observable<T, E> { from_iter(self) }
}
