//! Notifier-driven resubscription, shared by `retry_when` and `repeat_when`.
//!
//! The operator feeds the source's terminal events into a relay stream and
//! hands that stream to the user's notifier factory. The notifier is built
//! and subscribed on the first terminal event it is meant to see; until then
//! the source runs on its own. Each value of the notifier resubscribes the
//! source; the notifier's own error or completion ends the whole stream.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use crate::{
  observable::{Observable, ObservableInput},
  scheduler::{Duration, QueueScheduler, Scheduler},
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
  subscription::Teardown,
};

impl<T: 'static, E: Clone + 'static> Observable<T, E> {
  /// Resubscribes to the source whenever the stream built by `notifier`
  /// emits.
  ///
  /// `notifier` receives the stream of the source's errors. It is called on
  /// the first error of the source, so a source that never fails passes
  /// through untouched. When the notifier errors, that error is forwarded;
  /// when it completes, the result completes right away.
  pub fn retry_when<N, I>(self, notifier: impl Fn(Observable<E, E>) -> I + 'static) -> Observable<T, E>
  where
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let notifier = Rc::new(notifier);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      Resubscribe::<T, E, E>::start(downstream, source.clone(), notifier.clone(), relay_error, forward_complete, false);
    })
  }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Resubscribes to the source after it completes, whenever the stream
  /// built by `notifier` emits.
  ///
  /// `notifier` receives a stream with one `()` per completion of the
  /// source; it is called on the first completion. Errors of the source are forwarded as they are. Once the
  /// notifier completes, the result completes with the source's next
  /// completion.
  pub fn repeat_when<N, I>(self, notifier: impl Fn(Observable<(), E>) -> I + 'static) -> Observable<T, E>
  where
    N: 'static,
    I: ObservableInput<N, E>,
  {
    let notifier = Rc::new(notifier);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      Resubscribe::<T, E, ()>::start(downstream, source.clone(), notifier.clone(), forward_error, relay_complete, true);
    })
  }
}

/// A minimal multicast point: every value pushed in reaches every current
/// subscriber of [`Relay::observable`].
pub(crate) struct Relay<V, E> {
  observers: Rc<RefCell<Vec<Subscriber<V, E>>>>,
}

impl<V: Clone + 'static, E: 'static> Relay<V, E> {
  pub(crate) fn new() -> Self { Relay { observers: Rc::new(RefCell::new(vec![])) } }

  pub(crate) fn observable(&self) -> Observable<V, E> {
    let observers = self.observers.clone();
    Observable::new(move |subscriber: Subscriber<V, E>| {
      observers.borrow_mut().push(subscriber.clone());
      let weak = Rc::downgrade(&observers);
      Teardown::action(move || {
        if let Some(observers) = weak.upgrade() {
          observers
            .borrow_mut()
            .retain(|o| !o.subscription().ptr_eq(subscriber.subscription()));
        }
      })
    })
  }

  pub(crate) fn next(&self, value: V) {
    let current: Vec<_> = self.observers.borrow().clone();
    for observer in current {
      observer.next(value.clone());
    }
  }
}

#[derive(Clone)]
struct SourceTag;

#[derive(Clone)]
struct NotifierTag;

type StartNotifier<S> = Box<dyn FnOnce(&Rc<S>)>;

struct Resubscribe<T, E, V> {
  downstream: Subscriber<T, E>,
  source: Observable<T, E>,
  relay: Relay<V, E>,
  // Taken on the first terminal event of the source.
  notifier: RefCell<Option<StartNotifier<Self>>>,
  current: RefCell<Option<InnerSubscription>>,
  // A source subscription is running or has been requested.
  active: Cell<bool>,
  notifier_done: Cell<bool>,
  wait_for_source: bool,
  on_error: fn(&Self, E),
  on_complete: fn(&Self),
}

fn relay_error<T: 'static, E: Clone + 'static>(this: &Resubscribe<T, E, E>, err: E) { this.relay.next(err) }

fn forward_complete<T: 'static, E: 'static, V>(this: &Resubscribe<T, E, V>) { this.downstream.complete() }

fn forward_error<T: 'static, E: 'static, V>(this: &Resubscribe<T, E, V>, err: E) { this.downstream.error(err) }

fn relay_complete<T: 'static, E: 'static>(this: &Resubscribe<T, E, ()>) {
  if this.notifier_done.get() {
    this.downstream.complete();
  } else {
    this.relay.next(());
  }
}

impl<T: 'static, E: 'static, V: Clone + 'static> Resubscribe<T, E, V> {
  fn start<N, I, F>(
    downstream: Subscriber<T, E>, source: Observable<T, E>, notifier: Rc<F>,
    on_error: fn(&Self, E), on_complete: fn(&Self), wait_for_source: bool,
  ) where
    N: 'static,
    I: ObservableInput<N, E>,
    F: Fn(Observable<V, E>) -> I + 'static,
  {
    let start_notifier: StartNotifier<Self> = Box::new(move |this: &Rc<Self>| {
      tracing::debug!("subscribing notifier");
      let notifications = notifier(this.relay.observable());
      subscribe_to_result(this, this.downstream.subscription(), notifications, NotifierTag, 0);
    });
    let this = Rc::new(Resubscribe {
      downstream,
      source,
      relay: Relay::new(),
      notifier: RefCell::new(Some(start_notifier)),
      current: RefCell::new(None),
      active: Cell::new(true),
      notifier_done: Cell::new(false),
      wait_for_source,
      on_error,
      on_complete,
    });
    Self::resubscribe(&this);
  }

  // Returns false once the stream has ended, possibly by the notifier itself.
  fn ensure_notifier(this: &Rc<Self>) -> bool {
    let start = this.notifier.borrow_mut().take();
    if let Some(start) = start {
      start(this);
    }
    !this.downstream.is_closed()
  }

  fn resubscribe(this: &Rc<Self>) {
    let previous = this.current.borrow_mut().take();
    if let Some(previous) = previous {
      previous.unsubscribe();
    }
    if this.downstream.is_closed() {
      return;
    }
    let inner = InnerSubscription::new(this.downstream.subscription());
    *this.current.borrow_mut() = Some(inner.clone());
    inner.run(this, this.source.clone(), SourceTag, 0);
  }
}

impl<T: 'static, E: 'static, V: Clone + 'static> OuterObserver<SourceTag, T, E> for Resubscribe<T, E, V> {
  fn notify_next(this: &Rc<Self>, _: SourceTag, value: T, _: usize, _: usize, _: &InnerSubscription) {
    this.downstream.next(value)
  }

  fn notify_error(this: &Rc<Self>, err: E, inner: &InnerSubscription) {
    inner.detach();
    this.active.set(false);
    if Self::ensure_notifier(this) {
      (this.on_error)(this, err);
    }
  }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.active.set(false);
    if Self::ensure_notifier(this) {
      (this.on_complete)(this);
    }
  }
}

// Notifier events go through the queue so that a resubscription requested
// in the same turn as the notifier's termination still happens first.
impl<T: 'static, E: 'static, V: Clone + 'static> Resubscribe<T, E, V> {
  fn defer(this: &Rc<Self>, f: impl FnOnce(&Rc<Self>) + 'static) {
    let this2 = this.clone();
    let task = QueueScheduler.schedule_task(Box::new(move || f(&this2)), Duration::ZERO);
    this.downstream.add(task);
  }
}

impl<T: 'static, E: 'static, V: Clone + 'static, N> OuterObserver<NotifierTag, N, E> for Resubscribe<T, E, V> {
  fn notify_next(this: &Rc<Self>, _: NotifierTag, _: N, _: usize, _: usize, _: &InnerSubscription) {
    tracing::debug!("notifier requested resubscription");
    this.active.set(true);
    Self::defer(this, Self::resubscribe);
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) {
    Self::defer(this, move |this| this.downstream.error(err));
  }

  fn notify_complete(this: &Rc<Self>, _: &InnerSubscription) {
    this.notifier_done.set(true);
    if !this.wait_for_source || !this.active.get() {
      Self::defer(this, |this| this.downstream.complete());
    }
  }
}
