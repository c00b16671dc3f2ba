//! The delivery protocol.
//!
//! A [`Subscriber`] is the one concrete sink every stream delivers to. It
//! owns a [`Subscription`] and forwards to a boxed destination
//! [`Observer`]; operators change behaviour by supplying a different
//! destination, never by subclassing.
//!
//! State machine: Active → Stopped, entered on `error`, `complete` or
//! `unsubscribe`. Two guards are checked on every delivery, the stopped flag
//! and the closed flag of the subscription, because a synchronous producer
//! may still be looping when a downstream operator cancels it.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  fmt::Debug,
  rc::Rc,
};

use crate::{
  notification::Notification,
  observer::{ignore_complete, unhandled_error, FnObserver, Observer},
  subscription::{Subscription, Teardown, TeardownHandle},
};

mod outer;
pub use outer::*;

struct SubscriberCore<T, E> {
  stopped: Cell<bool>,
  destination: RefCell<Option<Box<dyn Observer<T, E>>>>,
  pending: RefCell<VecDeque<Notification<T, E>>>,
  subscription: Subscription,
}

/// A cancellable three-channel sink. Clones share the same state.
pub struct Subscriber<T, E>(Rc<SubscriberCore<T, E>>);

impl<T, E> Clone for Subscriber<T, E> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: 'static, E: 'static> Subscriber<T, E> {
  pub fn new(observer: impl Observer<T, E> + 'static) -> Self {
    Self::with_subscription(observer, Subscription::new())
  }

  /// Builds a subscriber on top of an existing subscription node.
  pub fn with_subscription(observer: impl Observer<T, E> + 'static, subscription: Subscription) -> Self {
    let core = Rc::new(SubscriberCore {
      stopped: Cell::new(false),
      destination: RefCell::new(Some(Box::new(observer) as Box<dyn Observer<T, E>>)),
      pending: RefCell::new(VecDeque::new()),
      subscription,
    });

    let weak = Rc::downgrade(&core);
    core.subscription.add(Teardown::action(move || {
      if let Some(core) = weak.upgrade() {
        core.stopped.set(true);
        // Still borrowed when the cancellation comes from inside a delivery;
        // the destination is then released with the subscriber itself.
        if let Ok(mut dest) = core.destination.try_borrow_mut() {
          dest.take();
        }
      }
    }));

    Subscriber(core)
  }

  /// Builds a subscriber from callbacks. A missing error handler re-raises.
  pub fn from_fn(next: impl FnMut(T) + 'static) -> Self
  where
    E: Debug,
  {
    Self::new(FnObserver::new(next, unhandled_error::<E>, ignore_complete))
  }

  pub fn next(&self, value: T) {
    if !self.is_closed() {
      self.dispatch(Notification::Next(value));
    }
  }

  pub fn error(&self, err: E) {
    if !self.is_closed() {
      self.0.stopped.set(true);
      self.dispatch(Notification::Error(err));
    }
  }

  pub fn complete(&self) {
    if !self.is_closed() {
      self.0.stopped.set(true);
      self.dispatch(Notification::Complete);
    }
  }

  /// Whether this subscriber still accepts notifications.
  #[inline]
  pub fn is_closed(&self) -> bool { self.0.stopped.get() || self.0.subscription.is_closed() }

  /// Whether a terminal notification was delivered or is being delivered.
  #[inline]
  pub fn is_stopped(&self) -> bool { self.0.stopped.get() }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.0.subscription }

  /// Registers a teardown on this subscriber's subscription.
  #[inline]
  pub fn add(&self, teardown: impl Into<Teardown>) -> TeardownHandle { self.0.subscription.add(teardown) }

  #[inline]
  pub fn remove(&self, handle: TeardownHandle) -> bool { self.0.subscription.remove(handle) }

  /// Cancels this subscriber and everything registered on it.
  pub fn unsubscribe(&self) -> Result<(), crate::error::UnsubscriptionError> {
    self.0.subscription.unsubscribe()
  }

  // Notifications that arrive while the destination is busy with an earlier
  // one are queued and delivered in order once it returns.
  fn dispatch(&self, notification: Notification<T, E>) {
    if self.0.destination.try_borrow_mut().is_err() {
      self.0.pending.borrow_mut().push_back(notification);
      return;
    }
    self.deliver(notification);
    loop {
      let Some(queued) = self.0.pending.borrow_mut().pop_front() else {
        break;
      };
      self.deliver(queued);
    }
    if self.0.subscription.is_closed() {
      if let Ok(mut dest) = self.0.destination.try_borrow_mut() {
        dest.take();
      }
    }
  }

  fn deliver(&self, notification: Notification<T, E>) {
    if self.0.subscription.is_closed() {
      return;
    }
    match notification {
      Notification::Next(value) => {
        if let Some(dest) = self.0.destination.borrow_mut().as_mut() {
          dest.next(value);
        }
      }
      Notification::Error(err) => {
        let dest = self.0.destination.borrow_mut().take();
        if let Some(mut dest) = dest {
          dest.error(err);
        }
        self.0.subscription.release();
      }
      Notification::Complete => {
        let dest = self.0.destination.borrow_mut().take();
        if let Some(mut dest) = dest {
          dest.complete();
        }
        self.0.subscription.release();
      }
    }
  }
}

impl<T: 'static, E: 'static> Observer<T, E> for Subscriber<T, E> {
  #[inline]
  fn next(&mut self, value: T) { Subscriber::next(self, value) }

  #[inline]
  fn error(&mut self, err: E) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subscriber::complete(self) }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;
  use crate::{observer::FnObserver, testing::TestObserver};

  #[test]
  fn only_the_first_terminal_call_has_effect() {
    let observer = TestObserver::<i32, &str>::new();
    let subscriber = Subscriber::new(observer.clone());

    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.error("late");
    subscriber.complete();

    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.complete_count(), 1);
    assert!(observer.errors().is_empty());
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn error_unsubscribes() {
    let observer = TestObserver::<i32, &str>::new();
    let subscriber = Subscriber::new(observer.clone());
    let ran = Rc::new(Cell::new(false));
    let r = ran.clone();
    subscriber.add(Teardown::action(move || r.set(true)));

    subscriber.error("boom");
    subscriber.next(1);

    assert!(ran.get());
    assert_eq!(observer.errors(), vec!["boom"]);
    assert!(observer.values().is_empty());
  }

  #[test]
  fn unsubscribe_stops_delivery() {
    let observer = TestObserver::<i32, ()>::new();
    let subscriber = Subscriber::new(observer.clone());
    subscriber.next(1);
    subscriber.unsubscribe().unwrap();
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.complete_count(), 0);
    assert!(subscriber.is_stopped());
  }

  #[test]
  fn reentrant_terminal_is_delivered_after_current_next() {
    let log = Rc::new(RefCell::new(vec![]));
    let slot: Rc<RefCell<Option<Subscriber<i32, ()>>>> = Rc::new(RefCell::new(None));

    let subscriber = {
      let log = log.clone();
      let log_c = log.clone();
      let slot = slot.clone();
      Subscriber::new(FnObserver::new(
        move |v: i32| {
          log.borrow_mut().push(format!("next {v}"));
          if let Some(s) = slot.borrow().as_ref() {
            s.complete();
          }
          log.borrow_mut().push(format!("after {v}"));
        },
        |_: ()| {},
        move || log_c.borrow_mut().push("complete".to_owned()),
      ))
    };
    *slot.borrow_mut() = Some(subscriber.clone());

    subscriber.next(1);
    subscriber.next(2);

    assert_eq!(*log.borrow(), vec!["next 1", "after 1", "complete"]);
    slot.borrow_mut().take();
  }

  #[test]
  #[should_panic(expected = "unhandled error in observable")]
  fn missing_error_handler_reraises() {
    let subscriber = Subscriber::<i32, &str>::from_fn(|_| {});
    subscriber.error("nobody listens");
  }
}
