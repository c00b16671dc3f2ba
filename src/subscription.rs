//! The cancellation tree.
//!
//! A [`Subscription`] is a node that owns an ordered list of teardown entries:
//! child subscriptions or cleanup actions. Unsubscribing a node runs every
//! entry exactly once, in registration order, and cascades into children.
//! Everything that acquires a resource while a stream is running (timers,
//! inner subscriptions, notifier subscriptions) registers it here.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  mem,
  rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::error::{BoxError, UnsubscriptionError};

type Action = Box<dyn FnOnce() -> Result<(), BoxError>>;

/// Something to run when a subscription is torn down.
#[derive(Default)]
pub enum Teardown {
  /// Nothing to clean up.
  #[default]
  Empty,
  /// A child subscription, unsubscribed together with its parent.
  Subscription(Subscription),
  /// A cleanup action.
  Action(Action),
}

impl Teardown {
  /// A cleanup action that cannot fail.
  pub fn action(f: impl FnOnce() + 'static) -> Self {
    Teardown::Action(Box::new(move || {
      f();
      Ok(())
    }))
  }

  /// A cleanup action whose failure is reported through
  /// [`UnsubscriptionError`].
  pub fn fallible(f: impl FnOnce() -> Result<(), BoxError> + 'static) -> Self {
    Teardown::Action(Box::new(f))
  }
}

impl From<()> for Teardown {
  #[inline]
  fn from(_: ()) -> Self { Teardown::Empty }
}

impl From<Subscription> for Teardown {
  #[inline]
  fn from(s: Subscription) -> Self { Teardown::Subscription(s) }
}

impl From<&Subscription> for Teardown {
  #[inline]
  fn from(s: &Subscription) -> Self { Teardown::Subscription(s.clone()) }
}

impl From<Option<Subscription>> for Teardown {
  #[inline]
  fn from(s: Option<Subscription>) -> Self { s.map_or(Teardown::Empty, Teardown::Subscription) }
}

/// Identifies one teardown entry inside the subscription it was added to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TeardownHandle(u64);

enum Entry {
  Child(Subscription),
  Action(Action),
}

#[derive(Default)]
struct Inner {
  closed: bool,
  next_id: u64,
  teardown: SmallVec<[(TeardownHandle, Entry); 2]>,
}

/// Handle to a node of the cancellation tree. Cloning shares the node.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner>>);

/// Non-owning reference to a subscription node, used for back references
/// from a child to its parent.
#[derive(Clone)]
pub struct WeakSubscription(Weak<RefCell<Inner>>);

impl WeakSubscription {
  pub fn upgrade(&self) -> Option<Subscription> { self.0.upgrade().map(Subscription) }
}

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// A subscription that is already unsubscribed.
  pub fn closed() -> Self {
    let s = Self::default();
    s.0.borrow_mut().closed = true;
    s
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.borrow().closed }

  /// Registers a teardown. If this subscription is already closed the
  /// teardown runs right away instead of being stored.
  pub fn add(&self, teardown: impl Into<Teardown>) -> TeardownHandle {
    let teardown = teardown.into();
    let mut inner = self.0.borrow_mut();
    let handle = TeardownHandle(inner.next_id);
    inner.next_id += 1;

    let entry = match teardown {
      Teardown::Empty => return handle,
      Teardown::Subscription(child) => {
        if self.ptr_eq(&child) || child.is_closed() {
          return handle;
        }
        Entry::Child(child)
      }
      Teardown::Action(action) => Entry::Action(action),
    };

    if inner.closed {
      drop(inner);
      if let Err(err) = run_entry(entry) {
        report(&err);
      }
    } else {
      inner
        .teardown
        .retain(|(_, e)| !matches!(e, Entry::Child(c) if c.is_closed()));
      inner.teardown.push((handle, entry));
    }
    handle
  }

  /// Detaches a teardown without running it. Returns whether it was found.
  pub fn remove(&self, handle: TeardownHandle) -> bool {
    let mut inner = self.0.borrow_mut();
    let before = inner.teardown.len();
    inner.teardown.retain(|(h, _)| *h != handle);
    before != inner.teardown.len()
  }

  /// Detaches a child subscription without unsubscribing it.
  pub fn remove_subscription(&self, child: &Subscription) -> bool {
    let mut inner = self.0.borrow_mut();
    let before = inner.teardown.len();
    inner
      .teardown
      .retain(|(_, e)| !matches!(e, Entry::Child(c) if c.ptr_eq(child)));
    before != inner.teardown.len()
  }

  /// Closes this subscription and runs every teardown exactly once, in
  /// registration order.
  ///
  /// A failing teardown does not stop the remaining ones; all failures,
  /// including those of nested subscriptions, are returned together. Calling
  /// this on a closed subscription does nothing.
  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> {
    let teardown = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return Ok(());
      }
      inner.closed = true;
      mem::take(&mut inner.teardown)
    };

    let mut errors = vec![];
    for (_, entry) in teardown {
      match entry {
        Entry::Child(child) => {
          if let Err(err) = child.unsubscribe() {
            errors.extend(err.errors);
          }
        }
        Entry::Action(action) => {
          if let Err(err) = action() {
            errors.push(err);
          }
        }
      }
    }

    if errors.is_empty() { Ok(()) } else { Err(UnsubscriptionError::new(errors)) }
  }

  /// Unsubscribes on behalf of the library, where no caller is waiting for
  /// the result. Teardown failures are reported through `tracing`.
  pub(crate) fn release(&self) {
    if let Err(err) = self.unsubscribe() {
      report(&err);
    }
  }

  /// Number of teardown entries currently held.
  pub fn teardown_size(&self) -> usize { self.0.borrow().teardown.len() }

  #[inline]
  pub fn ptr_eq(&self, other: &Subscription) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  pub fn downgrade(&self) -> WeakSubscription { WeakSubscription(Rc::downgrade(&self.0)) }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard::new(self) }
}

fn run_entry(entry: Entry) -> Result<(), UnsubscriptionError> {
  match entry {
    Entry::Child(child) => child.unsubscribe(),
    Entry::Action(action) => action().map_err(|err| UnsubscriptionError::new(vec![err])),
  }
}

fn report(err: &UnsubscriptionError) {
  tracing::error!(failures = err.len(), error = %err, "teardown failed");
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(Some(subscription)) }

  /// Gives the subscription back without unsubscribing it.
  pub fn into_inner(mut self) -> Subscription { self.0.take().unwrap_or_else(Subscription::closed) }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.release()
    }
  }
}
