//! Prelude module for convenient imports.
//!
//! Operators are inherent methods of [`Observable`], so importing the type is
//! enough to use them. Factories stay behind the `observable` module path
//! (`observable::of`, `observable::timer`, ...).

// Core types
pub use crate::observable::{self, Observable, ObservableInput, Operator};
pub use crate::observer::{FnObserver, Observer};
pub use crate::subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber};
// Subscription
pub use crate::subscription::{Subscription, SubscriptionGuard, Teardown, TeardownHandle};
// Errors and notifications
pub use crate::error::{RxError, UnsubscriptionError};
pub use crate::notification::Notification;
// Schedulers
#[cfg(feature = "scheduler")]
pub use crate::scheduler::AsyncScheduler;
pub use crate::scheduler::{
  Duration, ImmediateScheduler, Instant, QueueScheduler, Scheduler, SchedulerAction, SchedulerExt,
  VirtualTimeScheduler,
};
// Operator configuration
pub use crate::ops::{RetryConfig, RetryPolicy, ThrottleConfig};
// Testing
pub use crate::testing::TestObserver;
