//! # rxcore: the engine of a Reactive Extensions library
//!
//! Lazy, cancellable streams of values with composable operators, running on
//! one thread.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let observer = TestObserver::<i32>::new();
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe_with(observer.clone());
//!
//! assert_eq!(observer.values(), vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy recipe; every subscription runs it afresh |
//! | [`Subscriber`] | The sink every stream delivers to; enforces the `next* (error \| complete)?` grammar |
//! | [`Subscription`] | Tree of teardown actions; unsubscribing releases everything below it |
//! | [`Scheduler`] | Decides when work runs: inline, trampolined, on tokio or on virtual time |
//!
//! Flattening operators (`merge_map`, `switch_map`, `concat_map`,
//! `exhaust_map` and friends) are built on [`OuterObserver`] and
//! [`subscribe_to_result`].
//!
//! ## Feature Flags
//!
//! - **`scheduler`** (default): the tokio-backed `AsyncScheduler` and
//!   `observable::from_future`.
//!
//! [`Observable`]: observable::Observable
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`OuterObserver`]: subscriber::OuterObserver
//! [`subscribe_to_result`]: subscriber::subscribe_to_result

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;
pub mod testing;

pub use prelude::*;
