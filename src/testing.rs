//! Helpers for testing streams.
//!
//! [`TestObserver`] records everything it receives, optionally stamped with
//! the time of a scheduler. The marble helpers build sources and expectations
//! from ASCII diagrams on a [`VirtualTimeScheduler`]:
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `-` | one frame (1 ms of virtual time) passes |
//! | `a`..`z`, `0`..`9`, ... | a value, looked up in the value table |
//! | `\|` | complete |
//! | `#` | error (`RxError::custom("error")` converted into `E`) |
//! | `(ab)` | events in the same frame; the whole group takes one frame |
//! | `^` | subscription point of a hot source (time zero) |
//!
//! Spaces are ignored.
//!
//! ```rust
//! use rxcore::prelude::*;
//! use rxcore::testing::{cold, expected, TestObserver};
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let values = [('a', 1), ('b', 2)];
//! let source = cold::<_, RxError>("-a-b|", &values, &scheduler);
//! let observer = TestObserver::with_clock(scheduler.clone());
//! source.map(|v| v * 10).subscribe_with(observer.clone());
//! scheduler.flush();
//!
//! assert_eq!(observer.records(), expected("-a-b|", &[('a', 10), ('b', 20)]));
//! ```

use std::{cell::RefCell, convert::Infallible, fmt::Debug, rc::Rc};

use crate::{
  error::RxError,
  notification::Notification,
  observable::Observable,
  observer::Observer,
  scheduler::{Duration, Scheduler, VirtualTimeScheduler},
  subscriber::Subscriber,
  subscription::Teardown,
};

/// Duration of one marble frame.
pub const FRAME: Duration = Duration::from_millis(1);

struct Recorded<T, E> {
  records: RefCell<Vec<(Duration, Notification<T, E>)>>,
  clock: Option<Rc<dyn Scheduler>>,
}

/// An observer that records every notification. Clones share the record.
pub struct TestObserver<T, E = Infallible>(Rc<Recorded<T, E>>);

impl<T, E> Clone for TestObserver<T, E> {
  fn clone(&self) -> Self { TestObserver(self.0.clone()) }
}

impl<T, E> Default for TestObserver<T, E> {
  fn default() -> Self { Self::new() }
}

impl<T, E> TestObserver<T, E> {
  pub fn new() -> Self { TestObserver(Rc::new(Recorded { records: RefCell::new(vec![]), clock: None })) }

  /// A recorder that stamps every notification with `scheduler.now()`.
  pub fn with_clock(scheduler: impl Scheduler) -> Self {
    TestObserver(Rc::new(Recorded {
      records: RefCell::new(vec![]),
      clock: Some(Rc::new(scheduler)),
    }))
  }

  pub fn complete_count(&self) -> usize {
    self
      .0
      .records
      .borrow()
      .iter()
      .filter(|(_, n)| matches!(n, Notification::Complete))
      .count()
  }

  pub fn is_completed(&self) -> bool { self.complete_count() > 0 }

  fn record(&self, notification: Notification<T, E>) {
    let at = self.0.clock.as_ref().map_or(Duration::ZERO, |c| c.now());
    self.0.records.borrow_mut().push((at, notification));
  }
}

impl<T: Clone, E: Clone> TestObserver<T, E> {
  pub fn values(&self) -> Vec<T> {
    self
      .0
      .records
      .borrow()
      .iter()
      .filter_map(|(_, n)| match n {
        Notification::Next(v) => Some(v.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn errors(&self) -> Vec<E> {
    self
      .0
      .records
      .borrow()
      .iter()
      .filter_map(|(_, n)| match n {
        Notification::Error(e) => Some(e.clone()),
        _ => None,
      })
      .collect()
  }

  pub fn notifications(&self) -> Vec<Notification<T, E>> {
    self.0.records.borrow().iter().map(|(_, n)| n.clone()).collect()
  }

  /// Notifications with the time they arrived at. Times are zero for a
  /// recorder built without a clock.
  pub fn records(&self) -> Vec<(Duration, Notification<T, E>)> { self.0.records.borrow().clone() }
}

impl<T, E> Observer<T, E> for TestObserver<T, E> {
  fn next(&mut self, value: T) { self.record(Notification::Next(value)) }

  fn error(&mut self, err: E) { self.record(Notification::Error(err)) }

  fn complete(&mut self) { self.record(Notification::Complete) }
}

impl<T: Debug, E: Debug> Debug for TestObserver<T, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("TestObserver").field(&*self.0.records.borrow()).finish()
  }
}

/// Parses a marble diagram into timed notifications relative to frame zero.
///
/// Events before a `^` get negative frames and are dropped.
///
/// # Panics
///
/// Panics on a value character missing from `values`, on unbalanced groups
/// and on a second `^`.
pub fn parse_marbles<T, E>(marbles: &str, values: &[(char, T)]) -> Vec<(Duration, Notification<T, E>)>
where
  T: Clone,
  E: From<RxError>,
{
  let origin = marbles
    .chars()
    .filter(|c| !c.is_whitespace())
    .position(|c| c == '^')
    .map_or(0, |p| p as i64);
  assert!(
    marbles.matches('^').count() <= 1,
    "marble diagram `{marbles}` has more than one subscription point"
  );

  let mut frame: i64 = -origin;
  let mut group: Option<i64> = None;
  let mut events = vec![];
  for c in marbles.chars().filter(|c| !c.is_whitespace()) {
    let at = group.unwrap_or(frame);
    let notification = match c {
      '-' | '^' => None,
      '(' => {
        assert!(group.is_none(), "nested group in marble diagram `{marbles}`");
        group = Some(frame);
        continue;
      }
      ')' => {
        assert!(group.take().is_some(), "unbalanced `)` in marble diagram `{marbles}`");
        frame += 1;
        continue;
      }
      '|' => Some(Notification::Complete),
      '#' => Some(Notification::Error(E::from(RxError::custom("error")))),
      value => {
        let v = values
          .iter()
          .find(|(k, _)| *k == value)
          .map(|(_, v)| v.clone())
          .unwrap_or_else(|| panic!("no value for `{value}` in marble diagram `{marbles}`"));
        Some(Notification::Next(v))
      }
    };
    if let Some(n) = notification {
      if at >= 0 {
        events.push((FRAME * at as u32, n));
      }
    }
    if group.is_none() {
      frame += 1;
    }
  }
  assert!(group.is_none(), "unclosed group in marble diagram `{marbles}`");
  events
}

/// The records a [`TestObserver::with_clock`] subscribed at time zero is
/// expected to hold.
pub fn expected<T, E>(marbles: &str, values: &[(char, T)]) -> Vec<(Duration, Notification<T, E>)>
where
  T: Clone,
  E: From<RxError>,
{
  parse_marbles(marbles, values)
}

/// A cold source: every subscription replays the diagram starting at the
/// time it subscribes.
pub fn cold<T, E>(marbles: &str, values: &[(char, T)], scheduler: &VirtualTimeScheduler) -> Observable<T, E>
where
  T: Clone + 'static,
  E: From<RxError> + Clone + 'static,
{
  let events = Rc::new(parse_marbles::<T, E>(marbles, values));
  let scheduler = scheduler.clone();
  Observable::new(move |subscriber: Subscriber<T, E>| {
    for (at, notification) in events.iter() {
      let s = subscriber.clone();
      let n = notification.clone();
      let task = scheduler.schedule_task(Box::new(move || n.observe(&s)), *at);
      subscriber.add(task);
    }
  })
}

/// A hot source: the diagram plays once on the scheduler's timeline, starting
/// now, whether or not anyone is subscribed. Subscribers only see what happens
/// after they subscribe.
pub fn hot<T, E>(marbles: &str, values: &[(char, T)], scheduler: &VirtualTimeScheduler) -> Observable<T, E>
where
  T: Clone + 'static,
  E: From<RxError> + Clone + 'static,
{
  let observers: Rc<RefCell<Vec<Subscriber<T, E>>>> = Rc::new(RefCell::new(vec![]));
  for (at, notification) in parse_marbles::<T, E>(marbles, values) {
    let observers = observers.clone();
    scheduler.schedule_task(
      Box::new(move || {
        let current: Vec<_> = observers.borrow().clone();
        for s in current {
          notification.clone().observe(&s);
        }
      }),
      at,
    );
  }

  Observable::new(move |subscriber: Subscriber<T, E>| {
    observers.borrow_mut().push(subscriber.clone());
    let observers = Rc::downgrade(&observers);
    let s = subscriber.clone();
    Teardown::action(move || {
      if let Some(observers) = observers.upgrade() {
        observers
          .borrow_mut()
          .retain(|o| !o.subscription().ptr_eq(s.subscription()));
      }
    })
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_frames_groups_and_terminals() {
    let parsed = parse_marbles::<i32, RxError>("-a(bc)-|", &[('a', 1), ('b', 2), ('c', 3)]);
    assert_eq!(
      parsed,
      vec![
        (FRAME, Notification::Next(1)),
        (FRAME * 2, Notification::Next(2)),
        (FRAME * 2, Notification::Next(3)),
        (FRAME * 4, Notification::Complete),
      ]
    );
  }

  #[test]
  fn subscription_point_shifts_origin() {
    let parsed = parse_marbles::<char, RxError>("a-^-b-#", &[('a', 'a'), ('b', 'b')]);
    assert_eq!(
      parsed,
      vec![
        (FRAME * 2, Notification::Next('b')),
        (FRAME * 4, Notification::Error(RxError::custom("error"))),
      ]
    );
  }

  #[test]
  #[should_panic(expected = "no value for `x`")]
  fn unknown_value_panics() { parse_marbles::<i32, RxError>("x", &[]); }

  #[test]
  fn cold_replays_per_subscription() {
    let scheduler = VirtualTimeScheduler::new();
    let source = cold::<_, RxError>("a|", &[('a', 1)], &scheduler);
    let first = TestObserver::with_clock(scheduler.clone());
    source.subscribe_with(first.clone());
    scheduler.advance_by(FRAME * 5);

    let second = TestObserver::with_clock(scheduler.clone());
    source.subscribe_with(second.clone());
    scheduler.flush();

    assert_eq!(first.records(), vec![(Duration::ZERO, Notification::Next(1)), (FRAME, Notification::Complete)]);
    assert_eq!(
      second.records(),
      vec![(FRAME * 5, Notification::Next(1)), (FRAME * 6, Notification::Complete)]
    );
  }

  #[test]
  fn hot_only_delivers_after_subscribing() {
    let scheduler = VirtualTimeScheduler::new();
    let source = hot::<_, RxError>("-a-b-|", &[('a', 1), ('b', 2)], &scheduler);
    scheduler.advance_by(FRAME * 2);

    let late = TestObserver::with_clock(scheduler.clone());
    source.subscribe_with(late.clone());
    scheduler.flush();

    assert_eq!(late.values(), vec![2]);
    assert!(late.is_completed());
  }

  #[test]
  fn observer_counts() {
    let mut observer = TestObserver::<i32, &str>::new();
    observer.next(1);
    observer.complete();
    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.complete_count(), 1);
    assert!(observer.errors().is_empty());
    assert_eq!(observer.notifications(), vec![Notification::Next(1), Notification::Complete]);
  }
}
