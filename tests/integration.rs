//! End-to-end behaviour of subscriptions, operator chains and schedulers.

use std::{cell::Cell, cell::RefCell, rc::Rc};

use rxcore::{
  prelude::*,
  testing::{cold, expected, hot},
};
use tracing::Level;

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_test_writer()
    .with_max_level(Level::TRACE)
    .try_init();
}

#[test]
fn subscriptions_are_independent() {
  init_tracing();
  let source = observable::from_iter(1..=3).map(|v| v * 2);
  let first = TestObserver::<i32>::new();
  let second = TestObserver::<i32>::new();

  let a = source.subscribe_with(first.clone());
  let b = source.subscribe_with(second.clone());

  assert!(!a.ptr_eq(&b));
  assert_eq!(first.values(), vec![2, 4, 6]);
  assert_eq!(second.values(), vec![2, 4, 6]);
}

#[test]
fn unsubscribe_is_idempotent() {
  init_tracing();
  let released = Rc::new(Cell::new(0));
  let r = released.clone();
  let subscription = Observable::<i32>::new(move |_| {
    let r = r.clone();
    Teardown::action(move || r.set(r.get() + 1))
  })
  .subscribe(|_| {});

  subscription.unsubscribe().unwrap();
  subscription.unsubscribe().unwrap();
  assert!(subscription.is_closed());
  assert_eq!(released.get(), 1);
}

#[test]
fn nothing_is_delivered_after_a_terminal() {
  init_tracing();
  let observer = TestObserver::<i32, String>::new();
  Observable::new(|subscriber: Subscriber<i32, String>| {
    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.error("late".to_owned());
    subscriber.complete();
  })
  .subscribe_with(observer.clone());

  assert_eq!(observer.notifications(), vec![Notification::Next(1), Notification::Complete]);
}

#[test]
fn merge_map_with_one_slot_is_concat_map() {
  init_tracing();
  let scheduler = VirtualTimeScheduler::new();
  let inner = {
    let scheduler = scheduler.clone();
    move |v: i32| cold::<i32, RxError>("a-b|", &[('a', v), ('b', v * 10)], &scheduler)
  };
  let merged = TestObserver::with_clock(scheduler.clone());
  let concatenated = TestObserver::with_clock(scheduler.clone());

  let source = cold::<i32, RxError>("12|", &[('1', 1), ('2', 2)], &scheduler);
  source.clone().merge_map(inner.clone(), 1).subscribe_with(merged.clone());
  source.concat_map(inner).subscribe_with(concatenated.clone());
  scheduler.flush();

  assert_eq!(merged.values(), vec![1, 10, 2, 20]);
  assert_eq!(merged.records(), concatenated.records());
}

#[test]
fn switch_map_drops_stale_inner_values() {
  init_tracing();
  let scheduler = VirtualTimeScheduler::new();
  let s = scheduler.clone();
  let observer = TestObserver::with_clock(scheduler.clone());
  cold::<char, RxError>("a-b----|", &[('a', 'a'), ('b', 'b')], &scheduler)
    .switch_map(move |c| cold::<String, RxError>("--x|", &[('x', format!("{c}!"))], &s))
    .subscribe_with(observer.clone());
  scheduler.flush();

  assert_eq!(observer.values(), vec!["b!".to_owned()]);
  assert!(observer.is_completed());
}

#[test]
fn zip_stops_with_the_shortest_source() {
  init_tracing();
  let observer = TestObserver::<(i32, char)>::new();
  observable::from_iter([1, 2, 3])
    .zip(vec!['x', 'y'])
    .subscribe_with(observer.clone());

  assert_eq!(observer.values(), vec![(1, 'x'), (2, 'y')]);
  assert!(observer.is_completed());
}

#[test]
fn combine_latest_waits_for_every_source() {
  init_tracing();
  let scheduler = VirtualTimeScheduler::new();
  let numbers = hot::<i32, RxError>("-1--2---|", &[('1', 1), ('2', 2)], &scheduler);
  let letters = hot::<char, RxError>("---a---b|", &[('a', 'a'), ('b', 'b')], &scheduler);
  let observer = TestObserver::with_clock(scheduler.clone());
  numbers.combine_latest(letters).subscribe_with(observer.clone());
  scheduler.flush();

  let pairs = [('x', (1, 'a')), ('y', (2, 'a')), ('z', (2, 'b'))];
  assert_eq!(observer.records(), expected("---xy--z|", &pairs));
}

#[test]
fn virtual_time_runs_in_due_order() {
  init_tracing();
  let scheduler = VirtualTimeScheduler::new();
  let log = Rc::new(RefCell::new(vec![]));
  for (name, ms) in [("late", 20), ("early", 10), ("also early", 10)] {
    let log = log.clone();
    scheduler.schedule_task(Box::new(move || log.borrow_mut().push(name)), Duration::from_millis(ms));
  }
  scheduler.advance_by(Duration::from_millis(15));
  assert_eq!(*log.borrow(), vec!["early", "also early"]);
  scheduler.flush();
  assert_eq!(*log.borrow(), vec!["early", "also early", "late"]);
  assert_eq!(scheduler.now(), Duration::from_millis(20));
}

#[test]
fn retry_when_notifier_error_ends_the_stream() {
  init_tracing();
  let attempts = Rc::new(Cell::new(0));
  let a = attempts.clone();
  let flaky = Observable::new(move |subscriber: Subscriber<i32, RxError>| {
    a.set(a.get() + 1);
    subscriber.next(a.get());
    subscriber.error(RxError::custom("flaky"));
  });

  let observer = TestObserver::<i32, RxError>::new();
  flaky
    .retry_when(|errors| {
      errors
        .scan(0, |n, _| n + 1)
        .try_map(|n| if n >= 3 { Err(RxError::custom("gave up")) } else { Ok(n) })
    })
    .subscribe_with(observer.clone());

  assert_eq!(attempts.get(), 3);
  assert_eq!(observer.values(), vec![1, 2, 3]);
  assert_eq!(observer.errors(), vec![RxError::custom("gave up")]);
}

#[test]
fn retry_when_immediate_notifier_error_after_first_run() {
  init_tracing();
  let attempts = Rc::new(Cell::new(0));
  let a = attempts.clone();
  let flaky = Observable::new(move |subscriber: Subscriber<i32, RxError>| {
    a.set(a.get() + 1);
    subscriber.next(1);
    subscriber.next(2);
    subscriber.error(RxError::custom("flaky"));
  });

  let observer = TestObserver::<i32, RxError>::new();
  flaky
    .retry_when(|_| observable::throw_error::<(), _>(RxError::custom("stop")))
    .subscribe_with(observer.clone());

  assert_eq!(attempts.get(), 1);
  assert_eq!(observer.values(), vec![1, 2]);
  assert_eq!(observer.errors(), vec![RxError::custom("stop")]);
}

#[test]
fn failing_projection_terminates_the_chain() {
  init_tracing();
  let finalized = Rc::new(Cell::new(false));
  let f = finalized.clone();
  let observer = TestObserver::<i32, RxError>::new();
  observable::from_iter(1..=5)
    .try_map(|v| if v == 3 { Err(RxError::custom("three")) } else { Ok(v) })
    .finalize(move || f.set(true))
    .subscribe_with(observer.clone());

  assert_eq!(observer.values(), vec![1, 2]);
  assert_eq!(observer.errors(), vec![RxError::custom("three")]);
  assert!(finalized.get());
}

#[cfg(feature = "scheduler")]
#[tokio::test]
async fn async_scheduler_drives_timers() {
  init_tracing();
  let local = tokio::task::LocalSet::new();
  local
    .run_until(async {
      let observer = TestObserver::<usize>::new();
      observable::interval(Duration::from_millis(2), AsyncScheduler)
        .take(3)
        .subscribe_with(observer.clone());
      tokio::time::sleep(Duration::from_millis(100)).await;
      assert_eq!(observer.values(), vec![0, 1, 2]);
      assert!(observer.is_completed());
    })
    .await;
}
