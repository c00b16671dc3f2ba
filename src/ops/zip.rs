//! Lock-step combination.
//!
//! Every source gets its own FIFO buffer. As soon as each buffer holds a
//! value, the fronts are taken out and combined. The result completes once
//! a completed source has nothing left in its buffer, since no further
//! combination is possible.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use crate::{
  observable::{Observable, ObservableInput},
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Pairs the n-th value of this stream with the n-th value of `other`.
  pub fn zip<U: 'static>(self, other: impl ObservableInput<U, E>) -> Observable<(T, U), E> {
    self.zip_with(other, |a, b| Ok((a, b)))
  }

  /// Combines the n-th values of both streams with `selector`. An `Err` from
  /// the selector terminates the stream.
  pub fn zip_with<U, Out>(
    self, other: impl ObservableInput<U, E>, selector: impl Fn(T, U) -> Result<Out, E> + 'static,
  ) -> Observable<Out, E>
  where
    U: 'static,
    Out: 'static,
  {
    let other = other.into_observable();
    let selector: Rc<dyn Fn(T, U) -> Result<Out, E>> = Rc::new(selector);
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      let state = Rc::new(Zip2 {
        downstream: downstream.clone(),
        selector: selector.clone(),
        first: RefCell::new(VecDeque::new()),
        second: RefCell::new(VecDeque::new()),
        first_done: Cell::new(false),
        second_done: Cell::new(false),
      });
      subscribe_to_result(&state, downstream.subscription(), source.clone(), First, 0);
      subscribe_to_result(&state, downstream.subscription(), other.clone(), Second, 1);
    })
  }
}

#[derive(Clone)]
pub(crate) struct First;

#[derive(Clone)]
pub(crate) struct Second;

struct Zip2<T, U, Out, E> {
  downstream: Subscriber<Out, E>,
  selector: Rc<dyn Fn(T, U) -> Result<Out, E>>,
  first: RefCell<VecDeque<T>>,
  second: RefCell<VecDeque<U>>,
  first_done: Cell<bool>,
  second_done: Cell<bool>,
}

impl<T: 'static, U: 'static, Out: 'static, E: 'static> Zip2<T, U, Out, E> {
  fn emit_ready(&self) {
    loop {
      if self.first.borrow().is_empty() || self.second.borrow().is_empty() {
        break;
      }
      let a = self.first.borrow_mut().pop_front();
      let b = self.second.borrow_mut().pop_front();
      let (Some(a), Some(b)) = (a, b) else { break };
      match (self.selector)(a, b) {
        Ok(value) => self.downstream.next(value),
        Err(err) => {
          self.downstream.error(err);
          return;
        }
      }
    }
    self.check_complete();
  }

  fn check_complete(&self) {
    let exhausted = (self.first_done.get() && self.first.borrow().is_empty())
      || (self.second_done.get() && self.second.borrow().is_empty());
    if exhausted {
      self.downstream.complete();
    }
  }
}

impl<T: 'static, U: 'static, Out: 'static, E: 'static> OuterObserver<First, T, E> for Zip2<T, U, Out, E> {
  fn notify_next(this: &Rc<Self>, _: First, value: T, _: usize, _: usize, _: &InnerSubscription) {
    this.first.borrow_mut().push_back(value);
    this.emit_ready();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.first_done.set(true);
    this.check_complete();
  }
}

impl<T: 'static, U: 'static, Out: 'static, E: 'static> OuterObserver<Second, U, E> for Zip2<T, U, Out, E> {
  fn notify_next(this: &Rc<Self>, _: Second, value: U, _: usize, _: usize, _: &InnerSubscription) {
    this.second.borrow_mut().push_back(value);
    this.emit_ready();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.second_done.set(true);
    this.check_complete();
  }
}

/// Zips any number of streams into vectors, one value from each source in
/// source order. An empty list completes at once.
pub fn zip_all<T: 'static, E: 'static>(sources: Vec<Observable<T, E>>) -> Observable<Vec<T>, E> {
  Observable::new(move |downstream: Subscriber<Vec<T>, E>| {
    if sources.is_empty() {
      downstream.complete();
      return;
    }
    let inners: Vec<_> = sources
      .iter()
      .map(|_| InnerSubscription::new(downstream.subscription()))
      .collect();
    let state = Rc::new(ZipAll {
      downstream: downstream.clone(),
      buffers: RefCell::new((0..sources.len()).map(|_| VecDeque::new()).collect()),
      done: RefCell::new(vec![false; sources.len()]),
      inners: inners.clone(),
    });
    for (index, (source, inner)) in sources.iter().zip(inners).enumerate() {
      inner.run(&state, source.clone(), index, index);
    }
  })
}

struct ZipAll<T, E> {
  downstream: Subscriber<Vec<T>, E>,
  buffers: RefCell<Vec<VecDeque<T>>>,
  done: RefCell<Vec<bool>>,
  inners: Vec<InnerSubscription>,
}

impl<T: 'static, E: 'static> ZipAll<T, E> {
  fn check_complete(&self) {
    let buffers = self.buffers.borrow();
    let exhausted = self
      .done
      .borrow()
      .iter()
      .zip(buffers.iter())
      .any(|(done, buffer)| *done && buffer.is_empty());
    drop(buffers);
    if exhausted {
      self.downstream.complete();
    }
  }
}

impl<T: 'static, E: 'static> OuterObserver<usize, T, E> for ZipAll<T, E> {
  fn notify_next(this: &Rc<Self>, source: usize, value: T, _: usize, _: usize, _: &InnerSubscription) {
    let ready = {
      let mut buffers = this.buffers.borrow_mut();
      buffers[source].push_back(value);
      if buffers.iter().all(|b| !b.is_empty()) {
        Some(buffers.iter_mut().filter_map(VecDeque::pop_front).collect::<Vec<_>>())
      } else {
        None
      }
    };
    if let Some(values) = ready {
      this.downstream.next(values);
      this.check_complete();
    }
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    if let Some(index) = this.inners.iter().position(|i| i.ptr_eq(inner)) {
      this.done.borrow_mut()[index] = true;
    }
    this.check_complete();
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::*};

  #[test]
  fn pairs_in_lock_step() {
    let observer = TestObserver::<(i32, char)>::new();
    observable::from_iter(vec![1, 2, 3])
      .zip(vec!['x', 'y'])
      .subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![
      Notification::Next((1, 'x')),
      Notification::Next((2, 'y')),
      Notification::Complete
    ]);
  }

  #[test]
  fn waits_for_slower_source() {
    let scheduler = VirtualTimeScheduler::new();
    let left = cold::<i32, RxError>("a-b-c|", &[('a', 1), ('b', 2), ('c', 3)], &scheduler);
    let right = cold::<i32, RxError>("--x---y|", &[('x', 10), ('y', 20)], &scheduler);
    let observer = TestObserver::with_clock(scheduler.clone());
    left.zip_with(right, |a, b| Ok(a + b)).subscribe_with(observer.clone());
    scheduler.flush();
    assert_eq!(observer.records(), expected("--s---t|", &[('s', 11), ('t', 22)]));
  }

  #[test]
  fn failing_selector() {
    let observer = TestObserver::<i32, &str>::new();
    observable::from_iter(vec![1, 0])
      .zip_with(vec![1, 1], |a, b| if a == 0 { Err("zero") } else { Ok(a * b) })
      .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1]);
    assert_eq!(observer.errors(), vec!["zero"]);
  }

  #[test]
  fn zip_all_vectors() {
    let observer = TestObserver::<Vec<i32>>::new();
    super::zip_all(vec![
      observable::from_iter(vec![1, 2]),
      observable::from_iter(vec![10, 20, 30]),
      observable::from_iter(vec![100, 200]),
    ])
    .subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![vec![1, 10, 100], vec![2, 20, 200]]);
    assert!(observer.is_completed());

    let observer = TestObserver::<Vec<i32>>::new();
    super::zip_all(vec![]).subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![Notification::Complete]);
  }
}
