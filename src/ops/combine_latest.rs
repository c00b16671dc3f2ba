use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use super::zip::{First, Second};
use crate::{
  observable::{Observable, ObservableInput},
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: Clone + 'static, E: 'static> Observable<T, E> {
  /// Emits the latest value of both streams whenever either emits, once
  /// both have emitted at least once. Completes when both have completed.
  pub fn combine_latest<U>(self, other: impl ObservableInput<U, E>) -> Observable<(T, U), E>
  where
    U: Clone + 'static,
  {
    self.combine_latest_with(other, |a, b| Ok((a, b)))
  }

  pub fn combine_latest_with<U, Out>(
    self, other: impl ObservableInput<U, E>, selector: impl Fn(T, U) -> Result<Out, E> + 'static,
  ) -> Observable<Out, E>
  where
    U: Clone + 'static,
    Out: 'static,
  {
    let other = other.into_observable();
    let selector: Rc<dyn Fn(T, U) -> Result<Out, E>> = Rc::new(selector);
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      let state = Rc::new(CombineLatest2 {
        downstream: downstream.clone(),
        selector: selector.clone(),
        first: RefCell::new(None),
        second: RefCell::new(None),
        completed: Cell::new(0),
      });
      subscribe_to_result(&state, downstream.subscription(), source.clone(), First, 0);
      subscribe_to_result(&state, downstream.subscription(), other.clone(), Second, 1);
    })
  }
}

struct CombineLatest2<T, U, Out, E> {
  downstream: Subscriber<Out, E>,
  selector: Rc<dyn Fn(T, U) -> Result<Out, E>>,
  first: RefCell<Option<T>>,
  second: RefCell<Option<U>>,
  completed: Cell<usize>,
}

impl<T: Clone + 'static, U: Clone + 'static, Out: 'static, E: 'static> CombineLatest2<T, U, Out, E> {
  fn emit(&self) {
    let pair = match (&*self.first.borrow(), &*self.second.borrow()) {
      (Some(a), Some(b)) => Some((a.clone(), b.clone())),
      _ => None,
    };
    if let Some((a, b)) = pair {
      match (self.selector)(a, b) {
        Ok(value) => self.downstream.next(value),
        Err(err) => self.downstream.error(err),
      }
    }
  }

  fn source_completed(&self, inner: &InnerSubscription) {
    inner.detach();
    self.completed.set(self.completed.get() + 1);
    if self.completed.get() == 2 {
      self.downstream.complete();
    }
  }
}

impl<T, U, Out, E> OuterObserver<First, T, E> for CombineLatest2<T, U, Out, E>
where
  T: Clone + 'static,
  U: Clone + 'static,
  Out: 'static,
  E: 'static,
{
  fn notify_next(this: &Rc<Self>, _: First, value: T, _: usize, _: usize, _: &InnerSubscription) {
    *this.first.borrow_mut() = Some(value);
    this.emit();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) { this.source_completed(inner) }
}

impl<T, U, Out, E> OuterObserver<Second, U, E> for CombineLatest2<T, U, Out, E>
where
  T: Clone + 'static,
  U: Clone + 'static,
  Out: 'static,
  E: 'static,
{
  fn notify_next(this: &Rc<Self>, _: Second, value: U, _: usize, _: usize, _: &InnerSubscription) {
    *this.second.borrow_mut() = Some(value);
    this.emit();
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) { this.source_completed(inner) }
}

/// Combines the latest values of any number of streams into vectors in
/// source order. An empty list completes at once.
pub fn combine_latest_all<T, E>(sources: Vec<Observable<T, E>>) -> Observable<Vec<T>, E>
where
  T: Clone + 'static,
  E: 'static,
{
  Observable::new(move |downstream: Subscriber<Vec<T>, E>| {
    if sources.is_empty() {
      downstream.complete();
      return;
    }
    let state = Rc::new(CombineLatestAll {
      downstream: downstream.clone(),
      latest: RefCell::new(vec![None; sources.len()]),
      active: Cell::new(sources.len()),
    });
    for (index, source) in sources.iter().enumerate() {
      if downstream.is_closed() {
        break;
      }
      subscribe_to_result(&state, downstream.subscription(), source.clone(), index, index);
    }
  })
}

struct CombineLatestAll<T, E> {
  downstream: Subscriber<Vec<T>, E>,
  latest: RefCell<Vec<Option<T>>>,
  active: Cell<usize>,
}

impl<T: Clone + 'static, E: 'static> OuterObserver<usize, T, E> for CombineLatestAll<T, E> {
  fn notify_next(this: &Rc<Self>, source: usize, value: T, _: usize, _: usize, _: &InnerSubscription) {
    let values = {
      let mut latest = this.latest.borrow_mut();
      latest[source] = Some(value);
      latest.iter().cloned().collect::<Option<Vec<_>>>()
    };
    if let Some(values) = values {
      this.downstream.next(values);
    }
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.active.set(this.active.get() - 1);
    if this.active.get() == 0 {
      this.downstream.complete();
    }
  }
}
