use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Pairs every value with the latest value of `other`. Values that arrive
  /// before `other` has emitted are dropped; `other` completing has no
  /// effect.
  pub fn with_latest_from<U>(self, other: impl ObservableInput<U, E>) -> Observable<(T, U), E>
  where
    U: Clone + 'static,
  {
    self.with_latest_from_with(other, |a, b| Ok((a, b)))
  }

  pub fn with_latest_from_with<U, Out>(
    self, other: impl ObservableInput<U, E>, selector: impl Fn(T, U) -> Result<Out, E> + 'static,
  ) -> Observable<Out, E>
  where
    U: Clone + 'static,
    Out: 'static,
  {
    let other = other.into_observable();
    let selector = Rc::new(selector);
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      let latest = Rc::new(Latest { downstream: downstream.clone(), value: RefCell::new(None) });
      subscribe_to_result(&latest, downstream.subscription(), other.clone(), (), 0);
      let observer = WithLatestObserver { latest, selector: selector.clone() };
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

struct Latest<U, Out, E> {
  downstream: Subscriber<Out, E>,
  value: RefCell<Option<U>>,
}

impl<U: 'static, Out: 'static, E: 'static> OuterObserver<(), U, E> for Latest<U, Out, E> {
  fn notify_next(this: &Rc<Self>, _: (), value: U, _: usize, _: usize, _: &InnerSubscription) {
    *this.value.borrow_mut() = Some(value);
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(_: &Rc<Self>, inner: &InnerSubscription) { inner.detach() }
}

struct WithLatestObserver<U, Out, E, F> {
  latest: Rc<Latest<U, Out, E>>,
  selector: Rc<F>,
}

impl<T, U, Out, E, F> Observer<T, E> for WithLatestObserver<U, Out, E, F>
where
  U: Clone + 'static,
  Out: 'static,
  E: 'static,
  F: Fn(T, U) -> Result<Out, E>,
{
  fn next(&mut self, value: T) {
    let other = self.latest.value.borrow().clone();
    if let Some(other) = other {
      match (self.selector)(value, other) {
        Ok(out) => self.latest.downstream.next(out),
        Err(err) => self.latest.downstream.error(err),
      }
    }
  }

  fn error(&mut self, err: E) { self.latest.downstream.error(err) }

  fn complete(&mut self) { self.latest.downstream.complete() }
}
