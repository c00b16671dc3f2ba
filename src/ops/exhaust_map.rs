use std::{cell::Cell, rc::Rc};

use super::merge_map::{Project, Select};
use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Maps a value to an inner stream only while no inner stream is active;
  /// values arriving in the meantime are dropped.
  pub fn exhaust_map<R, I>(self, project: impl Fn(T) -> I + 'static) -> Observable<R, E>
  where
    R: 'static,
    I: ObservableInput<R, E>,
  {
    let project: Project<T, (), R, E> = Rc::new(move |value| ((), project(value).into_observable()));
    let select: Select<(), R, R, E> = Rc::new(|_, inner, _, _| Ok(inner));
    self.exhaust_with_engine(project, select)
  }

  pub fn exhaust_map_with<R, I, Out>(
    self, project: impl Fn(T) -> I + 'static,
    selector: impl Fn(T, R, usize, usize) -> Result<Out, E> + 'static,
  ) -> Observable<Out, E>
  where
    T: Clone,
    R: 'static,
    Out: 'static,
    I: ObservableInput<R, E>,
  {
    let project: Project<T, T, R, E> =
      Rc::new(move |value: T| (value.clone(), project(value).into_observable()));
    self.exhaust_with_engine(project, Rc::new(selector))
  }

  pub fn exhaust_map_to<R: 'static>(self, inner: impl ObservableInput<R, E>) -> Observable<R, E> {
    let inner = inner.into_observable();
    self.exhaust_map(move |_| inner.clone())
  }

  fn exhaust_with_engine<O, R, Out>(
    self, project: Project<T, O, R, E>, select: Select<O, R, Out, E>,
  ) -> Observable<Out, E>
  where
    O: Clone + 'static,
    R: 'static,
    Out: 'static,
  {
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      let state = Rc::new(ExhaustMap {
        downstream: downstream.clone(),
        project: project.clone(),
        select: select.clone(),
        active: Cell::new(false),
        index: Cell::new(0),
        outer_done: Cell::new(false),
      });
      source.subscribe_within(downstream.subscription(), ExhaustMapObserver(state));
    })
  }
}

impl<R: 'static, E: 'static> Observable<Observable<R, E>, E> {
  /// Mirrors an emitted stream until it completes, ignoring the streams
  /// emitted meanwhile.
  pub fn exhaust_all(self) -> Observable<R, E> { self.exhaust_map(|inner| inner) }
}

struct ExhaustMap<T, O, R, Out, E> {
  downstream: Subscriber<Out, E>,
  project: Project<T, O, R, E>,
  select: Select<O, R, Out, E>,
  active: Cell<bool>,
  index: Cell<usize>,
  outer_done: Cell<bool>,
}

impl<T, O, R, Out, E> OuterObserver<O, R, E> for ExhaustMap<T, O, R, Out, E>
where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  fn notify_next(
    this: &Rc<Self>, outer_value: O, inner_value: R, outer_index: usize, inner_index: usize,
    _: &InnerSubscription,
  ) {
    match (this.select)(outer_value, inner_value, outer_index, inner_index) {
      Ok(value) => this.downstream.next(value),
      Err(err) => this.downstream.error(err),
    }
  }

  fn notify_error(this: &Rc<Self>, err: E, _: &InnerSubscription) { this.downstream.error(err) }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    inner.detach();
    this.active.set(false);
    if this.outer_done.get() {
      this.downstream.complete();
    }
  }
}

struct ExhaustMapObserver<T, O, R, Out, E>(Rc<ExhaustMap<T, O, R, Out, E>>);

impl<T, O, R, Out, E> Observer<T, E> for ExhaustMapObserver<T, O, R, Out, E>
where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  fn next(&mut self, value: T) {
    let state = &self.0;
    let index = state.index.get();
    state.index.set(index + 1);
    if state.active.get() {
      tracing::trace!(index, "exhaust_map dropped a value while busy");
      return;
    }
    state.active.set(true);
    let (outer_value, input) = (state.project)(value);
    subscribe_to_result(state, state.downstream.subscription(), input, outer_value, index);
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.outer_done.set(true);
    if !self.0.active.get() {
      self.0.downstream.complete();
    }
  }
}
