use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use super::merge_map::{Project, Select};
use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{InnerSubscription, OuterObserver, Subscriber},
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Maps each value to an inner stream, unsubscribing the previous inner
  /// stream whenever a new value arrives. Only the latest inner stream's
  /// values are emitted.
  pub fn switch_map<R, I>(self, project: impl Fn(T) -> I + 'static) -> Observable<R, E>
  where
    R: 'static,
    I: ObservableInput<R, E>,
  {
    let project: Project<T, (), R, E> = Rc::new(move |value| ((), project(value).into_observable()));
    let select: Select<(), R, R, E> = Rc::new(|_, inner, _, _| Ok(inner));
    self.switch_with_engine(project, select)
  }

  /// Like [`switch_map`](Self::switch_map), combining every inner value with
  /// the outer value it came from.
  pub fn switch_map_with<R, I, Out>(
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
    self.switch_with_engine(project, Rc::new(selector))
  }

  pub fn switch_map_to<R: 'static>(self, inner: impl ObservableInput<R, E>) -> Observable<R, E> {
    let inner = inner.into_observable();
    self.switch_map(move |_| inner.clone())
  }

  fn switch_with_engine<O, R, Out>(
    self, project: Project<T, O, R, E>, select: Select<O, R, Out, E>,
  ) -> Observable<Out, E>
  where
    O: Clone + 'static,
    R: 'static,
    Out: 'static,
  {
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      let state = Rc::new(SwitchMap {
        downstream: downstream.clone(),
        project: project.clone(),
        select: select.clone(),
        current: RefCell::new(None),
        index: Cell::new(0),
        outer_done: Cell::new(false),
      });
      source.subscribe_within(downstream.subscription(), SwitchMapObserver(state));
    })
  }
}

impl<R: 'static, E: 'static> Observable<Observable<R, E>, E> {
  /// Mirrors the most recently emitted inner stream.
  pub fn switch_all(self) -> Observable<R, E> { self.switch_map(|inner| inner) }
}

struct SwitchMap<T, O, R, Out, E> {
  downstream: Subscriber<Out, E>,
  project: Project<T, O, R, E>,
  select: Select<O, R, Out, E>,
  current: RefCell<Option<InnerSubscription>>,
  index: Cell<usize>,
  outer_done: Cell<bool>,
}

impl<T, O, R, Out, E> OuterObserver<O, R, E> for SwitchMap<T, O, R, Out, E>
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
    let is_current = this.current.borrow().as_ref().is_some_and(|c| c.ptr_eq(inner));
    if is_current {
      this.current.borrow_mut().take();
    }
    if this.outer_done.get() && this.current.borrow().is_none() {
      this.downstream.complete();
    }
  }
}

struct SwitchMapObserver<T, O, R, Out, E>(Rc<SwitchMap<T, O, R, Out, E>>);

impl<T, O, R, Out, E> Observer<T, E> for SwitchMapObserver<T, O, R, Out, E>
where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  fn next(&mut self, value: T) {
    let state = &self.0;
    let previous = state.current.borrow_mut().take();
    if let Some(previous) = previous {
      previous.unsubscribe();
    }
    let index = state.index.get();
    state.index.set(index + 1);
    let (outer_value, input) = (state.project)(value);
    let inner = InnerSubscription::new(state.downstream.subscription());
    *state.current.borrow_mut() = Some(inner.clone());
    inner.run(state, input, outer_value, index);
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.outer_done.set(true);
    if self.0.current.borrow().is_none() {
      self.0.downstream.complete();
    }
  }
}
