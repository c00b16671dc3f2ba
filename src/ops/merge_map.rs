//! `merge_map` and everything built on it.
//!
//! One engine serves `merge_map`, `merge_all`, `merge`, the `concat_*`
//! family (concurrency one), `merge_scan` and `delay_when`. Outer values
//! beyond the concurrency limit wait in a FIFO buffer; each inner completion
//! starts the oldest buffered value. The result completes once the source
//! has completed, the buffer is empty and no inner stream is active.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use crate::{
  observable::{merge, Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

/// Maps an outer value to the value kept for the selector and the inner
/// stream to subscribe.
pub(crate) type Project<T, O, R, E> = Rc<dyn Fn(T) -> (O, Observable<R, E>)>;

/// Turns `(kept outer value, inner value, outer index, inner index)` into the
/// emitted value.
pub(crate) type Select<O, R, Out, E> = Rc<dyn Fn(O, R, usize, usize) -> Result<Out, E>>;

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Maps each value to an inner stream and merges the inner streams, with
  /// at most `concurrent` of them subscribed at a time.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_map<R, I>(self, project: impl Fn(T) -> I + 'static, concurrent: usize) -> Observable<R, E>
  where
    R: 'static,
    I: ObservableInput<R, E>,
  {
    let project: Project<T, (), R, E> = Rc::new(move |value| ((), project(value).into_observable()));
    let select: Select<(), R, R, E> = Rc::new(|_, inner, _, _| Ok(inner));
    self.merge_with_engine(project, select, concurrent)
  }

  /// Like [`merge_map`](Self::merge_map), combining every inner value with
  /// the outer value it came from. `selector` receives the outer value, the
  /// inner value, the outer index and the inner index.
  pub fn merge_map_with<R, I, Out>(
    self, project: impl Fn(T) -> I + 'static,
    selector: impl Fn(T, R, usize, usize) -> Result<Out, E> + 'static, concurrent: usize,
  ) -> Observable<Out, E>
  where
    T: Clone,
    R: 'static,
    Out: 'static,
    I: ObservableInput<R, E>,
  {
    let project: Project<T, T, R, E> =
      Rc::new(move |value: T| (value.clone(), project(value).into_observable()));
    self.merge_with_engine(project, Rc::new(selector), concurrent)
  }

  /// Merges the same inner stream once per outer value.
  pub fn merge_map_to<R: 'static>(self, inner: impl ObservableInput<R, E>, concurrent: usize) -> Observable<R, E> {
    let inner = inner.into_observable();
    self.merge_map(move |_| inner.clone(), concurrent)
  }

  /// Merges this stream with `other`.
  pub fn merge(self, other: impl ObservableInput<T, E>) -> Observable<T, E> {
    merge([self, other.into_observable()])
  }

  pub(crate) fn merge_with_engine<O, R, Out>(
    self, project: Project<T, O, R, E>, select: Select<O, R, Out, E>, concurrent: usize,
  ) -> Observable<Out, E>
  where
    O: Clone + 'static,
    R: 'static,
    Out: 'static,
  {
    assert!(concurrent > 0, "`concurrent` must be greater than zero");
    self.lift(move |downstream: Subscriber<Out, E>, source: &Observable<T, E>| {
      subscribe_merged(downstream, source, project.clone(), select.clone(), concurrent);
    })
  }
}

impl<R: 'static, E: 'static> Observable<Observable<R, E>, E> {
  /// Merges the inner streams this stream emits, at most `concurrent` at a
  /// time.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_all(self, concurrent: usize) -> Observable<R, E> { self.merge_map(|inner| inner, concurrent) }
}

/// Subscribes `source` on behalf of `downstream` with the merge engine.
pub(crate) fn subscribe_merged<T, O, R, Out, E>(
  downstream: Subscriber<Out, E>, source: &Observable<T, E>, project: Project<T, O, R, E>,
  select: Select<O, R, Out, E>, concurrent: usize,
) where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  let state = Rc::new(MergeMap {
    downstream: downstream.clone(),
    project,
    select,
    concurrent,
    active: Cell::new(0),
    index: Cell::new(0),
    buffer: RefCell::new(VecDeque::new()),
    outer_done: Cell::new(false),
  });
  source.subscribe_within(downstream.subscription(), MergeMapObserver(state));
}

struct MergeMap<T, O, R, Out, E> {
  downstream: Subscriber<Out, E>,
  project: Project<T, O, R, E>,
  select: Select<O, R, Out, E>,
  concurrent: usize,
  active: Cell<usize>,
  index: Cell<usize>,
  buffer: RefCell<VecDeque<T>>,
  outer_done: Cell<bool>,
}

impl<T, O, R, Out, E> MergeMap<T, O, R, Out, E>
where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  fn start(this: &Rc<Self>, value: T) {
    let index = this.index.get();
    this.index.set(index + 1);
    this.active.set(this.active.get() + 1);
    let (outer_value, inner) = (this.project)(value);
    subscribe_to_result(this, this.downstream.subscription(), inner, outer_value, index);
  }

  fn check_complete(&self) {
    if self.outer_done.get() && self.active.get() == 0 && self.buffer.borrow().is_empty() {
      self.downstream.complete();
    }
  }
}

impl<T, O, R, Out, E> OuterObserver<O, R, E> for MergeMap<T, O, R, Out, E>
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
    this.active.set(this.active.get() - 1);
    let next = this.buffer.borrow_mut().pop_front();
    match next {
      Some(value) => Self::start(this, value),
      None => this.check_complete(),
    }
  }
}

struct MergeMapObserver<T, O, R, Out, E>(Rc<MergeMap<T, O, R, Out, E>>);

impl<T, O, R, Out, E> Observer<T, E> for MergeMapObserver<T, O, R, Out, E>
where
  T: 'static,
  O: Clone + 'static,
  R: 'static,
  Out: 'static,
  E: 'static,
{
  fn next(&mut self, value: T) {
    if self.0.active.get() < self.0.concurrent {
      MergeMap::start(&self.0, value);
    } else {
      self.0.buffer.borrow_mut().push_back(value);
    }
  }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.outer_done.set(true);
    self.0.check_complete();
  }
}
