use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::Rc,
};

use crate::{
  observable::{Observable, ObservableInput},
  observer::Observer,
  subscriber::{subscribe_to_result, InnerSubscription, OuterObserver, Subscriber},
};

type Project<T, E> = Rc<dyn Fn(T) -> Observable<T, E>>;

impl<T: Clone + 'static, E: 'static> Observable<T, E> {
  /// Emits every value and feeds it back through `project`, recursively:
  /// the values of each projected stream are emitted and projected too.
  ///
  /// At most `concurrent` projected streams are subscribed at a time; the
  /// rest wait in order. Completes once the source and every projected
  /// stream have completed.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn expand<I>(self, project: impl Fn(T) -> I + 'static, concurrent: usize) -> Observable<T, E>
  where
    I: ObservableInput<T, E>,
  {
    assert!(concurrent > 0, "`concurrent` must be greater than zero");
    let project: Project<T, E> = Rc::new(move |value| project(value).into_observable());
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let state = Rc::new(Expand {
        downstream: downstream.clone(),
        project: project.clone(),
        concurrent,
        active: Cell::new(0),
        index: Cell::new(0),
        buffer: RefCell::new(VecDeque::new()),
        outer_done: Cell::new(false),
      });
      source.subscribe_within(downstream.subscription(), ExpandObserver(state));
    })
  }
}

struct Expand<T, E> {
  downstream: Subscriber<T, E>,
  project: Project<T, E>,
  concurrent: usize,
  active: Cell<usize>,
  index: Cell<usize>,
  buffer: RefCell<VecDeque<T>>,
  outer_done: Cell<bool>,
}

impl<T: Clone + 'static, E: 'static> Expand<T, E> {
  fn on_value(this: &Rc<Self>, value: T) {
    this.downstream.next(value.clone());
    if this.downstream.is_closed() {
      return;
    }
    if this.active.get() < this.concurrent {
      Self::start(this, value);
    } else {
      this.buffer.borrow_mut().push_back(value);
    }
  }

  fn start(this: &Rc<Self>, value: T) {
    let index = this.index.get();
    this.index.set(index + 1);
    this.active.set(this.active.get() + 1);
    let inner = (this.project)(value);
    subscribe_to_result(this, this.downstream.subscription(), inner, (), index);
  }

  fn check_complete(&self) {
    if self.outer_done.get() && self.active.get() == 0 && self.buffer.borrow().is_empty() {
      self.downstream.complete();
    }
  }
}

impl<T: Clone + 'static, E: 'static> OuterObserver<(), T, E> for Expand<T, E> {
  fn notify_next(this: &Rc<Self>, _: (), value: T, _: usize, _: usize, _: &InnerSubscription) {
    Self::on_value(this, value)
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

struct ExpandObserver<T, E>(Rc<Expand<T, E>>);

impl<T: Clone + 'static, E: 'static> Observer<T, E> for ExpandObserver<T, E> {
  fn next(&mut self, value: T) { Expand::on_value(&self.0, value) }

  fn error(&mut self, err: E) { self.0.downstream.error(err) }

  fn complete(&mut self) {
    self.0.outer_done.set(true);
    self.0.check_complete();
  }
}
