use std::{cell::RefCell, rc::Rc};

use super::Observable;
use crate::subscriber::{InnerSubscription, OuterObserver, Subscriber};

/// Mirrors whichever source notifies first and unsubscribes the others.
pub fn race<T, E>(sources: impl IntoIterator<Item = Observable<T, E>>) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
{
  let sources: Vec<_> = sources.into_iter().collect();
  Observable::new(move |downstream: Subscriber<T, E>| {
    let race = Rc::new(Race {
      downstream: downstream.clone(),
      winner: RefCell::new(None),
      contenders: RefCell::new(Vec::with_capacity(sources.len())),
    });
    for (index, source) in sources.iter().enumerate() {
      if race.winner.borrow().is_some() || downstream.is_closed() {
        break;
      }
      let inner = InnerSubscription::new(downstream.subscription());
      race.contenders.borrow_mut().push(inner.clone());
      inner.run(&race, source.clone(), (), index);
    }
  })
}

struct Race<T, E> {
  downstream: Subscriber<T, E>,
  winner: RefCell<Option<InnerSubscription>>,
  contenders: RefCell<Vec<InnerSubscription>>,
}

impl<T: 'static, E: 'static> Race<T, E> {
  fn claim(&self, inner: &InnerSubscription) -> bool {
    if let Some(winner) = self.winner.borrow().as_ref() {
      return winner.ptr_eq(inner);
    }
    *self.winner.borrow_mut() = Some(inner.clone());
    let losers: Vec<_> = self
      .contenders
      .borrow_mut()
      .drain(..)
      .filter(|c| !c.ptr_eq(inner))
      .collect();
    losers.iter().for_each(InnerSubscription::unsubscribe);
    true
  }
}

impl<T: 'static, E: 'static> OuterObserver<(), T, E> for Race<T, E> {
  fn notify_next(
    this: &Rc<Self>, _: (), value: T, _: usize, _: usize, inner: &InnerSubscription,
  ) {
    if this.claim(inner) {
      this.downstream.next(value);
    }
  }

  fn notify_error(this: &Rc<Self>, err: E, inner: &InnerSubscription) {
    if this.claim(inner) {
      this.downstream.error(err);
    }
  }

  fn notify_complete(this: &Rc<Self>, inner: &InnerSubscription) {
    if this.claim(inner) {
      inner.detach();
      this.downstream.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn first_to_emit_wins() {
    let scheduler = VirtualTimeScheduler::new();
    let observer = TestObserver::<&str>::new();
    let slow = observable::interval(Duration::from_millis(20), scheduler.clone()).map_to("slow");
    let fast = observable::interval(Duration::from_millis(15), scheduler.clone()).map_to("fast");
    let subscription = observable::race([slow, fast]).take(2).subscribe_with(observer.clone());

    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(observer.values(), vec!["fast", "fast"]);
    assert!(subscription.is_closed());
  }

  #[test]
  fn synchronous_winner_prevents_later_subscriptions() {
    let observer = TestObserver::<i32>::new();
    observable::race([observable::of(1), observable::never()]).subscribe_with(observer.clone());
    assert_eq!(observer.values(), vec![1]);
    assert!(observer.is_completed());
  }
}
