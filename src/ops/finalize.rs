use std::rc::Rc;

use crate::{observable::Observable, subscriber::Subscriber, subscription::Teardown};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Calls `f` once the subscription ends, whether by completion, error or
  /// unsubscription. Runs after the source has been torn down.
  pub fn finalize(self, f: impl Fn() + 'static) -> Observable<T, E> {
    let f = Rc::new(f);
    self.lift(move |downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      source.subscribe_within(downstream.subscription(), downstream.clone());
      let f = f.clone();
      downstream.add(Teardown::action(move || f()));
    })
  }
}
