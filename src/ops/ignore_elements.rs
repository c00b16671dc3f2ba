use crate::{observable::Observable, subscriber::Subscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Drops every value and keeps only the terminal notification.
  pub fn ignore_elements(self) -> Observable<T, E> {
    self.lift(|downstream: Subscriber<T, E>, source: &Observable<T, E>| {
      let (d_err, d_complete) = (downstream.clone(), downstream.clone());
      let observer = crate::observer::FnObserver::new(
        |_: T| {},
        move |err: E| d_err.error(err),
        move || d_complete.complete(),
      );
      source.subscribe_within(downstream.subscription(), observer);
    })
  }
}

#[cfg(test)]
mod tests {
  use crate::{prelude::*, testing::TestObserver};

  #[test]
  fn only_terminal() {
    let observer = TestObserver::<i32>::new();
    observable::from_iter(0..10).ignore_elements().subscribe_with(observer.clone());
    assert_eq!(observer.notifications(), vec![Notification::Complete]);
  }
}
