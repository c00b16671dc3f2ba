use futures::future::{abortable, Future, FutureExt};

use super::Observable;
use crate::{subscriber::Subscriber, subscription::Teardown};

/// Converts a `Future` into an observable.
///
/// `Ok(value)` becomes one `next` followed by `complete`; `Err(err)` becomes an
/// error. The future is shared, so every subscription observes the same
/// result. Subscribing spawns a task with [`tokio::task::spawn_local`] and
/// must happen inside a [`tokio::task::LocalSet`]. Unsubscribing aborts the
/// task; a result that arrives after that is dropped.
pub fn from_future<F, T, E>(future: F) -> Observable<T, E>
where
  F: Future<Output = Result<T, E>> + 'static,
  T: Clone + 'static,
  E: Clone + 'static,
{
  let shared = future.shared();
  Observable::new(move |subscriber: Subscriber<T, E>| {
    let (task, handle) = abortable(shared.clone());
    tokio::task::spawn_local(async move {
      let Ok(result) = task.await else {
        tracing::trace!("future observable aborted before resolving");
        return;
      };
      match result {
        Ok(value) => {
          subscriber.next(value);
          subscriber.complete();
        }
        Err(err) => subscriber.error(err),
      }
    });
    Teardown::action(move || handle.abort())
  })
}

#[cfg(test)]
mod tests {
  use futures::future;
  use tokio::task::LocalSet;

  use crate::{prelude::*, testing::TestObserver};

  #[tokio::test]
  async fn resolves_to_next_and_complete() {
    LocalSet::new()
      .run_until(async {
        let observer = TestObserver::<i32, ()>::new();
        observable::from_future(future::ready(Ok(7))).subscribe_with(observer.clone());
        assert!(observer.notifications().is_empty());
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(observer.values(), vec![7]);
        assert!(observer.is_completed());
      })
      .await;
  }

  #[tokio::test]
  async fn rejection_is_an_error() {
    LocalSet::new()
      .run_until(async {
        let observer = TestObserver::<i32, &str>::new();
        observable::from_future(future::ready(Err("nope"))).subscribe_with(observer.clone());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(observer.errors(), vec!["nope"]);
      })
      .await;
  }

  #[tokio::test]
  async fn result_after_unsubscribe_is_dropped() {
    LocalSet::new()
      .run_until(async {
        let observer = TestObserver::<i32, ()>::new();
        let delayed = async {
          tokio::time::sleep(Duration::from_millis(5)).await;
          Ok(1)
        };
        let subscription = observable::from_future(delayed).subscribe_with(observer.clone());
        subscription.unsubscribe().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(observer.notifications().is_empty());
      })
      .await;
  }
}
