use super::{from_iter, Observable};

/// Subscribes to every source at once and forwards all their values.
/// Completes when every source has completed.
pub fn merge<T, E>(sources: impl IntoIterator<Item = Observable<T, E>>) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
{
  let sources: Vec<_> = sources.into_iter().collect();
  from_iter::<_, E>(sources).merge_all(usize::MAX)
}

/// Subscribes to the sources one after the other, each once the previous one
/// has completed.
pub fn concat<T, E>(sources: impl IntoIterator<Item = Observable<T, E>>) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
{
  let sources: Vec<_> = sources.into_iter().collect();
  from_iter::<_, E>(sources).concat_all()
}

/// Pairs up the n-th values of every source. See
/// [`Observable::zip`](crate::observable::Observable::zip).
pub fn zip<T, E>(sources: impl IntoIterator<Item = Observable<T, E>>) -> Observable<Vec<T>, E>
where
  T: 'static,
  E: 'static,
{
  crate::ops::zip::zip_all(sources.into_iter().collect())
}

/// Emits the latest value of every source whenever one of them emits, once
/// all have emitted. See
/// [`Observable::combine_latest`](crate::observable::Observable::combine_latest).
pub fn combine_latest<T, E>(
  sources: impl IntoIterator<Item = Observable<T, E>>,
) -> Observable<Vec<T>, E>
where
  T: Clone + 'static,
  E: 'static,
{
  crate::ops::combine_latest::combine_latest_all(sources.into_iter().collect())
}
