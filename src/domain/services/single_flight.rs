#[cfg(test)]
#[path = "single_flight_test.rs"]
mod tests;

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::future::FutureExt;
use futures::future::Shared;

type Flight<T> = (u64, Shared<BoxFuture<'static, T>>);

/// Collapses concurrent calls for the same key into one execution whose result
/// every caller receives.
pub struct SingleFlight<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    next_id: AtomicU64,
    inflight: DashMap<K, Flight<T>>,
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash,
    T: Clone,
{
    fn default() -> SingleFlight<K, T> {
        return SingleFlight {
            next_id: AtomicU64::new(0),
            inflight: DashMap::new(),
        };
    }
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone + Send + Sync + 'static,
{
    /// Joins the flight running for `key`, or starts one with `start` if there
    /// is none.
    pub async fn run<F, Fut>(&self, key: K, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (id, flight) = {
            let entry = self.inflight.entry(key.clone()).or_insert_with(|| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                return (id, start().boxed().shared());
            });
            (entry.0, entry.1.clone())
        };

        let res = flight.await;
        self.inflight
            .remove_if(&key, |_, (current, _)| return *current == id);

        return res;
    }

    pub fn in_flight(&self) -> usize {
        return self.inflight.len();
    }
}
