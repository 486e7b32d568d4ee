use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type PatronMutex = Arc<AsyncMutex<()>>;

// PatronLocks serializes the actions of one patron so that the quota check
// and the ledger update see the same counters. An entry lives only while
// some action holds or waits for it.
#[derive(Debug, Default)]
pub struct PatronLocks {
    locks: Mutex<HashMap<i64, PatronMutex>>,
}

// PatronGuard releases the patron's lock on drop and evicts the map entry
// when no other action shares it.
#[derive(Debug)]
pub struct PatronGuard {
    patron_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<PatronLocks>,
}

impl PatronLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(self: &Arc<Self>, patron_id: i64) -> PatronGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.entry(patron_id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };
        PatronGuard {
            patron_id,
            guard: Some(lock.lock_owned().await),
            locks: self.clone(),
        }
    }

    // Clones of an entry are only taken under the map mutex, so a count of two
    // (the map and `released`) means nobody else holds or awaits it.
    fn release(&self, patron_id: i64, released: PatronMutex) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let idle = locks.get(&patron_id)
            .map(|lock| Arc::ptr_eq(lock, &released) && Arc::strong_count(&released) == 2)
            .unwrap_or(false);
        if idle {
            locks.remove(&patron_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

impl Drop for PatronGuard {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            let released = OwnedMutexGuard::mutex(&guard).clone();
            drop(guard);
            self.locks.release(self.patron_id, released);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use crate::circulation::domain::locks::PatronLocks;

    #[tokio::test]
    async fn test_should_serialize_same_patron() {
        let locks = Arc::new(PatronLocks::new());
        let guard = locks.lock(10).await;
        let other = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = other.lock(10).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());
        drop(guard);
        waiting.await.expect("should acquire lock");
        assert_eq!(0, locks.len());
    }

    #[tokio::test]
    async fn test_should_not_block_other_patrons() {
        let locks = Arc::new(PatronLocks::new());
        let first = locks.lock(10).await;
        let second = locks.lock(11).await;
        assert_eq!(2, locks.len());
        drop(first);
        assert_eq!(1, locks.len());
        drop(second);
        assert_eq!(0, locks.len());
    }

    #[tokio::test]
    async fn test_should_keep_entry_while_awaited() {
        let locks = Arc::new(PatronLocks::new());
        let guard = locks.lock(10).await;
        let other = locks.clone();
        let waiting = tokio::spawn(async move {
            let _guard = other.lock(10).await;
            other.len()
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        assert_eq!(1, waiting.await.expect("should acquire lock"));
        assert_eq!(0, locks.len());
    }

    #[tokio::test]
    async fn test_should_not_grow_with_many_patrons() {
        let locks = Arc::new(PatronLocks::new());
        for patron_id in 0..1000 {
            let _guard = locks.lock(patron_id).await;
        }
        assert_eq!(0, locks.len());
    }
}
