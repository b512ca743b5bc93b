use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutexes serializing multi-step read-modify-write sequences
/// per aggregate (user, session, task).
///
/// Callers that take more than one lock must acquire them in a fixed order
/// (session before user, task before user) so two flows can never wait on
/// each other.
#[derive(Clone, Default)]
pub struct AggregateLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AggregateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}
