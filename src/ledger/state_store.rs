use crate::core::{BrokerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key/value state local to the broker's own ledger.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_state(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(BrokerError::StateStore("key must not be empty".to_string()));
        }
        self.entries.write().await.insert(key, value.into());
        Ok(())
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

/// Reads each key of a comma-delimited list and joins the stored values
/// into a JSON array text. Missing keys contribute nothing.
pub async fn batch_read(store: &dyn StateStore, delimited_keys: &str) -> Result<Vec<u8>> {
    let mut joined = Vec::from(&b"["[..]);
    let mut first = true;
    for key in delimited_keys.split(',') {
        let Some(value) = store.get_state(key).await? else {
            continue;
        };
        if !first {
            joined.push(b',');
        }
        joined.extend_from_slice(&value);
        first = false;
    }
    joined.push(b']');
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl StateStore for BrokenStore {
        async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Err(BrokerError::StateStore(format!("cannot read '{key}'")))
        }
    }

    #[tokio::test]
    async fn batch_read_joins_values_in_key_order() {
        let store = InMemoryStateStore::new();
        store.put_state("R1", br#"{"referralId":"R1"}"#.to_vec()).await.unwrap();
        store.put_state("R2", br#"{"referralId":"R2"}"#.to_vec()).await.unwrap();

        let joined = batch_read(&store, "R2,missing,R1").await.unwrap();
        assert_eq!(
            String::from_utf8(joined).unwrap(),
            r#"[{"referralId":"R2"},{"referralId":"R1"}]"#
        );
    }

    #[tokio::test]
    async fn batch_read_of_nothing_is_an_empty_array() {
        let store = InMemoryStateStore::new();
        assert_eq!(batch_read(&store, "a,b").await.unwrap(), b"[]".to_vec());
    }

    #[tokio::test]
    async fn batch_read_stops_on_store_error() {
        let err = batch_read(&BrokenStore, "R1").await.unwrap_err();
        assert!(matches!(err, BrokerError::StateStore(_)));
    }
}
