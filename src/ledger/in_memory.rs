use super::{LedgerBackend, LedgerCallResult, not_found_payload};
use crate::core::{BrokerError, LedgerCallError, Result};
use crate::record::{Referral, decode_referral, encode_referral, encode_referrals};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCallKind {
    Query,
    Invoke,
}

/// One call observed by [`InMemoryLedgerBackend`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub partition_id: String,
    pub kind: LedgerCallKind,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryPartition {
    records: BTreeMap<String, Vec<u8>>,
    offline: bool,
    fail_invokes: bool,
    scripted_invoke: Option<Vec<u8>>,
}

/// A set of domain ledgers held in process, for tests and local tooling.
///
/// Each registered partition answers with the referral-ledger protocol:
/// - `query([key, ..])` returns the stored record or a not-found payload.
/// - `invoke([key, referral_json])` stores the referral.
/// - `invoke([key, status])` sets the status of an existing referral.
/// - `invoke([status])` lists referrals with that status, ordered by id.
#[derive(Clone, Default)]
pub struct InMemoryLedgerBackend {
    partitions: Arc<Mutex<HashMap<String, InMemoryPartition>>>,
    journal: Arc<Mutex<Vec<LedgerCall>>>,
}

impl InMemoryLedgerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given partitions already registered.
    pub async fn with_partitions<I, S>(partition_ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for partition_id in partition_ids {
            backend.register_partition(partition_id).await?;
        }
        Ok(backend)
    }

    pub async fn register_partition(&self, partition_id: impl Into<String>) -> Result<()> {
        let partition_id = partition_id.into();
        if partition_id.trim().is_empty() {
            return Err(BrokerError::Config(
                "partition_id must not be empty".to_string(),
            ));
        }
        let mut partitions = self.partitions.lock().await;
        partitions.entry(partition_id).or_default();
        Ok(())
    }

    /// Stores `referral` directly, bypassing the call journal.
    pub async fn seed(&self, partition_id: &str, referral: &Referral) -> Result<()> {
        let bytes = encode_referral(referral)?;
        self.with_partition(partition_id, |partition| {
            partition
                .records
                .insert(referral.referral_id.clone(), bytes);
        })
        .await
    }

    /// Makes every call against the partition fail.
    pub async fn set_offline(&self, partition_id: &str, offline: bool) -> Result<()> {
        self.with_partition(partition_id, |partition| partition.offline = offline)
            .await
    }

    /// Makes write-style calls against the partition fail while reads keep working.
    pub async fn set_fail_invokes(&self, partition_id: &str, fail: bool) -> Result<()> {
        self.with_partition(partition_id, |partition| partition.fail_invokes = fail)
            .await
    }

    /// Answers every `invoke` on the partition with `response` and leaves state untouched.
    pub async fn script_invoke_response(
        &self,
        partition_id: &str,
        response: Option<Vec<u8>>,
    ) -> Result<()> {
        self.with_partition(partition_id, |partition| {
            partition.scripted_invoke = response
        })
        .await
    }

    pub async fn stored(&self, partition_id: &str, key: &str) -> Option<Referral> {
        let partitions = self.partitions.lock().await;
        let bytes = partitions.get(partition_id)?.records.get(key)?;
        decode_referral(bytes).ok()
    }

    pub async fn record_count(&self, partition_id: &str) -> usize {
        let partitions = self.partitions.lock().await;
        partitions
            .get(partition_id)
            .map(|partition| partition.records.len())
            .unwrap_or_default()
    }

    pub async fn calls(&self) -> Vec<LedgerCall> {
        self.journal.lock().await.clone()
    }

    async fn with_partition<F>(&self, partition_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut InMemoryPartition),
    {
        let mut partitions = self.partitions.lock().await;
        let partition = partitions.get_mut(partition_id).ok_or_else(|| {
            BrokerError::Config(format!(
                "Ledger partition '{}' is not registered",
                partition_id
            ))
        })?;
        apply(partition);
        Ok(())
    }

    async fn record_call(&self, partition_id: &str, kind: LedgerCallKind, args: &[String]) {
        self.journal.lock().await.push(LedgerCall {
            partition_id: partition_id.to_string(),
            kind,
            args: args.to_vec(),
        });
    }

    fn unreachable(partition_id: &str) -> LedgerCallError {
        LedgerCallError::new(format!("ledger partition '{}' is unreachable", partition_id))
    }

    fn search_by_status(partition: &InMemoryPartition, status: &str) -> LedgerCallResult {
        let matching = partition
            .records
            .values()
            .filter_map(|bytes| decode_referral(bytes).ok())
            .filter(|referral| referral.status == status)
            .collect::<Vec<_>>();
        encode_referrals(&matching).map_err(|err| LedgerCallError::new(err.to_string()))
    }

    fn update_status(partition: &mut InMemoryPartition, key: &str, status: &str) -> LedgerCallResult {
        let bytes = partition
            .records
            .get(key)
            .ok_or_else(|| LedgerCallError::new(format!("no referral stored under '{}'", key)))?;
        let mut referral =
            decode_referral(bytes).map_err(|err| LedgerCallError::new(err.to_string()))?;
        referral.status = status.to_string();
        let updated =
            encode_referral(&referral).map_err(|err| LedgerCallError::new(err.to_string()))?;
        partition.records.insert(key.to_string(), updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl LedgerBackend for InMemoryLedgerBackend {
    async fn query(&self, partition_id: &str, args: &[String]) -> LedgerCallResult {
        self.record_call(partition_id, LedgerCallKind::Query, args)
            .await;
        let partitions = self.partitions.lock().await;
        let partition = partitions
            .get(partition_id)
            .ok_or_else(|| Self::unreachable(partition_id))?;
        if partition.offline {
            return Err(Self::unreachable(partition_id));
        }

        let key = args
            .first()
            .ok_or_else(|| LedgerCallError::new("Expecting name of the key to query"))?;
        Ok(partition
            .records
            .get(key)
            .cloned()
            .unwrap_or_else(|| not_found_payload(key)))
    }

    async fn invoke(&self, partition_id: &str, args: &[String]) -> LedgerCallResult {
        self.record_call(partition_id, LedgerCallKind::Invoke, args)
            .await;
        let mut partitions = self.partitions.lock().await;
        let partition = partitions
            .get_mut(partition_id)
            .ok_or_else(|| Self::unreachable(partition_id))?;
        if partition.offline {
            return Err(Self::unreachable(partition_id));
        }
        if partition.fail_invokes {
            return Err(LedgerCallError::new(format!(
                "ledger partition '{}' rejected the write",
                partition_id
            )));
        }
        if let Some(scripted) = partition.scripted_invoke.as_ref() {
            return Ok(scripted.clone());
        }

        match args {
            [status] => Self::search_by_status(partition, status),
            [key, value] => match decode_referral(value.as_bytes()) {
                Ok(_) => {
                    let bytes = value.as_bytes().to_vec();
                    partition.records.insert(key.clone(), bytes.clone());
                    Ok(bytes)
                }
                Err(_) => Self::update_status(partition, key, value),
            },
            _ => Err(LedgerCallError::new(format!(
                "Incorrect number of arguments: {}",
                args.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NOT_FOUND_MARKER;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn query_misses_return_not_found_marker() {
        let backend = InMemoryLedgerBackend::with_partitions(["retail"]).await.unwrap();
        let bytes = backend.query("retail", &args(&["R1"])).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(NOT_FOUND_MARKER));
        assert!(text.ends_with("R1"));
    }

    #[tokio::test]
    async fn invoke_stores_then_updates_status() {
        let backend = InMemoryLedgerBackend::with_partitions(["retail"]).await.unwrap();
        let payload = String::from_utf8(
            encode_referral(&Referral::new("R1").with_status("OPEN")).unwrap(),
        )
        .unwrap();
        backend
            .invoke("retail", &[String::from("R1"), payload])
            .await
            .unwrap();

        backend
            .invoke("retail", &args(&["R1", "CLOSED"]))
            .await
            .unwrap();
        let stored = backend.stored("retail", "R1").await.unwrap();
        assert_eq!(stored.status, "CLOSED");

        let err = backend
            .invoke("retail", &args(&["R2", "CLOSED"]))
            .await
            .unwrap_err();
        assert!(err.message.contains("R2"));
    }

    #[tokio::test]
    async fn single_argument_invoke_searches_by_status() {
        let backend = InMemoryLedgerBackend::with_partitions(["retail"]).await.unwrap();
        backend
            .seed("retail", &Referral::new("R2").with_status("OPEN"))
            .await
            .unwrap();
        backend
            .seed("retail", &Referral::new("R1").with_status("OPEN"))
            .await
            .unwrap();
        backend
            .seed("retail", &Referral::new("R3").with_status("CLOSED"))
            .await
            .unwrap();

        let bytes = backend.invoke("retail", &args(&["OPEN"])).await.unwrap();
        let found = crate::record::decode_referrals(&bytes).unwrap();
        let ids: Vec<&str> = found.iter().map(|r| r.referral_id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R2"]);
    }

    #[tokio::test]
    async fn offline_and_unregistered_partitions_fail() {
        let backend = InMemoryLedgerBackend::with_partitions(["retail"]).await.unwrap();
        backend.set_offline("retail", true).await.unwrap();
        assert!(backend.query("retail", &args(&["R1"])).await.is_err());
        assert!(backend.query("banking", &args(&["R1"])).await.is_err());
        assert!(backend.set_offline("banking", true).await.is_err());
        assert_eq!(backend.calls().await.len(), 2);
    }
}
