use super::config::ProbePolicy;
use super::partition::Partition;
use crate::core::{BrokerError, Result};
use crate::ledger::LedgerBackend;
use std::sync::Arc;
use tracing::{Level, event};

/// Locates the partition that currently holds a key by probing each
/// partition in priority order.
pub struct PartitionResolver {
    backend: Arc<dyn LedgerBackend>,
    partitions: Vec<Partition>,
    policy: ProbePolicy,
    not_found_marker: String,
}

impl PartitionResolver {
    pub fn new(
        backend: Arc<dyn LedgerBackend>,
        mut partitions: Vec<Partition>,
        policy: ProbePolicy,
        not_found_marker: impl Into<String>,
    ) -> Self {
        partitions.sort_by_key(Partition::priority);
        Self {
            backend,
            partitions,
            policy,
            not_found_marker: not_found_marker.into(),
        }
    }

    pub fn policy(&self) -> ProbePolicy {
        self.policy
    }

    /// Partitions in the order they are probed.
    pub fn probe_order(&self) -> &[Partition] {
        &self.partitions
    }

    /// A probe hits when the answer is non-empty and is not a miss sentinel.
    pub fn is_hit(&self, response: &[u8]) -> bool {
        !response.is_empty()
            && !String::from_utf8_lossy(response).contains(self.not_found_marker.as_str())
    }

    /// Returns the first partition whose read of `args` hits.
    ///
    /// Under [`ProbePolicy::ContinueOnError`] a failing probe is skipped and
    /// only the final probe's failure is reported, and only when no
    /// partition answered with a hit.
    pub async fn resolve(&self, args: &[String]) -> Result<Option<Partition>> {
        let mut last_error: Option<BrokerError> = None;

        for partition in &self.partitions {
            match self.backend.query(&partition.id, args).await {
                Ok(response) if self.is_hit(&response) => {
                    event!(Level::DEBUG, partition = %partition.id, "probe hit");
                    return Ok(Some(partition.clone()));
                }
                Ok(_) => {
                    event!(Level::DEBUG, partition = %partition.id, "probe miss");
                    last_error = None;
                }
                Err(err) => {
                    let err = err.into_broker(&partition.id);
                    match self.policy {
                        ProbePolicy::FailFast => return Err(err),
                        ProbePolicy::ContinueOnError => {
                            event!(
                                Level::WARN,
                                partition = %partition.id,
                                error = %err,
                                "probe failed, continuing with next partition"
                            );
                            last_error = Some(err);
                        }
                    }
                }
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}
