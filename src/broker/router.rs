use super::config::PartitionConfig;
use crate::core::Result;
use crate::ledger::LedgerBackend;
use crate::record::{Department, Referral};
use std::sync::Arc;
use tracing::{Level, event};

/// Fans a create out to every partition named by a referral's department tags.
pub struct DepartmentRouter {
    backend: Arc<dyn LedgerBackend>,
    partitions: PartitionConfig,
}

impl DepartmentRouter {
    pub fn new(backend: Arc<dyn LedgerBackend>, partitions: PartitionConfig) -> Self {
        Self {
            backend,
            partitions,
        }
    }

    /// Replays `raw_args` verbatim to each tagged partition, in tag order.
    ///
    /// Stops at the first failing write; earlier writes stay committed.
    /// Returns the bytes of the last successful write, or empty bytes when
    /// no tag was recognized.
    pub async fn route_create(&self, referral: &Referral, raw_args: &[String]) -> Result<Vec<u8>> {
        let raw_payload = raw_args.last().map(String::as_str).unwrap_or_default();
        let mut written: Vec<Department> = Vec::new();
        let mut last_response = Vec::new();

        for tag in referral
            .departments
            .iter()
            .filter(|tag| Department::from_tag(tag).is_none())
        {
            event!(Level::DEBUG, tag = %tag, "skipping unrecognized department tag");
        }

        for department in referral.known_departments() {
            if written.contains(&department) {
                continue;
            }

            let partition_id = self.partitions.partition_id(department);
            match self.backend.invoke(partition_id, raw_args).await {
                Ok(response) => {
                    event!(Level::DEBUG, partition = %partition_id, "department write committed");
                    written.push(department);
                    last_response = response;
                }
                Err(err) => {
                    event!(
                        Level::ERROR,
                        partition = %partition_id,
                        committed = ?written,
                        error = %err,
                        "department fan-out aborted"
                    );
                    return Err(err
                        .into_broker(partition_id)
                        .with_payload(raw_payload));
                }
            }
        }

        if written.is_empty() {
            event!(
                Level::WARN,
                referral_id = %referral.referral_id,
                "referral carries no recognized department; nothing written"
            );
        }
        Ok(last_response)
    }
}
