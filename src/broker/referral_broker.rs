use super::config::{BrokerConfig, SearchCall};
use super::merger::ResultMerger;
use super::partition::Partition;
use super::resolver::PartitionResolver;
use super::router::DepartmentRouter;
use crate::core::{BrokerError, Result};
use crate::ledger::{LedgerBackend, LedgerCallResult};
use crate::record::{Referral, decode_referral, decode_referrals, encode_referrals};
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

fn failed_state_message(key: &str) -> String {
    format!("{{\"Error\":\"Failed to get state for {}\"}}", key)
}

/// Routes referral operations across the retail, commercial and banking ledgers.
///
/// Holds no state between calls beyond its configuration.
pub struct ReferralBroker {
    config: BrokerConfig,
    backend: Arc<dyn LedgerBackend>,
    resolver: PartitionResolver,
    router: DepartmentRouter,
}

impl ReferralBroker {
    pub fn new(config: BrokerConfig, backend: Arc<dyn LedgerBackend>) -> Result<Self> {
        config.validate()?;
        let resolver = PartitionResolver::new(
            backend.clone(),
            config.partitions.partitions(),
            config.options.probe_policy,
            config.options.not_found_marker.clone(),
        );
        let router = DepartmentRouter::new(backend.clone(), config.partitions.clone());
        Ok(Self {
            config,
            backend,
            resolver,
            router,
        })
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PartitionResolver {
        &self.resolver
    }

    /// `[key, referral_json]`: writes the referral to every partition its
    /// department tags name.
    pub async fn create(&self, args: &[String]) -> Result<Vec<u8>> {
        let span = info_span!("broker.create", args = args.len());
        async move {
            let [_, referral_data] = args else {
                return Err(BrokerError::Argument(
                    "Incorrect number of arguments. Expecting 2 parameters, name of the key and value to set"
                        .to_string(),
                ));
            };
            let referral = decode_referral(referral_data.as_bytes())?;
            event!(
                Level::DEBUG,
                referral_id = %referral.referral_id,
                departments = ?referral.departments,
                "routing referral create"
            );
            self.router.route_create(&referral, args).await
        }
        .instrument(span)
        .await
    }

    /// Forwards a status update to whichever partition currently holds the key.
    ///
    /// Returns `None` without writing anything when no partition holds it.
    pub async fn update_status(&self, args: &[String]) -> Result<Option<Vec<u8>>> {
        let span = info_span!("broker.update_status", args = args.len());
        async move {
            let Some(key) = args.first() else {
                return Err(BrokerError::Argument(
                    "Incorrect number of arguments. Expecting the referral key first".to_string(),
                ));
            };
            let Some(partition) = self.resolver.resolve(args).await? else {
                // Callers get no bytes rather than a not-found signal here.
                event!(Level::WARN, key = %key, "status update skipped: no partition holds key");
                return Ok(None);
            };
            let response = self
                .backend
                .invoke(&partition.id, args)
                .await
                .map_err(|err| err.into_broker(&partition.id))?;
            Ok(Some(response))
        }
        .instrument(span)
        .await
    }

    /// `[key]`: reads the referral from the partition that holds it.
    ///
    /// A key held nowhere yields the not-found payload, not an error.
    pub async fn read(&self, args: &[String]) -> Result<Vec<u8>> {
        let span = info_span!("broker.read", args = args.len());
        async move {
            let [key] = args else {
                return Err(BrokerError::Argument(
                    "Incorrect number of arguments. Expecting name of the key to query"
                        .to_string(),
                ));
            };
            let Some(partition) = self.resolver.resolve(args).await? else {
                return Ok(self.not_found_payload(key));
            };
            let response = self
                .backend
                .query(&partition.id, args)
                .await
                .map_err(|err| {
                    BrokerError::backend(&partition.id, failed_state_message(key)).with_cause(err)
                })?;
            if response.is_empty() {
                return Ok(self.not_found_payload(key));
            }
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Searches every partition and returns the merged matches.
    ///
    /// Any partition failing to answer or to decode fails the whole search.
    pub async fn search_referrals(&self, args: &[String]) -> Result<Vec<Referral>> {
        let span = info_span!(
            "broker.search",
            args = args.len(),
            call = ?self.config.options.search_call
        );
        async move {
            let Some(attribute) = args.first() else {
                return Err(BrokerError::Argument(
                    "Incorrect number of arguments. Expecting the attribute value to search for"
                        .to_string(),
                ));
            };

            let mut results_by_partition = Vec::with_capacity(3);
            for partition in self.config.partitions.partitions() {
                let response = self
                    .search_call(&partition, args)
                    .await
                    .map_err(|err| {
                        BrokerError::backend(&partition.id, failed_state_message(attribute))
                            .with_cause(err)
                    })?;
                let referrals = decode_referrals(&response).map_err(|err| {
                    event!(
                        Level::ERROR,
                        partition = %partition.id,
                        error = %err,
                        "search answer undecodable"
                    );
                    let reason = match err {
                        BrokerError::Decode { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    BrokerError::decode(
                        String::from_utf8_lossy(&response),
                        format!(
                            "Failed to get state for {} from partition '{}': {}",
                            attribute, partition.id, reason
                        ),
                    )
                })?;
                event!(
                    Level::DEBUG,
                    partition = %partition.id,
                    matches = referrals.len(),
                    "search answer decoded"
                );
                results_by_partition.push(referrals);
            }

            Ok(ResultMerger::merge(results_by_partition))
        }
        .instrument(span)
        .await
    }

    /// [`search_referrals`](Self::search_referrals) encoded for the wire.
    pub async fn search_by_attribute(&self, args: &[String]) -> Result<Vec<u8>> {
        let merged = self.search_referrals(args).await?;
        encode_referrals(&merged)
    }

    /// `[partition_id, ..]`: relays one partition's read answer verbatim.
    pub async fn search_by_partition(&self, args: &[String]) -> Result<Vec<u8>> {
        let Some(partition_id) = args.first() else {
            return Err(BrokerError::Argument(
                "Incorrect number of arguments. Expecting the partition identifier".to_string(),
            ));
        };
        self.backend
            .query(partition_id, args)
            .instrument(info_span!("broker.search_by_partition", partition = %partition_id))
            .await
            .map_err(|err| {
                BrokerError::backend(partition_id, failed_state_message(partition_id)).with_cause(err)
            })
    }

    async fn search_call(&self, partition: &Partition, args: &[String]) -> LedgerCallResult {
        match self.config.options.search_call {
            SearchCall::Invoke => self.backend.invoke(&partition.id, args).await,
            SearchCall::Query => self.backend.query(&partition.id, args).await,
        }
    }

    fn not_found_payload(&self, key: &str) -> Vec<u8> {
        format!("{} for key: {}", self.config.options.not_found_marker, key).into_bytes()
    }
}
