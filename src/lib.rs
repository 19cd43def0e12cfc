// ============================================================================
// Referral Broker Library
// ============================================================================

pub mod broker;
pub mod core;
pub mod ledger;
pub mod record;

// Re-export main types for convenience
pub use broker::{
    BrokerConfig, BrokerEndpoint, DepartmentRouter, InvokeFunction, Partition, PartitionConfig,
    PartitionResolver, ProbePolicy, QueryFunction, ReferralBroker, ResultMerger, RoutingOptions,
    SearchCall,
};
pub use crate::core::{BrokerError, LedgerCallError, Result};
pub use ledger::{
    InMemoryLedgerBackend, InMemoryStateStore, LedgerBackend, LedgerCall, LedgerCallKind,
    NOT_FOUND_MARKER, StateStore, batch_read, not_found_payload,
};
pub use record::{Department, Identified, Mortgage, Referral};

// ============================================================================
// Quick start
// ============================================================================

/// Connects an endpoint to in-process ledgers and initializes it.
///
/// # Examples
///
/// ```
/// use referral_broker::{Referral, connect_in_memory, record::encode_referral};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (endpoint, _ledgers) = connect_in_memory("retail_cc", "commercial_cc", "banking_cc").await?;
///
/// let referral = Referral::new("R1").with_departments(["RETAIL"]).with_status("OPEN");
/// let payload = String::from_utf8(encode_referral(&referral)?)?;
/// endpoint.invoke("createReferral", &["R1".to_string(), payload]).await?;
///
/// let found = endpoint.query("read", &["R1".to_string()]).await?;
/// assert!(!found.is_empty());
/// # Ok(())
/// # }
/// ```
pub async fn connect_in_memory(
    retail: &str,
    commercial: &str,
    banking: &str,
) -> Result<(BrokerEndpoint, InMemoryLedgerBackend)> {
    let ledgers = InMemoryLedgerBackend::with_partitions([retail, commercial, banking]).await?;
    let endpoint = BrokerEndpoint::new(std::sync::Arc::new(ledgers.clone()));
    endpoint.init(&[
        retail.to_string(),
        commercial.to_string(),
        banking.to_string(),
    ])?;
    Ok((endpoint, ledgers))
}
