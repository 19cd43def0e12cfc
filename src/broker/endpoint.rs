use super::config::{BrokerConfig, PartitionConfig, RoutingOptions};
use super::dispatch::{InvokeFunction, QueryFunction};
use super::referral_broker::ReferralBroker;
use crate::core::{BrokerError, Result};
use crate::ledger::LedgerBackend;
use std::sync::{Arc, OnceLock};
use tracing::{Level, event};

/// The broker's own call surface: `invoke(function, args)` and
/// `query(function, args)`.
///
/// The partition identifiers arrive through the `init` invocation and are
/// fixed from then on.
pub struct BrokerEndpoint {
    backend: Arc<dyn LedgerBackend>,
    options: RoutingOptions,
    broker: OnceLock<ReferralBroker>,
}

impl BrokerEndpoint {
    /// Creates an endpoint that waits for `init`.
    pub fn new(backend: Arc<dyn LedgerBackend>) -> Self {
        Self::with_options(backend, RoutingOptions::default())
    }

    pub fn with_options(backend: Arc<dyn LedgerBackend>, options: RoutingOptions) -> Self {
        Self {
            backend,
            options,
            broker: OnceLock::new(),
        }
    }

    /// Creates an endpoint that is already initialized from `config`.
    pub fn from_config(backend: Arc<dyn LedgerBackend>, config: BrokerConfig) -> Result<Self> {
        let endpoint = Self::with_options(backend.clone(), config.options.clone());
        let broker = ReferralBroker::new(config, backend)?;
        endpoint
            .broker
            .set(broker)
            .map_err(|_| BrokerError::AlreadyInitialized)?;
        Ok(endpoint)
    }

    pub fn is_initialized(&self) -> bool {
        self.broker.get().is_some()
    }

    pub fn broker(&self) -> Result<&ReferralBroker> {
        self.broker.get().ok_or(BrokerError::NotInitialized)
    }

    /// Sets the partition identifiers: `[retail, commercial, banking]`.
    pub fn init(&self, args: &[String]) -> Result<()> {
        if self.is_initialized() {
            return Err(BrokerError::AlreadyInitialized);
        }
        let partitions = PartitionConfig::from_init_args(args)?;
        let config = BrokerConfig::with_options(partitions, self.options.clone());
        let broker = ReferralBroker::new(config, self.backend.clone())?;
        self.broker
            .set(broker)
            .map_err(|_| BrokerError::AlreadyInitialized)?;
        event!(
            Level::INFO,
            retail = %args[0],
            commercial = %args[1],
            banking = %args[2],
            "broker initialized"
        );
        Ok(())
    }

    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let function = InvokeFunction::from_name(function).inspect_err(|err| {
            event!(Level::WARN, error = %err, "invoke did not find function");
        })?;
        event!(Level::DEBUG, function = function.name(), "invoke is running");

        match function {
            InvokeFunction::Init => self.init(args).map(|()| Vec::new()),
            InvokeFunction::CreateReferral => self.broker()?.create(args).await,
            InvokeFunction::UpdateReferralStatus => Ok(self
                .broker()?
                .update_status(args)
                .await?
                .unwrap_or_default()),
        }
    }

    pub async fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let function = QueryFunction::from_name(function).inspect_err(|err| {
            event!(Level::WARN, error = %err, "query did not find function");
        })?;
        event!(Level::DEBUG, function = function.name(), "query is running");

        let broker = self.broker()?;
        match function {
            QueryFunction::Read => broker.read(args).await,
            QueryFunction::SearchByStatus => broker.search_by_attribute(args).await,
            QueryFunction::SearchByPartner => broker.search_by_partition(args).await,
        }
    }
}
