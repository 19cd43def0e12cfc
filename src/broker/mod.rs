// Referral routing is split by responsibility: where a key lives, where a
// create goes, and how search answers combine.
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod merger;
pub mod partition;
pub mod referral_broker;
pub mod resolver;
pub mod router;

pub use config::{BrokerConfig, PartitionConfig, ProbePolicy, RoutingOptions, SearchCall};
pub use dispatch::{InvokeFunction, QueryFunction};
pub use endpoint::BrokerEndpoint;
pub use merger::ResultMerger;
pub use partition::Partition;
pub use referral_broker::ReferralBroker;
pub use resolver::PartitionResolver;
pub use router::DepartmentRouter;
