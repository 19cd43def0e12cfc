use super::partition::Partition;
use crate::core::{BrokerError, Result};
use crate::ledger::NOT_FOUND_MARKER;
use crate::record::Department;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Identifiers of the three domain ledgers.
///
/// Built once at startup; the broker never mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub retail: String,
    pub commercial: String,
    pub banking: String,
}

impl PartitionConfig {
    pub fn new(
        retail: impl Into<String>,
        commercial: impl Into<String>,
        banking: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            retail: retail.into(),
            commercial: commercial.into(),
            banking: banking.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from `init` arguments: retail, commercial, banking.
    pub fn from_init_args(args: &[String]) -> Result<Self> {
        match args {
            [retail, commercial, banking] => Self::new(retail, commercial, banking),
            _ => Err(BrokerError::Argument(format!(
                "Incorrect number of arguments. Expecting 3 partition identifiers (retail, commercial, banking), got {}",
                args.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for department in Department::ALL {
            let id = self.partition_id(department);
            if id.trim().is_empty() {
                return Err(BrokerError::Config(format!(
                    "{} partition identifier must not be empty",
                    department
                )));
            }
            if !seen.insert(id) {
                return Err(BrokerError::Config(format!(
                    "Partition identifier '{}' is configured more than once",
                    id
                )));
            }
        }
        Ok(())
    }

    pub fn partition_id(&self, department: Department) -> &str {
        match department {
            Department::Retail => &self.retail,
            Department::Commercial => &self.commercial,
            Department::Banking => &self.banking,
        }
    }

    pub fn partition(&self, department: Department) -> Partition {
        Partition::new(department, self.partition_id(department))
    }

    /// All partitions in probe priority order.
    pub fn partitions(&self) -> Vec<Partition> {
        Department::ALL
            .into_iter()
            .map(|department| self.partition(department))
            .collect()
    }
}

/// What the resolver does when a probe call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbePolicy {
    /// Skip the failing partition. The error surfaces only when nothing is
    /// found and the last probe failed.
    #[default]
    ContinueOnError,
    /// Surface the first probe failure.
    FailFast,
}

/// Which ledger call carries attribute searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCall {
    /// Deployed partitions answer a single-argument `invoke` with matching records.
    #[default]
    Invoke,
    Query,
}

fn default_not_found_marker() -> String {
    NOT_FOUND_MARKER.to_string()
}

/// Routing behavior shared by every partition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingOptions {
    #[serde(default)]
    pub probe_policy: ProbePolicy,
    #[serde(default)]
    pub search_call: SearchCall,
    #[serde(default = "default_not_found_marker")]
    pub not_found_marker: String,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            probe_policy: ProbePolicy::default(),
            search_call: SearchCall::default(),
            not_found_marker: default_not_found_marker(),
        }
    }
}

/// Broker configuration.
///
/// Loadable from JSON:
///
/// ```json
/// {
///   "partitions": { "retail": "retail_cc", "commercial": "commercial_cc", "banking": "banking_cc" },
///   "probe_policy": "continue_on_error",
///   "search_call": "invoke"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub partitions: PartitionConfig,
    #[serde(flatten)]
    pub options: RoutingOptions,
}

impl BrokerConfig {
    pub fn new(partitions: PartitionConfig) -> Self {
        Self {
            partitions,
            options: RoutingOptions::default(),
        }
    }

    pub fn with_options(partitions: PartitionConfig, options: RoutingOptions) -> Self {
        Self {
            partitions,
            options,
        }
    }

    /// Set the probe failure policy
    pub fn probe_policy(mut self, policy: ProbePolicy) -> Self {
        self.options.probe_policy = policy;
        self
    }

    /// Set the ledger call used for attribute searches
    pub fn search_call(mut self, call: SearchCall) -> Self {
        self.options.search_call = call;
        self
    }

    /// Set the sentinel text that marks a ledger miss
    pub fn not_found_marker(mut self, marker: impl Into<String>) -> Self {
        self.options.not_found_marker = marker.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| BrokerError::Config(format!("Invalid broker config: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            BrokerError::Config(format!("Cannot read '{}': {}", path.display(), err))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.partitions.validate()?;
        if self.options.not_found_marker.trim().is_empty() {
            return Err(BrokerError::Config(
                "not_found_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn init_args_need_exactly_three_identifiers() {
        let config = PartitionConfig::from_init_args(&args(&["r", "c", "b"])).unwrap();
        assert_eq!(config.partition_id(Department::Commercial), "c");

        let err = PartitionConfig::from_init_args(&args(&["r", "c"])).unwrap_err();
        assert!(matches!(err, BrokerError::Argument(_)));
        assert!(PartitionConfig::from_init_args(&args(&["r", "c", "b", "x"])).is_err());
    }

    #[test]
    fn blank_or_duplicate_identifiers_are_rejected() {
        assert!(matches!(
            PartitionConfig::new("r", " ", "b"),
            Err(BrokerError::Config(_))
        ));
        assert!(matches!(
            PartitionConfig::new("r", "c", "r"),
            Err(BrokerError::Config(_))
        ));
    }

    #[test]
    fn partitions_follow_probe_priority() {
        let config = PartitionConfig::new("r", "c", "b").unwrap();
        let ids: Vec<String> = config.partitions().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["r", "c", "b"]);
        assert_eq!(config.partition(Department::Banking).id, "b");
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = BrokerConfig::new(PartitionConfig::new("r", "c", "b").unwrap())
            .probe_policy(ProbePolicy::FailFast)
            .search_call(SearchCall::Query)
            .not_found_marker("missing");
        assert_eq!(config.options.probe_policy, ProbePolicy::FailFast);
        assert_eq!(config.options.search_call, SearchCall::Query);
        assert_eq!(config.options.not_found_marker, "missing");
        assert!(config.validate().is_ok());
        assert!(config.not_found_marker("  ").validate().is_err());
    }

    #[test]
    fn json_config_fills_defaults() {
        let config = BrokerConfig::from_json_str(
            r#"{"partitions":{"retail":"r","commercial":"c","banking":"b"}}"#,
        )
        .unwrap();
        assert_eq!(config.options, RoutingOptions::default());

        let config = BrokerConfig::from_json_str(
            r#"{"partitions":{"retail":"r","commercial":"c","banking":"b"},"probe_policy":"fail_fast","search_call":"query"}"#,
        )
        .unwrap();
        assert_eq!(config.options.probe_policy, ProbePolicy::FailFast);
        assert_eq!(config.options.search_call, SearchCall::Query);
    }

    #[test]
    fn json_config_requires_all_partitions() {
        let err = BrokerConfig::from_json_str(r#"{"partitions":{"retail":"r","banking":"b"}}"#)
            .unwrap_err();
        assert!(matches!(err, BrokerError::Config(_)));
    }

    #[test]
    fn json_config_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"partitions":{{"retail":"r","commercial":"c","banking":"b"}}}}"#
        )
        .unwrap();
        let config = BrokerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.partitions.retail, "r");

        assert!(BrokerConfig::from_json_file("/definitely/not/here.json").is_err());
    }
}
