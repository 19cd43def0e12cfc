use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Could not decode payload '{payload}': {reason}")]
    Decode { payload: String, reason: String },

    #[error("Could not encode {subject}: {reason}")]
    Encode { subject: String, reason: String },

    #[error("Backend error on partition '{partition}': {message}")]
    Backend {
        partition: String,
        message: String,
        /// Raw caller payload echoed back when a fan-out write fails.
        payload: Option<String>,
    },

    #[error("Received unknown function {kind}: {name}")]
    UnknownFunction { kind: &'static str, name: String },

    #[error("Broker is not initialized; call 'init' with the partition identifiers first")]
    NotInitialized,

    #[error("Broker is already initialized")]
    AlreadyInitialized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State store error: {0}")]
    StateStore(String),
}

impl BrokerError {
    pub fn decode(payload: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            payload: payload.into(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(subject: impl Into<String>, reason: impl ToString) -> Self {
        Self::Encode {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }

    pub fn backend(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            partition: partition.into(),
            message: message.into(),
            payload: None,
        }
    }

    /// Attaches the caller's raw payload to a backend error.
    pub fn with_payload(self, raw: impl Into<String>) -> Self {
        match self {
            Self::Backend {
                partition, message, ..
            } => Self::Backend {
                partition,
                message,
                payload: Some(raw.into()),
            },
            other => other,
        }
    }

    /// Appends the underlying failure to a backend error's message.
    pub fn with_cause(self, cause: impl fmt::Display) -> Self {
        match self {
            Self::Backend {
                partition,
                message,
                payload,
            } => Self::Backend {
                partition,
                message: format!("{}: {}", message, cause),
                payload,
            },
            other => other,
        }
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Failure reported by a ledger collaborator for a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LedgerCallError {
    pub message: String,
}

impl LedgerCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps the call failure as a broker error against `partition`.
    pub fn into_broker(self, partition: &str) -> BrokerError {
        BrokerError::backend(partition, self.message)
    }
}
