use crate::core::{BrokerError, Result};

/// Write-style functions the broker accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeFunction {
    Init,
    CreateReferral,
    UpdateReferralStatus,
}

/// Read-style functions the broker accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFunction {
    Read,
    SearchByStatus,
    SearchByPartner,
}

const INVOKE_FUNCTIONS: &[(&str, InvokeFunction)] = &[
    ("init", InvokeFunction::Init),
    ("createReferral", InvokeFunction::CreateReferral),
    ("updateReferralStatus", InvokeFunction::UpdateReferralStatus),
];

const QUERY_FUNCTIONS: &[(&str, QueryFunction)] = &[
    ("read", QueryFunction::Read),
    ("searchByStatus", QueryFunction::SearchByStatus),
    ("searchByPartner", QueryFunction::SearchByPartner),
];

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, function)| *function)
}

fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], function: T) -> &'static str {
    table
        .iter()
        .find(|(_, candidate)| *candidate == function)
        .map(|(name, _)| *name)
        .unwrap_or_default()
}

impl InvokeFunction {
    pub fn from_name(name: &str) -> Result<Self> {
        lookup(INVOKE_FUNCTIONS, name).ok_or_else(|| BrokerError::UnknownFunction {
            kind: "invocation",
            name: name.to_string(),
        })
    }

    pub fn name(self) -> &'static str {
        name_of(INVOKE_FUNCTIONS, self)
    }
}

impl QueryFunction {
    pub fn from_name(name: &str) -> Result<Self> {
        lookup(QUERY_FUNCTIONS, name).ok_or_else(|| BrokerError::UnknownFunction {
            kind: "query",
            name: name.to_string(),
        })
    }

    pub fn name(self) -> &'static str {
        name_of(QUERY_FUNCTIONS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_function_name_round_trips() {
        for (name, function) in INVOKE_FUNCTIONS {
            assert_eq!(InvokeFunction::from_name(name).unwrap(), *function);
            assert_eq!(function.name(), *name);
        }
        for (name, function) in QUERY_FUNCTIONS {
            assert_eq!(QueryFunction::from_name(name).unwrap(), *function);
            assert_eq!(function.name(), *name);
        }
    }

    #[test]
    fn names_are_case_sensitive_and_shape_specific() {
        assert!(InvokeFunction::from_name("CreateReferral").is_err());
        assert!(InvokeFunction::from_name("read").is_err());
        let err = QueryFunction::from_name("createReferral").unwrap_err();
        assert_eq!(
            err,
            BrokerError::UnknownFunction {
                kind: "query",
                name: "createReferral".to_string(),
            }
        );
    }
}
