//! Referral records exchanged with the domain ledgers.
//!
//! Field names must match the deployed partitions byte-for-byte.

pub mod codec;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use codec::{decode_referral, decode_referrals, encode_referral, encode_referrals};

/// A department tag, and the domain ledger that stores records carrying it.
///
/// Variants are declared in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Department {
    Retail,
    Commercial,
    Banking,
}

impl Department {
    /// All departments in probe priority order.
    pub const ALL: [Department; 3] = [Self::Retail, Self::Commercial, Self::Banking];

    /// The literal tag used inside referral payloads.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Retail => "RETAIL",
            Self::Commercial => "COMMERCIAL",
            Self::Banking => "BANKING",
        }
    }

    /// Case-sensitive match against the three known tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|department| department.tag() == tag)
    }

    /// Probe rank; lower is probed first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Retail => 0,
            Self::Commercial => 1,
            Self::Banking => 2,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mortgage {
    #[serde(rename = "mortgageNumber")]
    pub mortgage_number: String,
    #[serde(rename = "mortgageType")]
    pub mortgage_type: String,
    #[serde(rename = "referralId")]
    pub referral_id: String,
    pub rate: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Referral {
    #[serde(rename = "referralId")]
    pub referral_id: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "contactNumber")]
    pub contact_number: String,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    #[serde(rename = "employeeId")]
    pub employee_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub departments: Vec<String>,
    #[serde(rename = "createDate")]
    pub create_date: i64,
    pub status: String,
    pub mortgage: Mortgage,
}

impl Referral {
    pub fn new(referral_id: impl Into<String>) -> Self {
        Self {
            referral_id: referral_id.into(),
            ..Self::default()
        }
    }

    pub fn with_departments<I, S>(mut self, departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.departments = departments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Recognized department tags in declaration order; unknown tags are dropped.
    pub fn known_departments(&self) -> impl Iterator<Item = Department> + '_ {
        self.departments
            .iter()
            .filter_map(|tag| Department::from_tag(tag))
    }

    /// `createDate` interpreted as unix seconds.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.create_date, 0)
    }
}

// Deployed partitions encode an unset list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Records that can be deduplicated by a stable identity.
pub trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for Referral {
    fn identity(&self) -> &str {
        &self.referral_id
    }
}
