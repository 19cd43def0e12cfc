use super::Referral;
use crate::core::{BrokerError, Result};

pub fn decode_referral(bytes: &[u8]) -> Result<Referral> {
    serde_json::from_slice(bytes)
        .map_err(|err| BrokerError::decode(String::from_utf8_lossy(bytes), err))
}

/// Decodes a partition's search answer. A JSON `null` is an empty list.
pub fn decode_referrals(bytes: &[u8]) -> Result<Vec<Referral>> {
    serde_json::from_slice::<Option<Vec<Referral>>>(bytes)
        .map(Option::unwrap_or_default)
        .map_err(|err| BrokerError::decode(String::from_utf8_lossy(bytes), err))
}

pub fn encode_referral(referral: &Referral) -> Result<Vec<u8>> {
    serde_json::to_vec(referral).map_err(|err| {
        BrokerError::encode(format!("referral '{}'", referral.referral_id), err)
    })
}

pub fn encode_referrals(referrals: &[Referral]) -> Result<Vec<u8>> {
    serde_json::to_vec(referrals)
        .map_err(|err| BrokerError::encode(format!("{} referrals", referrals.len()), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Mortgage;
    use serde_json::{Value, json};

    fn sample() -> Referral {
        Referral {
            referral_id: "R-100".to_string(),
            customer_name: "Ada Lovelace".to_string(),
            contact_number: "555-0100".to_string(),
            customer_id: "C-7".to_string(),
            employee_id: "E-3".to_string(),
            departments: vec!["RETAIL".to_string(), "BANKING".to_string()],
            create_date: 1_462_000_000,
            status: "OPEN".to_string(),
            mortgage: Mortgage {
                mortgage_number: "M-1".to_string(),
                mortgage_type: "FIXED".to_string(),
                referral_id: "R-100".to_string(),
                rate: "3.25".to_string(),
                amount: "250000".to_string(),
            },
        }
    }

    #[test]
    fn referral_survives_encode_and_decode() {
        let original = sample();
        let bytes = encode_referral(&original).unwrap();
        assert_eq!(decode_referral(&bytes).unwrap(), original);
    }

    #[test]
    fn wire_field_names_match_partitions() {
        let value: Value = serde_json::from_slice(&encode_referral(&sample()).unwrap()).unwrap();
        let object = value.as_object().unwrap();
        for field in [
            "referralId",
            "customerName",
            "contactNumber",
            "customerId",
            "employeeId",
            "departments",
            "createDate",
            "status",
            "mortgage",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert_eq!(value["createDate"], json!(1_462_000_000));
        assert_eq!(value["mortgage"]["mortgageNumber"], json!("M-1"));
        assert_eq!(value["mortgage"]["mortgageType"], json!("FIXED"));
        assert_eq!(value["mortgage"]["referralId"], json!("R-100"));
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let referral = decode_referral(br#"{"referralId":"R-1","departments":["RETAIL"]}"#).unwrap();
        assert_eq!(referral.referral_id, "R-1");
        assert_eq!(referral.status, "");
        assert_eq!(referral.mortgage, Mortgage::default());
    }

    #[test]
    fn decode_error_echoes_payload() {
        let err = decode_referral(b"not json").unwrap_err();
        match err {
            BrokerError::Decode { payload, .. } => assert_eq!(payload, "not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn search_answers_accept_null_but_not_empty_bodies() {
        assert!(decode_referrals(b"null").unwrap().is_empty());
        assert!(decode_referrals(b"[]").unwrap().is_empty());
        assert!(decode_referrals(b"").is_err());
        assert!(decode_referrals(b"{\"oops\":").is_err());
    }
}
