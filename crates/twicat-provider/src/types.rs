//! Twilio API types

use serde::{Deserialize, Serialize};

/// `IncomingPhoneNumbers.json` list response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IncomingPhoneNumbersResponse {
    #[serde(default)]
    pub incoming_phone_numbers: Vec<PhoneNumber>,
}

/// Phone number owned by the account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhoneNumber {
    pub sid: String,
    /// E.164 display string
    pub phone_number: String,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    #[serde(default, deserialize_with = "null_as_false")]
    pub sms: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl PhoneNumber {
    /// SMS-capable and currently in use
    pub fn accepts_sms(&self) -> bool {
        self.capabilities.sms && self.status == "in-use"
    }
}

/// Keep only numbers that can receive SMS, preserving order
pub fn capable_numbers(numbers: Vec<PhoneNumber>) -> Vec<PhoneNumber> {
    numbers.into_iter().filter(PhoneNumber::accepts_sms).collect()
}

/// Form body for the number update call
#[derive(Debug, Serialize)]
pub(crate) struct UpdateSmsUrl<'a> {
    #[serde(rename = "Sid")]
    pub sid: &'a str,
    #[serde(rename = "SmsMethod")]
    pub sms_method: &'a str,
    #[serde(rename = "SmsUrl")]
    pub sms_url: &'a str,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<i64>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(sms: bool, status: &str, phone: &str) -> PhoneNumber {
        PhoneNumber {
            sid: format!("PN{}", phone),
            phone_number: phone.to_string(),
            capabilities: Capabilities { sms },
            status: status.to_string(),
        }
    }

    #[test]
    fn test_capable_numbers_filters_and_keeps_order() {
        let numbers = vec![
            number(true, "in-use", "+1A"),
            number(false, "in-use", "+1B"),
            number(true, "closed", "+1C"),
            number(true, "in-use", "+1D"),
        ];

        let phones: Vec<_> = capable_numbers(numbers)
            .into_iter()
            .map(|n| n.phone_number)
            .collect();
        assert_eq!(phones, vec!["+1A", "+1D"]);
    }

    #[test]
    fn test_status_must_match_exactly() {
        assert!(!number(true, "In-Use", "+1").accepts_sms());
        assert!(!number(true, " in-use", "+1").accepts_sms());
        assert!(number(true, "in-use", "+1").accepts_sms());
    }

    #[test]
    fn test_capable_numbers_empty() {
        assert!(capable_numbers(Vec::new()).is_empty());
    }

    #[test]
    fn test_decode_number_with_null_sms() {
        let number: PhoneNumber = serde_json::from_value(json!({
            "sid": "PN1",
            "phone_number": "+15550000001",
            "capabilities": { "voice": true, "sms": null, "mms": false },
            "status": "in-use"
        }))
        .unwrap();
        assert!(!number.capabilities.sms);
        assert!(!number.accepts_sms());
    }
}
